pub mod run;
pub mod setup;
pub mod show;
pub mod ui;
