//! Core business types and abstractions

pub mod config;
pub mod currency;
pub mod entity;
pub mod error;
pub mod log;
pub mod source;
pub mod table;

// Re-export main types for cleaner imports
pub use currency::RateTable;
pub use entity::{EnrichedEntity, RankedEntity};
pub use error::EtlError;
pub use log::ProgressLog;
pub use source::DocumentSource;
pub use table::Table;
