//! Persistence sinks for the enriched table

pub mod csv;
pub mod sqlite;

pub use self::csv::write_csv;
pub use self::sqlite::{SqliteSink, TableSample, quote_table_name};
