//! Fatal, domain-level failures of an ETL run

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EtlError {
    #[error("No usable table found: {0}")]
    NotFound(String),

    #[error("Could not find a {column} column automatically. Headers: {headers:?}")]
    ColumnNotFound {
        column: &'static str,
        headers: Vec<String>,
    },

    #[error("Rate for currency '{code}' not found in {origin}")]
    RateNotFound { code: String, origin: String },

    #[error("Row {row}: market-cap value {value:?} is not numeric")]
    UnparseableCell { row: usize, value: Option<String> },

    #[error("Invalid table name: {0:?}")]
    InvalidTableName(String),
}
