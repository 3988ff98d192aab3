//! Extraction: page markup to ranked entities

pub mod html;
pub mod locate;
pub mod resolve;

pub use locate::locate;
pub use resolve::{CellPolicy, DroppedRow, Extraction, clean_market_cap_value, resolve};

use crate::core::EtlError;

/// Locates the ranking table in `document` and turns its rows into entities.
pub fn extract(document: &str, policy: CellPolicy) -> Result<Extraction, EtlError> {
    let table = locate(document)?;
    resolve(&table, policy)
}
