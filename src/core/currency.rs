//! Exchange-rate table keyed by currency code

use super::error::EtlError;
use anyhow::{Context, Result, anyhow};
use std::path::Path;
use tracing::debug;

/// Rates expressed as "1 USD = rate units of this currency".
///
/// Keys are trimmed and uppercased. Iteration order is insertion order, which
/// decides the winner of a substring lookup.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: Vec<(String, f64)>,
    origin: String,
}

impl RateTable {
    pub fn from_pairs<K, I>(pairs: I, origin: &str) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut table = RateTable {
            rates: Vec::new(),
            origin: origin.to_string(),
        };
        for (code, rate) in pairs {
            table.insert(code.as_ref(), rate);
        }
        table
    }

    /// Reads a two-column CSV with a header row. Columns are taken by position.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open exchange rate file: {}", path.display()))?;

        let mut table = RateTable {
            rates: Vec::new(),
            origin: path.display().to_string(),
        };

        for record in reader.records() {
            let record = record.with_context(|| {
                format!("Failed to read exchange rate file: {}", path.display())
            })?;
            let line = record.position().map_or(0, |p| p.line());
            let (code, rate) = match (record.get(0), record.get(1)) {
                (Some(code), Some(rate)) => (code, rate),
                _ => {
                    return Err(anyhow!(
                        "Expected two columns on line {} of {}",
                        line,
                        path.display()
                    ));
                }
            };
            let rate: f64 = rate.trim().parse().with_context(|| {
                format!(
                    "Invalid rate {:?} for '{}' on line {} of {}",
                    rate,
                    code.trim(),
                    line,
                    path.display()
                )
            })?;
            table.insert(code, rate);
        }

        debug!(count = table.len(), origin = %table.origin, "Loaded exchange rates");
        Ok(table)
    }

    fn insert(&mut self, code: &str, rate: f64) {
        let key = code.trim().to_uppercase();
        match self.rates.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = rate,
            None => self.rates.push((key, rate)),
        }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Exact code match first, then the first key that contains the code
    /// (e.g. "GBP - British Pound").
    pub fn get_rate(&self, code: &str) -> Result<f64, EtlError> {
        let code = code.to_uppercase();
        if let Some((_, rate)) = self.rates.iter().find(|(k, _)| *k == code) {
            return Ok(*rate);
        }
        if let Some((key, rate)) = self.rates.iter().find(|(k, _)| k.contains(&code)) {
            debug!(%code, %key, "Rate resolved by partial match");
            return Ok(*rate);
        }
        Err(EtlError::RateNotFound {
            code,
            origin: self.origin.clone(),
        })
    }
}
