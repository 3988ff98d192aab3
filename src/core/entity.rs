//! Records that flow through the pipeline

use serde::{Deserialize, Serialize};

/// One bank with its market capitalization in USD billions.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntity {
    pub name: String,
    pub mc_usd_billion: f64,
}

/// A `RankedEntity` with its market cap converted into the target currencies.
///
/// Field order is the output column order of the CSV and SQLite sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEntity {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "MC_USD_Billion")]
    pub mc_usd_billion: f64,
    #[serde(rename = "MC_GBP_Billion")]
    pub mc_gbp_billion: f64,
    #[serde(rename = "MC_EUR_Billion")]
    pub mc_eur_billion: f64,
    #[serde(rename = "MC_INR_Billion")]
    pub mc_inr_billion: f64,
}

impl EnrichedEntity {
    pub const COLUMNS: [&'static str; 5] = [
        "Name",
        "MC_USD_Billion",
        "MC_GBP_Billion",
        "MC_EUR_Billion",
        "MC_INR_Billion",
    ];
}
