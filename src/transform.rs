//! Currency conversion of USD market caps

use crate::core::{EnrichedEntity, EtlError, RankedEntity, RateTable};
use tracing::debug;

/// Currencies added to every entity, in output column order.
pub const TARGET_CURRENCIES: [&str; 3] = ["GBP", "EUR", "INR"];

/// Rounds half-to-even at two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Adds GBP, EUR and INR values to each entity. Rates are looked up once.
pub fn convert(
    entities: &[RankedEntity],
    rates: &RateTable,
) -> Result<Vec<EnrichedEntity>, EtlError> {
    let [gbp, eur, inr] = TARGET_CURRENCIES;
    let gbp = rates.get_rate(gbp)?;
    let eur = rates.get_rate(eur)?;
    let inr = rates.get_rate(inr)?;
    debug!(gbp, eur, inr, "Resolved exchange rates");

    Ok(entities
        .iter()
        .map(|e| EnrichedEntity {
            name: e.name.clone(),
            mc_usd_billion: e.mc_usd_billion,
            mc_gbp_billion: round2(e.mc_usd_billion * gbp),
            mc_eur_billion: round2(e.mc_usd_billion * eur),
            mc_inr_billion: round2(e.mc_usd_billion * inr),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> RateTable {
        RateTable::from_pairs([("GBP", 0.81), ("EUR", 0.93), ("INR", 82.5)], "inline")
    }

    fn entity(name: &str, usd: f64) -> RankedEntity {
        RankedEntity {
            name: name.to_string(),
            mc_usd_billion: usd,
        }
    }

    #[test]
    fn test_convert_exact_values() {
        let out = convert(&[entity("JPMorgan Chase", 100.0)], &rates()).unwrap();
        assert_eq!(
            out,
            vec![EnrichedEntity {
                name: "JPMorgan Chase".to_string(),
                mc_usd_billion: 100.0,
                mc_gbp_billion: 81.0,
                mc_eur_billion: 93.0,
                mc_inr_billion: 8250.0,
            }]
        );
    }

    #[test]
    fn test_convert_rounds_and_preserves_order() {
        let input = vec![entity("A", 432.92), entity("B", -1.0), entity("C", 0.0)];
        let out = convert(&input, &rates()).unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(
            out.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );
        assert_eq!(out[0].mc_gbp_billion, 350.67);
        assert_eq!(out[0].mc_eur_billion, 402.62);
        assert_eq!(out[0].mc_inr_billion, 35715.9);
        assert_eq!(out[1].mc_gbp_billion, -0.81);
        assert_eq!(out[2].mc_inr_billion, 0.0);
    }

    #[test]
    fn test_convert_missing_rate() {
        let rates = RateTable::from_pairs([("GBP", 0.81), ("EUR - Euro", 0.93)], "rates.csv");
        let err = convert(&[entity("A", 1.0)], &rates).unwrap_err();
        assert_eq!(
            err,
            EtlError::RateNotFound {
                code: "INR".to_string(),
                origin: "rates.csv".to_string()
            }
        );
    }

    #[test]
    fn test_convert_empty_input_still_checks_rates() {
        assert!(convert(&[], &rates()).unwrap().is_empty());
        assert!(convert(&[], &RateTable::default()).is_err());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(81.00000000000001), 81.0);
    }
}
