//! Column detection and market-cap cell cleaning

use crate::core::{EtlError, RankedEntity, Table};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Number of leading cells inspected by sample-based rules.
pub const SAMPLE_ROWS: usize = 10;

static FOOTNOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("footnote pattern should compile"));

/// What to do with a row whose market-cap cell is not numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellPolicy {
    /// Drop the row and report it in [`Extraction::dropped`].
    #[default]
    Lenient,
    /// Fail with [`EtlError::UnparseableCell`].
    Strict,
}

/// One column as seen by the column rules.
pub struct ColumnView<'a> {
    pub index: usize,
    /// Lowercased, trimmed header label.
    pub label: String,
    pub sample: Vec<Option<&'a str>>,
    pub is_name_column: bool,
}

pub struct ColumnRule {
    pub name: &'static str,
    pub matches: fn(&ColumnView<'_>) -> bool,
}

pub const NAME_RULES: &[ColumnRule] = &[
    ColumnRule {
        name: "name-or-bank",
        matches: is_name_header,
    },
    ColumnRule {
        name: "first-column",
        matches: is_first_column,
    },
];

pub const MARKET_CAP_RULES: &[ColumnRule] = &[
    ColumnRule {
        name: "market-cap-header",
        matches: is_market_cap_header,
    },
    ColumnRule {
        name: "numeric-sample",
        matches: has_numeric_sample,
    },
];

fn is_name_header(column: &ColumnView<'_>) -> bool {
    column.label.contains("name") || column.label.contains("bank")
}

fn is_first_column(column: &ColumnView<'_>) -> bool {
    column.index == 0
}

fn is_market_cap_header(column: &ColumnView<'_>) -> bool {
    let label = &column.label;
    (label.contains("market") && (label.contains("cap") || label.contains("capital")))
        || (label.contains("usd") && label.contains("billion"))
}

fn has_numeric_sample(column: &ColumnView<'_>) -> bool {
    !column.is_name_column
        && column
            .sample
            .iter()
            .flatten()
            .any(|v| v.chars().any(|c| c.is_ascii_digit()))
}

/// Returns the index of the first column matched by the highest-priority rule.
pub fn select_column(columns: &[ColumnView<'_>], rules: &[ColumnRule]) -> Option<usize> {
    rules.iter().find_map(|rule| {
        let found = columns.iter().find(|c| (rule.matches)(c))?;
        debug!(rule = rule.name, column = %found.label, "Column rule matched");
        Some(found.index)
    })
}

fn column_views(table: &Table, name_column: Option<usize>) -> Vec<ColumnView<'_>> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(index, header)| ColumnView {
            index,
            label: header.trim().to_lowercase(),
            sample: table.column(index).take(SAMPLE_ROWS).collect(),
            is_name_column: Some(index) == name_column,
        })
        .collect()
}

/// Resolved name and market-cap column indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub name: usize,
    pub market_cap: usize,
}

pub fn resolve_columns(table: &Table) -> Result<Columns, EtlError> {
    let not_found = |column| EtlError::ColumnNotFound {
        column,
        headers: table.headers.clone(),
    };

    let name =
        select_column(&column_views(table, None), NAME_RULES).ok_or_else(|| not_found("name"))?;
    let market_cap = select_column(&column_views(table, Some(name)), MARKET_CAP_RULES)
        .ok_or_else(|| not_found("market-cap"))?;

    Ok(Columns { name, market_cap })
}

/// Parses a market-cap cell such as `"US$1,200 [1]"` into a number.
///
/// Footnotes and currency markers are removed, then everything except digits,
/// `.` and `-`. Anything that is still not a number yields `None`.
pub fn clean_market_cap_value(raw: Option<&str>) -> Option<f64> {
    let raw = raw?;
    let s = FOOTNOTE.replace_all(raw, "");
    let s = s.replace("US$", "").replace('$', "");
    let s: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A row left out of the output because its market cap did not parse.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRow {
    pub row: usize,
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extraction {
    pub entities: Vec<RankedEntity>,
    pub dropped: Vec<DroppedRow>,
}

pub fn resolve(table: &Table, policy: CellPolicy) -> Result<Extraction, EtlError> {
    let columns = resolve_columns(table)?;
    debug!(
        name_column = %table.headers[columns.name],
        market_cap_column = %table.headers[columns.market_cap],
        "Resolved columns"
    );

    let mut extraction = Extraction::default();
    for row in 0..table.row_count() {
        let name = table.cell(row, columns.name).unwrap_or_default().trim();
        let raw_cap = table.cell(row, columns.market_cap);

        match clean_market_cap_value(raw_cap) {
            Some(mc_usd_billion) => extraction.entities.push(RankedEntity {
                name: name.to_string(),
                mc_usd_billion,
            }),
            None if policy == CellPolicy::Strict => {
                return Err(EtlError::UnparseableCell {
                    row,
                    value: raw_cap.map(str::to_string),
                });
            }
            None => {
                warn!(
                    row,
                    bank = name,
                    value = ?raw_cap,
                    "Dropping row with non-numeric market cap"
                );
                extraction.dropped.push(DroppedRow {
                    row,
                    name: name.to_string(),
                    value: raw_cap.map(str::to_string),
                });
            }
        }
    }
    Ok(extraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| {
                    r.iter()
                        .map(|v| (!v.is_empty()).then(|| v.to_string()))
                        .collect()
                })
                .collect(),
        )
    }

    #[test]
    fn test_clean_market_cap_value() {
        assert_eq!(clean_market_cap_value(Some("1234.5")), Some(1234.5));
        assert_eq!(clean_market_cap_value(Some("1,200 [1]")), Some(1200.0));
        assert_eq!(clean_market_cap_value(Some("$1,200")), Some(1200.0));
        assert_eq!(clean_market_cap_value(Some("US$1,200")), Some(1200.0));
        assert_eq!(clean_market_cap_value(Some("432.92[note 3][4]")), Some(432.92));
        assert_eq!(clean_market_cap_value(Some("-12.5")), Some(-12.5));
        assert_eq!(clean_market_cap_value(Some("[1]")), None);
        assert_eq!(clean_market_cap_value(Some("")), None);
        assert_eq!(clean_market_cap_value(Some("-")), None);
        assert_eq!(clean_market_cap_value(Some("n/a")), None);
        assert_eq!(clean_market_cap_value(Some("1.2.3")), None);
        assert_eq!(clean_market_cap_value(None), None);
    }

    #[test]
    fn test_resolve_columns_by_header() {
        let t = table(
            &["Rank", "Bank Name", "Market Cap(US$ Billion)"],
            &[&["1", "JPMorgan Chase", "432.92"]],
        );
        let columns = resolve_columns(&t).unwrap();
        assert_eq!(t.headers[columns.name], "Bank Name");
        assert_eq!(t.headers[columns.market_cap], "Market Cap(US$ Billion)");
    }

    #[test]
    fn test_resolve_columns_usd_billion_header() {
        let t = table(&["Institution", "Total assets (USD billion)"], &[&["HSBC", "3000"]]);
        let columns = resolve_columns(&t).unwrap();
        assert_eq!(columns, Columns { name: 0, market_cap: 1 });
    }

    #[test]
    fn test_resolve_columns_falls_back_to_numeric_sample() {
        let t = table(
            &["Institution", "Country", "Value"],
            &[&["HSBC", "UK", "160.2"], &["BNP", "France", ""]],
        );
        let columns = resolve_columns(&t).unwrap();
        assert_eq!(columns, Columns { name: 0, market_cap: 2 });
    }

    #[test]
    fn test_numeric_sample_skips_name_column() {
        let t = table(&["0", "1"], &[&["Bank 1", "x"], &["Bank 2", "7"]]);
        let columns = resolve_columns(&t).unwrap();
        assert_eq!(columns, Columns { name: 0, market_cap: 1 });
    }

    #[test]
    fn test_first_matching_header_wins() {
        let t = table(
            &["Bank", "Bank name", "Market cap 2022", "Market cap 2023"],
            &[&["HSBC", "HSBC Holdings", "140", "160"]],
        );
        let columns = resolve_columns(&t).unwrap();
        assert_eq!(columns, Columns { name: 0, market_cap: 2 });
    }

    #[test]
    fn test_first_numeric_column_wins() {
        let t = table(
            &["Institution", "Country", "Assets", "Value"],
            &[&["HSBC", "UK", "3000", "160.2"], &["BNP", "France", "2900", "90"]],
        );
        let columns = resolve_columns(&t).unwrap();
        assert_eq!(columns, Columns { name: 0, market_cap: 2 });
    }

    #[test]
    fn test_resolve_columns_not_found() {
        let t = table(&["Bank", "Country"], &[&["HSBC", "UK"]]);
        let err = resolve_columns(&t).unwrap_err();
        assert_eq!(
            err,
            EtlError::ColumnNotFound {
                column: "market-cap",
                headers: vec!["Bank".to_string(), "Country".to_string()],
            }
        );
    }

    #[test]
    fn test_resolve_drops_unparseable_rows() {
        let t = table(
            &["Rank", "Bank name", "Market cap (US$ billion)"],
            &[
                &["1", " JPMorgan Chase ", "432.92"],
                &["2", "Bank of America", "n/a"],
                &["3", "ICBC", "US$194.56[2]"],
            ],
        );

        let extraction = resolve(&t, CellPolicy::Lenient).unwrap();
        assert_eq!(
            extraction.entities,
            vec![
                RankedEntity {
                    name: "JPMorgan Chase".to_string(),
                    mc_usd_billion: 432.92
                },
                RankedEntity {
                    name: "ICBC".to_string(),
                    mc_usd_billion: 194.56
                },
            ]
        );
        assert_eq!(
            extraction.dropped,
            vec![DroppedRow {
                row: 1,
                name: "Bank of America".to_string(),
                value: Some("n/a".to_string())
            }]
        );
        assert_eq!(
            extraction.entities.len(),
            t.row_count() - extraction.dropped.len()
        );
    }

    #[test]
    fn test_resolve_strict_fails_on_unparseable_row() {
        let t = table(&["Bank name", "Market cap"], &[&["A", "1"], &["B", ""]]);
        let err = resolve(&t, CellPolicy::Strict).unwrap_err();
        assert_eq!(err, EtlError::UnparseableCell { row: 1, value: None });
    }
}
