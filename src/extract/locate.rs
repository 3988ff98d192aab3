//! Finds the market-capitalization table in a page

use super::html::{parse_table, tables_in};
use crate::core::{EtlError, Table};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Section heading used by the source page above the ranking table.
pub const MARKET_CAP_HEADING: &str = "By market capitalization";

/// How a rule picks one table out of the candidates.
pub enum Pick {
    /// First table, in document order, for which the predicate holds.
    First(fn(&Table) -> bool),
    /// Table with the most rows; ties go to the earliest.
    MostRows,
}

pub struct TableRule {
    pub name: &'static str,
    pub pick: Pick,
}

/// Fallback rules for pages without the expected heading, in priority order.
pub const TABLE_RULES: &[TableRule] = &[
    TableRule {
        name: "market-header",
        pick: Pick::First(has_market_header),
    },
    TableRule {
        name: "most-rows",
        pick: Pick::MostRows,
    },
];

fn has_market_header(table: &Table) -> bool {
    table
        .headers
        .iter()
        .any(|h| h.to_lowercase().contains("market"))
}

pub fn locate(document: &str) -> Result<Table, EtlError> {
    let html = Html::parse_document(document);

    if let Some(heading) = find_heading(&html) {
        if let Some(element) = next_sibling_table(heading) {
            debug!(heading = MARKET_CAP_HEADING, "Using table under heading");
            return parse_table(element).ok_or_else(|| {
                EtlError::NotFound(format!(
                    "No tables found under the '{MARKET_CAP_HEADING}' heading."
                ))
            });
        }
        debug!("Heading has no sibling table, scanning the whole document");
    }

    let candidates = tables_in(&html);
    debug!(count = candidates.len(), "Parsed candidate tables");
    select_candidate(candidates, TABLE_RULES)
        .ok_or_else(|| EtlError::NotFound("No tables found in the document.".to_string()))
}

/// Applies `rules` in order and returns the pick of the first rule that matches.
pub fn select_candidate(candidates: Vec<Table>, rules: &[TableRule]) -> Option<Table> {
    for rule in rules {
        let index = match rule.pick {
            Pick::First(predicate) => candidates.iter().position(predicate),
            Pick::MostRows => most_rows(&candidates),
        };
        if let Some(index) = index {
            debug!(rule = rule.name, index, "Selected candidate table");
            return candidates.into_iter().nth(index);
        }
    }
    None
}

fn most_rows(candidates: &[Table]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (index, table) in candidates.iter().enumerate() {
        if best.is_none_or(|(_, rows)| table.row_count() > rows) {
            best = Some((index, table.row_count()));
        }
    }
    best.map(|(index, _)| index)
}

fn find_heading(html: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("h2, h3, h4").expect("heading selector should parse");
    html.select(&selector)
        .find(|h| h.text().collect::<String>().contains(MARKET_CAP_HEADING))
}

fn next_sibling_table(heading: ElementRef<'_>) -> Option<ElementRef<'_>> {
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(header: &str, rows: usize) -> Table {
        Table::new(
            vec![header.to_string()],
            (0..rows).map(|i| vec![Some(i.to_string())]).collect(),
        )
    }

    #[test]
    fn test_locate_table_under_heading() {
        let html = r#"
            <table><tr><th>Market share</th></tr><tr><td>decoy</td></tr></table>
            <h2>By market capitalization</h2>
            <p>The list below is sorted by market cap.</p>
            <table>
              <tr><th>Rank</th><th>Bank name</th><th>Total</th></tr>
              <tr><td>1</td><td>JPMorgan Chase</td><td>432.92</td></tr>
            </table>"#;

        let table = locate(html).unwrap();
        assert_eq!(table.headers, vec!["Rank", "Bank name", "Total"]);
        assert_eq!(table.cell(0, 1), Some("JPMorgan Chase"));
    }

    #[test]
    fn test_heading_match_is_case_sensitive() {
        let html = r#"
            <h2>by Market Capitalization</h2>
            <table><tr><th>A</th></tr><tr><td>1</td></tr><tr><td>2</td></tr></table>
            <table><tr><th>Market value</th></tr><tr><td>9</td></tr></table>"#;

        let table = locate(html).unwrap();
        assert_eq!(table.headers, vec!["Market value"]);
    }

    #[test]
    fn test_empty_table_under_heading_is_not_found() {
        let html = r#"
            <h3>By market capitalization</h3>
            <table></table>
            <table><tr><th>Market cap</th></tr><tr><td>1</td></tr></table>"#;

        let err = locate(html).unwrap_err();
        assert!(matches!(err, EtlError::NotFound(_)));
        assert!(err.to_string().contains("under the 'By market capitalization' heading"));
    }

    #[test]
    fn test_fallback_to_largest_table() {
        let html = r#"
            <table><tr><th>A</th></tr><tr><td>1</td></tr></table>
            <table><tr><th>B</th></tr><tr><td>1</td></tr><tr><td>2</td></tr></table>
            <table><tr><th>C</th></tr><tr><td>1</td></tr><tr><td>2</td></tr></table>"#;

        let table = locate(html).unwrap();
        assert_eq!(table.headers, vec!["B"]);
    }

    #[test]
    fn test_no_tables_is_not_found() {
        let err = locate("<html><body><h2>By market capitalization</h2></body></html>");
        assert_eq!(
            err.unwrap_err(),
            EtlError::NotFound("No tables found in the document.".to_string())
        );
    }

    #[test]
    fn test_select_candidate_rule_order() {
        let candidates = vec![table("Rank", 5), table("MARKET CAP", 1), table("Other", 7)];
        let picked = select_candidate(candidates.clone(), TABLE_RULES).unwrap();
        assert_eq!(picked.headers, vec!["MARKET CAP"]);

        let most_rows_only = [TableRule {
            name: "most-rows",
            pick: Pick::MostRows,
        }];
        let picked = select_candidate(candidates, &most_rows_only).unwrap();
        assert_eq!(picked.headers, vec!["Other"]);

        assert!(select_candidate(Vec::new(), TABLE_RULES).is_none());
    }
}
