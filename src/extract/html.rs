//! HTML `<table>` to [`Table`] conversion

use crate::core::Table;
use scraper::{ElementRef, Html, Selector};

// Upper bound for colspan/rowspan attributes; guards against absurd values.
const MAX_SPAN: usize = 1000;

struct RawCell {
    text: Option<String>,
    is_header: bool,
    colspan: usize,
    rowspan: usize,
}

/// Parses every table of the markup, in document order.
pub fn parse_tables(markup: &str) -> Vec<Table> {
    tables_in(&Html::parse_document(markup))
}

pub fn tables_in(document: &Html) -> Vec<Table> {
    let selector = Selector::parse("table").expect("table selector should parse");
    document.select(&selector).filter_map(parse_table).collect()
}

/// Converts one `<table>` element. Returns `None` when it holds no cells.
///
/// Header rows are the rows of `<thead>`, or without one the leading rows made
/// only of `<th>` cells. Multi-row headers are joined per column.
pub fn parse_table(table: ElementRef<'_>) -> Option<Table> {
    let rows = table_rows(table);
    let has_thead = rows.iter().any(|(section, _)| *section == "thead");

    let mut header_rows = Vec::new();
    let mut body_rows = Vec::new();
    for (section, row) in rows {
        let cells = row_cells(row);
        if cells.is_empty() {
            continue;
        }
        let is_header = if has_thead {
            section == "thead"
        } else {
            body_rows.is_empty() && cells.iter().all(|c| c.is_header)
        };
        if is_header {
            header_rows.push(cells);
        } else {
            body_rows.push(cells);
        }
    }

    let header_grid = expand_spans(header_rows);
    let body_grid = expand_spans(body_rows);
    let width = header_grid
        .iter()
        .chain(body_grid.iter())
        .map(Vec::len)
        .max()
        .unwrap_or(0);
    if width == 0 {
        return None;
    }

    let headers = (0..width)
        .map(|column| header_label(&header_grid, column))
        .collect();
    let rows = body_grid
        .into_iter()
        .map(|mut row| {
            row.resize(width, None);
            row
        })
        .collect();

    Some(Table::new(headers, rows))
}

/// Direct `<tr>` children of the table and of its row groups, tagged with the group name.
fn table_rows(table: ElementRef<'_>) -> Vec<(&'static str, ElementRef<'_>)> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        let group = match child.value().name() {
            "tr" => {
                rows.push(("tbody", child));
                continue;
            }
            "thead" => "thead",
            "tbody" => "tbody",
            "tfoot" => "tfoot",
            _ => continue,
        };
        rows.extend(
            child
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == "tr")
                .map(|tr| (group, tr)),
        );
    }
    rows
}

fn row_cells(row: ElementRef<'_>) -> Vec<RawCell> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "th" | "td"))
        .map(|el| RawCell {
            text: cell_text(el),
            is_header: el.value().name() == "th",
            colspan: span_attr(el, "colspan"),
            rowspan: span_attr(el, "rowspan"),
        })
        .collect()
}

fn cell_text(el: ElementRef<'_>) -> Option<String> {
    let text = el.text().collect::<String>();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

fn span_attr(el: ElementRef<'_>, name: &str) -> usize {
    el.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
        .min(MAX_SPAN)
}

/// Lays cells out on a grid: `colspan` repeats a cell to the right, `rowspan`
/// carries it into the rows below.
fn expand_spans(rows: Vec<Vec<RawCell>>) -> Vec<Vec<Option<String>>> {
    let mut carried: Vec<Option<(usize, Option<String>)>> = Vec::new();
    let mut grid = Vec::with_capacity(rows.len());

    for row in rows {
        let mut out: Vec<Option<String>> = Vec::new();
        let mut cells = row.into_iter();
        loop {
            let column = out.len();
            if let Some(slot) = carried.get_mut(column)
                && let Some((remaining, text)) = slot.take()
            {
                out.push(text.clone());
                if remaining > 1 {
                    *slot = Some((remaining - 1, text));
                }
                continue;
            }

            let Some(cell) = cells.next() else {
                if carried.iter().skip(column).any(Option::is_some) {
                    out.push(None);
                    continue;
                }
                break;
            };

            for _ in 0..cell.colspan {
                let column = out.len();
                if cell.rowspan > 1 {
                    if carried.len() <= column {
                        carried.resize(column + 1, None);
                    }
                    carried[column] = Some((cell.rowspan - 1, cell.text.clone()));
                }
                out.push(cell.text.clone());
            }
        }
        grid.push(out);
    }
    grid
}

fn header_label(header_grid: &[Vec<Option<String>>], column: usize) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for row in header_grid {
        if let Some(Some(text)) = row.get(column)
            && !parts.contains(&text.as_str())
        {
            parts.push(text);
        }
    }
    if parts.is_empty() {
        column.to_string()
    } else {
        parts.join(" ")
    }
}
