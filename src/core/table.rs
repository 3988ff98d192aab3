//! In-memory shape of a parsed HTML table

/// Header labels plus rows of optional cell text, both indexed by column position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Table { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell text at `(row, column)`; `None` for empty or missing cells.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }

    /// Iterates the cells of one column, top to bottom.
    pub fn column(&self, column: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |r| r.get(column).and_then(|c| c.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| (!v.is_empty()).then(|| v.to_string()))
            .collect()
    }

    #[test]
    fn test_cell_and_column_access() {
        let table = Table::new(
            vec!["Bank".into(), "Cap".into()],
            vec![cells(&["JPMorgan", "432.92"]), cells(&["BoA", ""])],
        );

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 1), Some("432.92"));
        assert_eq!(table.cell(1, 1), None);
        assert_eq!(table.cell(5, 0), None);
        assert_eq!(
            table.column(0).collect::<Vec<_>>(),
            vec![Some("JPMorgan"), Some("BoA")]
        );
    }
}
