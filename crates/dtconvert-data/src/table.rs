//! The in-memory table every codec reads into and writes from.

use indexmap::IndexSet;

/// Ordered, string-valued table.
///
/// Columns are unique and keep insertion order. Every row always holds
/// exactly one value per column; adding a column widens existing rows with
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: IndexSet<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a header and rows.
    ///
    /// Duplicate column names collapse onto the first occurrence (later
    /// values win). Short rows are padded and long rows truncated.
    pub fn from_parts<C, R, V>(columns: C, rows: R) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator<Item = V>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        let header: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut table = Self::new();
        for name in &header {
            table.ensure_column(name);
        }
        for values in rows {
            let row = table.add_row();
            for (name, value) in header.iter().zip(values) {
                table.set(row, name, value);
            }
        }
        table
    }

    /// Column names in order.
    pub fn columns(&self) -> impl ExactSizeIterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(name)
    }

    /// All rows, values in column order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Add `name` as a column if it is not one already; returns its index.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.columns.get_index_of(name) {
            return index;
        }
        let (index, _) = self.columns.insert_full(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        index
    }

    /// Append a row of empty values; returns its index.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(vec![String::new(); self.columns.len()]);
        self.rows.len() - 1
    }

    /// Set a cell, adding the column if needed.
    ///
    /// Out-of-range row indices are ignored.
    pub fn set(&mut self, row: usize, column: &str, value: impl Into<String>) {
        let col = self.ensure_column(column);
        if let Some(cells) = self.rows.get_mut(row) {
            cells[col] = value.into();
        }
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|cells| cells[col].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_column_backfills_rows() {
        let mut table = Table::new();
        let r0 = table.add_row();
        table.set(r0, "a", "1");
        let r1 = table.add_row();
        table.set(r1, "b", "2");

        assert_eq!(table.columns().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(table.row(0).unwrap(), &["1".to_string(), String::new()]);
        assert_eq!(table.get(1, "a"), Some(""));
        assert_eq!(table.get(1, "b"), Some("2"));
        assert!(table.rows().iter().all(|r| r.len() == table.column_count()));
    }

    #[test]
    fn test_ensure_column_is_idempotent() {
        let mut table = Table::new();
        assert_eq!(table.ensure_column("x"), 0);
        assert_eq!(table.ensure_column("y"), 1);
        assert_eq!(table.ensure_column("x"), 0);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_from_parts_duplicates_and_ragged_rows() {
        let table = Table::from_parts(
            ["a", "b", "a"],
            vec![vec!["1", "2", "3"], vec!["4"], vec!["5", "6", "7", "8"]],
        );

        assert_eq!(table.columns().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(table.get(0, "a"), Some("3"));
        assert_eq!(table.get(1, "b"), Some(""));
        assert_eq!(table.get(2, "a"), Some("7"));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_get_missing() {
        let table = Table::from_parts(["a"], vec![vec!["1"]]);
        assert_eq!(table.get(0, "b"), None);
        assert_eq!(table.get(5, "a"), None);
    }
}
