use crate::error::{Result, SheetError};
use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Default number of rows shown by [`Table::preview`] callers
pub const PREVIEW_ROWS: usize = 10;
/// Default number of columns shown by [`Table::preview`] callers
pub const PREVIEW_COLS: usize = 20;

/// Name given to a column whose header cell is blank.
///
/// `position` is the zero-based position in the original header row, so the
/// name stays the same even when neighbouring columns are dropped.
#[must_use]
pub fn fallback_name(position: usize) -> String {
    format!("Column {}", position + 1)
}

/// A named column of a canonical table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Cleaned, non-empty column name
    pub name: String,
    /// Zero-based position of the column in the source header row
    pub position: usize,
    /// Whether `name` was generated because the header cell was blank
    pub generated: bool,
}

impl Column {
    /// A column with a real header label
    #[must_use]
    pub fn named(name: impl Into<String>, position: usize) -> Self {
        Column {
            name: name.into(),
            position,
            generated: false,
        }
    }

    /// A column named by its position
    #[must_use]
    pub fn generated(position: usize) -> Self {
        Column {
            name: fallback_name(position),
            position,
            generated: true,
        }
    }
}

/// The canonical headers + rows structure handed to editors and exporters.
///
/// Rows are stored by position: every row holds exactly one value per column,
/// so two columns that share a name never lose data. The mapping view
/// ([`Table::record`]) is keyed by name and lets a later duplicate overwrite an
/// earlier one.
///
/// A `Table` is never mutated in place; edits return a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    /// Set once a header row has been chosen for this table; a settled table
    /// is not searched for a better header again
    header_settled: bool,
}

impl Table {
    /// Build a table, padding short rows with empty strings and cutting long ones
    #[must_use]
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Table {
            columns,
            rows,
            header_settled: false,
        }
    }

    /// Build a table from header names and positional rows
    #[must_use]
    pub fn from_headers<S: Into<String>>(headers: Vec<S>, rows: Vec<Vec<String>>) -> Self {
        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(position, name)| Column::named(name, position))
            .collect();
        Self::new(columns, rows)
    }

    /// Build a table from a mapping-based table.
    ///
    /// Values are looked up by header name; absent keys become empty strings
    /// and keys that are not headers are ignored.
    #[must_use]
    pub fn from_records<S: AsRef<str>>(
        headers: &[S],
        records: &[IndexMap<String, String>],
    ) -> Self {
        let columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .map(|(position, name)| Column::named(name.as_ref(), position))
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(&c.name).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Table {
            columns,
            rows,
            header_settled: false,
        }
    }

    /// Mark the header row of this table as chosen
    #[must_use]
    pub fn with_settled_header(mut self) -> Self {
        self.header_settled = true;
        self
    }

    /// Whether the header row of this table has already been chosen
    #[must_use]
    pub fn has_settled_header(&self) -> bool {
        self.header_settled
    }

    /// Header names in display and export order
    #[must_use]
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Positional rows, each exactly `col_count()` wide
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no data rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns whose name came from the header row rather than
    /// from positional fallback naming
    #[must_use]
    pub fn named_column_count(&self) -> usize {
        self.columns.iter().filter(|c| !c.generated).count()
    }

    /// Index of the first column with the given name
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn row(&self, index: usize) -> Result<&[String]> {
        self.rows
            .get(index)
            .map(Vec::as_slice)
            .ok_or(SheetError::RowOutOfBounds {
                index,
                count: self.rows.len(),
            })
    }

    /// Get a value by row and column position
    pub fn cell(&self, row: usize, col: usize) -> Result<&str> {
        let values = self.row(row)?;
        values
            .get(col)
            .map(String::as_str)
            .ok_or(SheetError::ColumnOutOfBounds {
                index: col,
                count: self.columns.len(),
            })
    }

    /// Get a value by row and column name
    pub fn value(&self, row: usize, column: &str) -> Result<&str> {
        let col = self.require_column(column)?;
        self.cell(row, col)
    }

    /// Mapping view of one row, keyed by header name
    #[must_use]
    pub fn record(&self, index: usize) -> Option<IndexMap<String, String>> {
        self.rows.get(index).map(|row| self.to_record(row))
    }

    /// Mapping view of every row
    #[must_use]
    pub fn records(&self) -> Vec<IndexMap<String, String>> {
        self.rows.iter().map(|row| self.to_record(row)).collect()
    }

    fn to_record(&self, row: &[String]) -> IndexMap<String, String> {
        let mut record = IndexMap::with_capacity(self.columns.len());
        for (column, value) in self.columns.iter().zip(row) {
            record.insert(column.name.clone(), value.clone());
        }
        record
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    // ===== Copy-on-write edits =====

    /// Return a copy of the table with one value replaced
    pub fn with_cell(&self, row: usize, col: usize, value: impl Into<String>) -> Result<Table> {
        self.cell(row, col)?;
        let mut edited = self.clone();
        edited.rows[row][col] = value.into();
        Ok(edited)
    }

    /// Return a copy of the table with the value under `column` replaced
    pub fn with_value(&self, row: usize, column: &str, value: impl Into<String>) -> Result<Table> {
        let col = self.require_column(column)?;
        self.with_cell(row, col, value)
    }

    /// A windowed copy holding at most `max_rows` rows and `max_cols` columns
    #[must_use]
    pub fn preview(&self, max_rows: usize, max_cols: usize) -> Table {
        let columns: Vec<Column> = self.columns.iter().take(max_cols).cloned().collect();
        let rows = self
            .rows
            .iter()
            .take(max_rows)
            .map(|row| row.iter().take(max_cols).cloned().collect())
            .collect();
        Table {
            columns,
            rows,
            header_settled: self.header_settled,
        }
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Table", 2)?;
        state.serialize_field("headers", &self.headers())?;
        state.serialize_field("rows", &self.records())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    fn sample() -> Table {
        Table::from_headers(
            vec!["SKU", "Name", "Price"],
            vec![row(&["A1", "Widget", "9.99"]), row(&["B2", "Gadget"])],
        )
    }

    #[test]
    fn test_rows_padded_to_header_width() {
        let table = sample();
        assert_eq!(table.row(1).unwrap(), &row(&["B2", "Gadget", ""])[..]);
        assert_eq!(table.value(1, "Price").unwrap(), "");
    }

    #[test]
    fn test_long_rows_truncated() {
        let table = Table::from_headers(vec!["a"], vec![row(&["1", "2", "3"])]);
        assert_eq!(table.row(0).unwrap().len(), 1);
    }

    #[test]
    fn test_record_keys_match_headers() {
        let table = sample();
        let record = table.record(0).unwrap();
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, table.headers());
        assert_eq!(record["Name"], "Widget");
    }

    #[test]
    fn test_duplicate_names_keep_positional_values() {
        let table = Table::from_headers(vec!["Color", "Color"], vec![row(&["red", "blue"])]);

        assert_eq!(table.cell(0, 0).unwrap(), "red");
        assert_eq!(table.cell(0, 1).unwrap(), "blue");
        // the mapping view lets the later column win
        let record = table.record(0).unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record["Color"], "blue");
    }

    #[test]
    fn test_with_value_is_copy_on_write() {
        let table = sample();
        let edited = table.with_value(0, "Price", "10.50").unwrap();

        assert_eq!(edited.value(0, "Price").unwrap(), "10.50");
        assert_eq!(table.value(0, "Price").unwrap(), "9.99");
        assert_eq!(edited.headers(), table.headers());
    }

    #[test]
    fn test_settled_header_survives_edits() {
        let table = sample().with_settled_header();
        assert!(!sample().has_settled_header());
        assert!(table.has_settled_header());
        assert!(table.with_value(0, "Price", "1").unwrap().has_settled_header());
        assert!(table.preview(1, 1).has_settled_header());
    }

    #[test]
    fn test_with_value_errors() {
        let table = sample();
        assert!(matches!(
            table.with_value(5, "Price", "x"),
            Err(SheetError::RowOutOfBounds { index: 5, count: 2 })
        ));
        assert!(matches!(
            table.with_value(0, "Weight", "x"),
            Err(SheetError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_from_records_fills_missing_keys() {
        let mut first = IndexMap::new();
        first.insert("SKU".to_string(), "A1".to_string());
        first.insert("Extra".to_string(), "ignored".to_string());

        let table = Table::from_records(&["SKU", "Name"], &[first]);
        assert_eq!(table.row(0).unwrap(), &row(&["A1", ""])[..]);
    }

    #[test]
    fn test_preview_window() {
        let table = sample();
        let preview = table.preview(1, 2);
        assert_eq!(preview.headers(), vec!["SKU", "Name"]);
        assert_eq!(preview.row_count(), 1);
        assert_eq!(preview.row(0).unwrap(), &row(&["A1", "Widget"])[..]);
    }

    #[test]
    fn test_named_column_count() {
        let table = Table::new(
            vec![Column::named("SKU", 0), Column::generated(1)],
            vec![],
        );
        assert_eq!(table.named_column_count(), 1);
        assert_eq!(table.headers(), vec!["SKU", "Column 2"]);
    }
}
