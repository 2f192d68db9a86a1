/// The unprocessed grid of cells handed over by a text or workbook reader.
///
/// Rows keep their original order and may have different lengths; a cell that
/// is missing from a short row reads as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMatrix {
    rows: Vec<Vec<String>>,
}

impl RawMatrix {
    /// Create an empty matrix
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a matrix from anything that yields rows of string-like cells
    #[must_use]
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<String>,
    {
        RawMatrix {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row by index, exactly as it was read
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Get a cell, treating anything outside the ragged row as blank
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map_or("", String::as_str)
    }

    /// Iterate over rows in original order
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Append a row
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ragged_cells_read_as_blank() {
        let matrix = RawMatrix::from_rows(vec![vec!["a", "b", "c"], vec!["d"]]);

        assert_eq!(matrix.row_count(), 2);
        assert_eq!(matrix.width(), 3);
        assert_eq!(matrix.cell(1, 0), "d");
        assert_eq!(matrix.cell(1, 2), "");
        assert_eq!(matrix.cell(5, 0), "");
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = RawMatrix::new();
        assert!(matrix.is_empty());
        assert_eq!(matrix.width(), 0);
        assert!(matrix.row(0).is_none());
    }
}
