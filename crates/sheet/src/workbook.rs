use crate::error::{Result, SheetError};
use crate::matrix::RawMatrix;
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

/// A spreadsheet workbook opened for reading (xlsx, xlsm, xlsb, xls, ods)
pub struct Workbook<RS: Read + Seek> {
    sheets: Sheets<RS>,
    sheet_names: Vec<String>,
}

impl Workbook<BufReader<File>> {
    /// Open a workbook file, picking the format from its extension
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let sheets = open_workbook_auto(path.as_ref()).map_err(workbook_error)?;
        Ok(Self::from_sheets(sheets))
    }
}

impl Workbook<Cursor<Vec<u8>>> {
    /// Open a workbook held in memory, e.g. an uploaded file
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let sheets = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(workbook_error)?;
        Ok(Self::from_sheets(sheets))
    }
}

impl<RS: Read + Seek> Workbook<RS> {
    fn from_sheets(sheets: Sheets<RS>) -> Self {
        let sheet_names = sheets.sheet_names();
        Workbook { sheets, sheet_names }
    }

    /// Sheet names in workbook order
    #[must_use]
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheet_names.len()
    }

    /// Read one sheet as a matrix of display strings.
    ///
    /// Blank cells become empty strings. The used range is re-anchored at A1
    /// so leading blank rows and columns keep their positions.
    pub fn read_matrix(&mut self, sheet_index: usize) -> Result<RawMatrix> {
        let name = self
            .sheet_names
            .get(sheet_index)
            .cloned()
            .ok_or(SheetError::SheetNotFound {
                index: sheet_index,
                count: self.sheet_names.len(),
            })?;

        let range = self
            .sheets
            .worksheet_range(&name)
            .map_err(workbook_error)?;

        let matrix = range_to_matrix(&range);
        tracing::debug!(sheet = %name, rows = matrix.row_count(), "read worksheet");
        Ok(matrix)
    }
}

fn workbook_error(e: calamine::Error) -> SheetError {
    SheetError::Workbook(e.to_string())
}

fn range_to_matrix(range: &Range<Data>) -> RawMatrix {
    let mut matrix = RawMatrix::new();
    let Some((top, left)) = range.start() else {
        return matrix;
    };

    for _ in 0..top {
        matrix.push_row(Vec::new());
    }
    for row in range.rows() {
        let mut cells = vec![String::new(); left as usize];
        cells.extend(row.iter().map(data_to_string));
        matrix.push_row(cells);
    }
    matrix
}

/// Render a calamine cell the way a spreadsheet shows its raw value
fn data_to_string(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::Bool(b) => b.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::String(s) => s.clone(),
        // Excel stores dates as days since 1899-12-30
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook as XlsxWriter;
    use tempfile::tempdir;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(9.99), "9.99");
        assert_eq!(format_number(-12.0), "-12");
    }

    #[test]
    fn test_read_sheet_with_leading_blank_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("template.xlsx");

        let mut book = XlsxWriter::new();
        let sheet = book.add_worksheet();
        sheet.set_name("Products").unwrap();
        sheet.write_string(1, 1, "SKU").unwrap();
        sheet.write_string(1, 2, "Price").unwrap();
        sheet.write_string(2, 1, "A1").unwrap();
        sheet.write_number(2, 2, 9.99).unwrap();
        sheet.write_number(3, 2, 12.0).unwrap();
        book.add_worksheet().set_name("Help").unwrap();
        book.save(&path).unwrap();

        let mut workbook = Workbook::open(&path).unwrap();
        assert_eq!(workbook.sheet_names(), &["Products".to_string(), "Help".to_string()]);

        let matrix = workbook.read_matrix(0).unwrap();
        assert_eq!(matrix.row_count(), 4);
        assert!(matrix.row(0).unwrap().is_empty());
        assert_eq!(matrix.cell(1, 0), "");
        assert_eq!(matrix.cell(1, 1), "SKU");
        assert_eq!(matrix.cell(2, 2), "9.99");
        assert_eq!(matrix.cell(3, 1), "");
        assert_eq!(matrix.cell(3, 2), "12");
    }

    #[test]
    fn test_from_bytes_and_missing_sheet() {
        let mut book = XlsxWriter::new();
        book.add_worksheet().write_string(0, 0, "only").unwrap();
        let bytes = book.save_to_buffer().unwrap();

        let mut workbook = Workbook::from_bytes(bytes).unwrap();
        assert_eq!(workbook.sheet_count(), 1);
        assert_eq!(workbook.read_matrix(0).unwrap().cell(0, 0), "only");
        assert!(matches!(
            workbook.read_matrix(3),
            Err(SheetError::SheetNotFound { index: 3, count: 1 })
        ));
    }

    #[test]
    fn test_garbage_bytes_are_a_workbook_error() {
        let result = Workbook::from_bytes(b"not a workbook".to_vec());
        assert!(matches!(result, Err(SheetError::Workbook(_))));
    }
}
