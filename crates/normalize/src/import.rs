use crate::error::{NormalizeError, Result};
use crate::normalizer::{HeaderChoice, Normalized, Normalizer};
use cardgrid_sheet::{decode_text, read_matrix, RawMatrix, SourceFormat, Workbook};
use std::io::{Read, Seek};
use std::path::Path;

/// Options for importing a file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Sheet to read from a workbook (default: 0). Ignored for delimited text.
    pub sheet: usize,
    /// Header row picked by the caller; `None` locates it
    pub header_row: Option<usize>,
}

impl ImportOptions {
    /// Set the workbook sheet to read
    #[must_use]
    pub fn with_sheet(mut self, sheet: usize) -> Self {
        self.sheet = sheet;
        self
    }

    /// Use the given header row instead of locating one
    #[must_use]
    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = Some(header_row);
        self
    }

    fn header_choice(&self) -> HeaderChoice {
        self.header_row.map_or(HeaderChoice::Auto, HeaderChoice::Explicit)
    }
}

/// The sheet a workbook import read, kept so the header row can be changed
/// without reading the file again
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookSelection {
    pub sheet_names: Vec<String>,
    pub sheet_index: usize,
    pub header_row_index: usize,
    pub matrix: RawMatrix,
}

impl WorkbookSelection {
    /// Name of the selected sheet
    #[must_use]
    pub fn sheet_name(&self) -> Option<&str> {
        self.sheet_names.get(self.sheet_index).map(String::as_str)
    }

    /// Normalize the retained sheet again with a different header row.
    ///
    /// The selection only changes when normalization succeeds.
    pub fn select_header_row(
        &mut self,
        header_row: usize,
        normalizer: &Normalizer,
    ) -> Result<Normalized> {
        let normalized =
            normalizer.normalize_matrix(&self.matrix, HeaderChoice::Explicit(header_row))?;
        self.header_row_index = header_row;
        Ok(normalized)
    }
}

/// Result of importing a file
#[derive(Debug, Clone)]
pub struct Imported {
    pub normalized: Normalized,
    /// Present for workbook imports
    pub workbook: Option<WorkbookSelection>,
}

impl Normalizer {
    /// Import a CSV, TSV or workbook file, picking the reader by extension
    pub fn import_file<P: AsRef<Path>>(
        &self,
        path: P,
        options: &ImportOptions,
    ) -> Result<Imported> {
        let path = path.as_ref();
        match SourceFormat::from_path(path)? {
            format @ SourceFormat::Delimited { .. } => {
                let bytes = std::fs::read(path).map_err(cardgrid_sheet::SheetError::from)?;
                self.import_delimited(&bytes, &format, options)
            }
            SourceFormat::Workbook => self.import_workbook(Workbook::open(path)?, options),
        }
    }

    /// Import file contents already in memory, e.g. an upload.
    ///
    /// `file_name` is only used to pick the reader.
    pub fn import_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        options: &ImportOptions,
    ) -> Result<Imported> {
        match SourceFormat::from_path(file_name)? {
            format @ SourceFormat::Delimited { .. } => {
                self.import_delimited(&bytes, &format, options)
            }
            SourceFormat::Workbook => self.import_workbook(Workbook::from_bytes(bytes)?, options),
        }
    }

    fn import_delimited(
        &self,
        bytes: &[u8],
        format: &SourceFormat,
        options: &ImportOptions,
    ) -> Result<Imported> {
        let csv_options = format.csv_options().unwrap_or_default();
        let matrix = read_matrix(&decode_text(bytes), &csv_options)?;
        let normalized = self.normalize_matrix(&matrix, options.header_choice())?;
        Ok(Imported {
            normalized,
            workbook: None,
        })
    }

    fn import_workbook<RS: Read + Seek>(
        &self,
        mut workbook: Workbook<RS>,
        options: &ImportOptions,
    ) -> Result<Imported> {
        let matrix = workbook.read_matrix(options.sheet)?;
        if matrix.is_empty() {
            return Err(NormalizeError::EmptySheet);
        }

        let normalized = self.normalize_matrix(&matrix, options.header_choice())?;
        let selection = WorkbookSelection {
            sheet_names: workbook.sheet_names().to_vec(),
            sheet_index: options.sheet,
            header_row_index: normalized.header.row_index.unwrap_or_default(),
            matrix,
        };

        tracing::info!(
            sheet = selection.sheet_name().unwrap_or_default(),
            header_row = selection.header_row_index,
            "imported workbook sheet"
        );
        Ok(Imported {
            normalized,
            workbook: Some(selection),
        })
    }
}
