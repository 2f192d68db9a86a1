use crate::delimited::CsvOptions;
use crate::error::{Result, SheetError};
use std::path::Path;

/// How a source file has to be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text; `delimiter` is `None` when it must be sniffed
    Delimited { delimiter: Option<u8> },
    /// A spreadsheet workbook with one or more sheets
    Workbook,
}

impl SourceFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_lowercase().as_str() {
            "csv" => Ok(SourceFormat::Delimited { delimiter: None }),
            "tsv" => Ok(SourceFormat::Delimited {
                delimiter: Some(b'\t'),
            }),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Workbook),
            _ => Err(SheetError::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    /// Detect the format from a file name or path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext)
    }

    /// Reader options for delimited formats
    #[must_use]
    pub fn csv_options(&self) -> Option<CsvOptions> {
        match self {
            SourceFormat::Delimited { delimiter } => Some(CsvOptions {
                delimiter: *delimiter,
                ..CsvOptions::default()
            }),
            SourceFormat::Workbook => None,
        }
    }
}
