use thiserror::Error;

/// Errors that can occur while reading, building or writing tables
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Row index out of bounds: {index} (table has {count} rows)")]
    RowOutOfBounds { index: usize, count: usize },

    #[error("Column index out of bounds: {index} (table has {count} columns)")]
    ColumnOutOfBounds { index: usize, count: usize },

    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    #[error("Sheet not found: index {index} (workbook has {count} sheets)")]
    SheetNotFound { index: usize, count: usize },

    #[error("Unsupported file format: '{extension}'. Supported: csv, tsv, xlsx, xlsm, xlsb, xls, ods")]
    UnsupportedFormat { extension: String },

    #[error("Workbook read error: {0}")]
    Workbook(String),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;
