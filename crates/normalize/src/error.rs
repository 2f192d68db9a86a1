use cardgrid_sheet::SheetError;
use thiserror::Error;

/// Errors that can occur while locating headers and normalizing a table
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Cannot locate a header row: the matrix has no rows")]
    EmptyInput,

    #[error("Sheet is empty: there are no rows to read")]
    EmptySheet,

    #[error("No usable column names in the header row; choose a different header row")]
    NoHeaders,

    #[error("Header row {index} is out of range (sheet has {rows} rows)")]
    HeaderRowOutOfRange { index: usize, rows: usize },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
