//! Tables for cardgrid
//!
//! Holds the data shapes the header-inference engine works on, together with
//! the readers and writers around it:
//!
//! - [`RawMatrix`]: the grid of raw cell strings produced by a reader, in
//!   original row order, ragged rows allowed;
//! - [`Table`]: the canonical headers + rows structure consumed by editors,
//!   previews and the CSV exporter;
//! - delimited-text reading and CSV export ([`read_matrix`], [`write_table`]);
//! - workbook reading through calamine ([`Workbook`]).
//!
//! # Examples
//!
//! ```
//! use cardgrid_sheet::{table_to_csv, CsvExportOptions, Table};
//!
//! let table = Table::from_headers(
//!     vec!["SKU", "Name"],
//!     vec![vec!["A1".to_string(), "Widget".to_string()]],
//! );
//!
//! let csv = table_to_csv(&table, &CsvExportOptions::default().with_bom(false)).unwrap();
//! assert_eq!(csv, "SKU;Name\r\nA1;Widget\r\n");
//! ```
//!
//! ## Reading a workbook
//!
//! ```no_run
//! use cardgrid_sheet::Workbook;
//!
//! let mut workbook = Workbook::open("template.xlsx").unwrap();
//! let matrix = workbook.read_matrix(0).unwrap();
//! println!("{} rows", matrix.row_count());
//! ```

mod delimited;
mod error;
mod format;
mod matrix;
mod table;
mod workbook;

/// Re-export CSV reading and export helpers.
pub use delimited::{
    decode_text, export_file_name, read_matrix, read_matrix_from_path, save_table,
    sniff_delimiter, table_to_csv, write_table, CsvExportOptions, CsvOptions, Delimiter,
};
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export source format detection.
pub use format::SourceFormat;
/// Re-export the raw matrix type.
pub use matrix::RawMatrix;
/// Re-export table types.
pub use table::{fallback_name, Column, Table, PREVIEW_COLS, PREVIEW_ROWS};
/// Re-export the workbook reader.
pub use workbook::Workbook;
