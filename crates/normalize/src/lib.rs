//! Header-row inference and table normalization for cardgrid
//!
//! Marketplace export templates rarely start with their header row: a
//! category line, a field-group line or a row of hints usually comes first.
//! This crate finds the real header and turns the raw cells into a canonical
//! [`Table`](cardgrid_sheet::Table):
//!
//! 1. [`Scorer`] rates how header-like a row is;
//! 2. [`locate`] picks the best row in a leading window, falling back to
//!    row 0 when nothing scores high enough;
//! 3. [`clean_header_row`] turns the header cells into columns, naming blank
//!    and placeholder cells by position;
//! 4. [`RowFilter`] drops near-empty rows and template help text.
//!
//! [`Normalizer`] composes these steps and reports how the header was chosen
//! ([`HeaderDecision`]) so callers can offer a manual override.
//!
//! # Examples
//!
//! ```
//! use cardgrid_normalize::{HeaderChoice, HeaderSource, Normalizer, ScanConfig};
//! use cardgrid_sheet::RawMatrix;
//!
//! let matrix = RawMatrix::from_rows(vec![
//!     vec!["Group A", "", "Group A"],
//!     vec!["SKU", "Name", "Price"],
//!     vec!["A1", "Widget", "9.99"],
//! ]);
//!
//! let normalizer = Normalizer::new(&ScanConfig::default()).unwrap();
//! let result = normalizer.normalize_matrix(&matrix, HeaderChoice::Auto).unwrap();
//!
//! assert_eq!(result.header.source, HeaderSource::Located);
//! assert_eq!(result.header.row_index, Some(1));
//! assert_eq!(result.table.headers(), vec!["SKU", "Name", "Price"]);
//! assert_eq!(result.table.value(0, "Price").unwrap(), "9.99");
//! ```
//!
//! ## Importing a file
//!
//! ```no_run
//! use cardgrid_normalize::{ImportOptions, Normalizer, ScanConfig};
//!
//! let normalizer = Normalizer::new(&ScanConfig::default()).unwrap();
//! let imported = normalizer
//!     .import_file("ozon_template.xlsx", &ImportOptions::default())
//!     .unwrap();
//! println!("{:?}", imported.normalized.table.headers());
//! ```

mod columns;
mod config;
mod error;
mod import;
mod locate;
mod normalizer;
mod rows;
mod scorer;

/// Re-export column cleaning.
pub use columns::{clean_header_row, clean_label, drop_empty_generated, project};
/// Re-export configuration.
pub use config::ScanConfig;
/// Re-export error types.
pub use error::{NormalizeError, Result};
/// Re-export file import.
pub use import::{ImportOptions, Imported, WorkbookSelection};
/// Re-export header location.
pub use locate::{best_candidate, locate, HeaderCandidate, HeaderLocation};
/// Re-export the normalizer.
pub use normalizer::{
    normalize_matrix, normalize_records, normalize_table, HeaderChoice, HeaderDecision,
    HeaderSource, Normalized, Normalizer, Rescan, RescanRejection,
};
/// Re-export row filtering.
pub use rows::{fill_limit, RowFilter};
/// Re-export the scorer.
pub use scorer::{Scorer, REJECTED_SCORE};
