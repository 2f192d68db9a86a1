use crate::columns::{clean_header_row, clean_label, drop_empty_generated, project};
use crate::config::ScanConfig;
use crate::error::{NormalizeError, Result};
use crate::locate::{best_candidate, locate, HeaderCandidate};
use crate::rows::RowFilter;
use crate::scorer::Scorer;
use cardgrid_sheet::{Column, RawMatrix, Table};
use indexmap::IndexMap;
use serde::Serialize;

/// How the header row of a raw matrix is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderChoice {
    /// Locate the header by scoring the leading rows
    #[default]
    Auto,
    /// Use this row, as picked by the caller
    Explicit(usize),
}

/// Where the header of a normalized table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderSource {
    /// The row the caller picked
    Explicit,
    /// The best-scoring row, which reached the acceptance score
    Located,
    /// Row 0, because no row reached the acceptance score
    Fallback,
    /// A row found inside the data of an extracted table
    Rescanned,
    /// The headers of the input table, unchanged
    Kept,
}

/// The header decision behind a normalized table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderDecision {
    pub source: HeaderSource,
    /// Row of the input that became the header, if a row was picked
    pub row_index: Option<usize>,
    /// Score of the header row, if it was scored
    pub score: Option<i32>,
}

/// A canonical table and how its header was decided
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalized {
    pub table: Table,
    pub header: HeaderDecision,
    low_confidence: bool,
}

impl Normalized {
    fn new(table: Table, header: HeaderDecision, config: &ScanConfig) -> Self {
        let low_confidence = table.named_column_count() < config.min_named_columns;
        Normalized {
            table,
            header,
            low_confidence,
        }
    }

    /// Whether too few named columns survived to trust the result
    #[must_use]
    pub fn is_low_confidence(&self) -> bool {
        self.low_confidence
    }

    /// Whether the header was taken from row 0 after no row scored high enough
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.header.source == HeaderSource::Fallback
    }
}

/// Why a rescan kept the original headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescanRejection {
    /// The header of the table was already chosen by an earlier pass
    HeaderSettled,
    /// The table has no data rows to scan
    NoCandidate,
    /// No row reached the acceptance score
    BelowThreshold { score: i32 },
    /// The best row does not beat the current headers
    NotBetter { score: i32, current: i32 },
    /// The promoted row leaves too few named columns
    TooFewNamedColumns { named: usize },
}

/// Result of searching the data of an extracted table for a better header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rescan {
    Accepted {
        candidate: HeaderCandidate,
        columns: Vec<Column>,
    },
    Rejected(RescanRejection),
}

/// Turns raw matrices and naively extracted tables into canonical tables.
///
/// Holds no state between calls; one instance can normalize any number of
/// inputs.
#[derive(Debug, Clone)]
pub struct Normalizer {
    scorer: Scorer,
}

impl Normalizer {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        Ok(Normalizer {
            scorer: Scorer::new(config)?,
        })
    }

    #[must_use]
    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        self.scorer.config()
    }

    /// Normalize a raw matrix, locating the header or using the caller's row
    pub fn normalize_matrix(&self, matrix: &RawMatrix, choice: HeaderChoice) -> Result<Normalized> {
        if matrix.is_empty() {
            return Err(NormalizeError::EmptySheet);
        }
        let config = self.config();

        let header = match choice {
            HeaderChoice::Explicit(index) => {
                let row = matrix.row(index).ok_or(NormalizeError::HeaderRowOutOfRange {
                    index,
                    rows: matrix.row_count(),
                })?;
                HeaderDecision {
                    source: HeaderSource::Explicit,
                    row_index: Some(index),
                    score: Some(self.scorer.score(row)),
                }
            }
            HeaderChoice::Auto => {
                let location = locate(matrix, &self.scorer, config.matrix_scan_rows)?;
                if location.accepted {
                    HeaderDecision {
                        source: HeaderSource::Located,
                        row_index: Some(location.best.row_index),
                        score: Some(location.best.score),
                    }
                } else {
                    tracing::warn!(
                        best_row = location.best.row_index,
                        best_score = location.best.score,
                        accept_score = config.accept_score,
                        "no row looks like a header, using the first row"
                    );
                    let first = matrix.row(0).unwrap_or_default();
                    HeaderDecision {
                        source: HeaderSource::Fallback,
                        row_index: Some(0),
                        score: Some(self.scorer.score(first)),
                    }
                }
            }
        };

        let header_index = header.row_index.unwrap_or_default();
        let columns = clean_header_row(matrix.row(header_index).unwrap_or_default(), &self.scorer);
        if columns.iter().all(|c| c.generated) {
            return Err(NormalizeError::NoHeaders);
        }

        let positions: Vec<usize> = columns.iter().map(|c| c.position).collect();
        let filter = RowFilter::new(
            config,
            columns.len(),
            config.matrix_fill_threshold,
            header.source != HeaderSource::Fallback,
        );
        let rows = filter.retain_rows(
            matrix
                .rows()
                .skip(header_index + 1)
                .map(|row| project(row, &positions))
                .collect(),
        );
        let (columns, rows) = drop_empty_generated(columns, rows);

        tracing::info!(
            source = ?header.source,
            row = header_index,
            score = header.score,
            columns = columns.len(),
            rows = rows.len(),
            "normalized matrix"
        );
        let table = Table::new(columns, rows).with_settled_header();
        Ok(Normalized::new(table, header, config))
    }

    /// Normalize a mapping-based table whose header was assumed to be row 0
    pub fn normalize_records<S: AsRef<str>>(
        &self,
        headers: &[S],
        records: &[IndexMap<String, String>],
    ) -> Result<Normalized> {
        self.normalize_table(&Table::from_records(headers, records))
    }

    /// Normalize an extracted table.
    ///
    /// The leading data rows are searched for a row that looks more like a
    /// header than the current one. When one is found the table is re-based
    /// on it; otherwise the current named columns are kept. Tables that come
    /// out of a [`Normalizer`] are not searched again.
    pub fn normalize_table(&self, table: &Table) -> Result<Normalized> {
        let config = self.config();

        let positions: Vec<usize> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| clean_label(&c.name, &self.scorer).is_some())
            .map(|(i, _)| i)
            .collect();

        if positions.len() < config.min_header_cells {
            let columns: Vec<Column> = table
                .columns()
                .iter()
                .map(|c| match clean_label(&c.name, &self.scorer) {
                    Some(name) if !c.generated => Column::named(name, c.position),
                    _ => Column::generated(c.position),
                })
                .collect();
            if columns.iter().all(|c| c.generated) {
                return Err(NormalizeError::NoHeaders);
            }

            tracing::warn!(
                named = positions.len(),
                "too few column names to check, keeping the table as is"
            );
            return Ok(Normalized {
                table: Table::new(columns, table.rows().to_vec()).with_settled_header(),
                header: HeaderDecision {
                    source: HeaderSource::Kept,
                    row_index: None,
                    score: None,
                },
                low_confidence: true,
            });
        }

        let current: Vec<&str> = positions
            .iter()
            .map(|&i| {
                let column = &table.columns()[i];
                if column.generated {
                    ""
                } else {
                    column.name.as_str()
                }
            })
            .collect();
        let current_score = self.scorer.score(&current);

        // fill is measured against every input column, named or not
        let width = table.col_count();

        match self.rescan(table, &positions, current_score) {
            Rescan::Accepted { candidate, columns } => {
                let filter = RowFilter::new(config, width, config.rescan_fill_threshold, true);
                let rows = table
                    .rows()
                    .iter()
                    .skip(candidate.row_index + 1)
                    .filter(|row| filter.keeps(row.as_slice()))
                    .map(|row| project(row, &positions))
                    .collect();
                let (columns, rows) = drop_empty_generated(columns, rows);

                tracing::info!(
                    row = candidate.row_index,
                    score = candidate.score,
                    previous = current_score,
                    "re-based table on a header found in its data"
                );
                let header = HeaderDecision {
                    source: HeaderSource::Rescanned,
                    row_index: Some(candidate.row_index),
                    score: Some(candidate.score),
                };
                let table = Table::new(columns, rows).with_settled_header();
                Ok(Normalized::new(table, header, config))
            }
            Rescan::Rejected(reason) => {
                tracing::debug!(?reason, "keeping the current headers");
                let filter = RowFilter::new(config, width, config.rescan_fill_threshold, false);
                let columns: Vec<Column> =
                    positions.iter().map(|&i| table.columns()[i].clone()).collect();
                if columns.iter().all(|c| c.generated) {
                    return Err(NormalizeError::NoHeaders);
                }
                let rows = table
                    .rows()
                    .iter()
                    .filter(|row| filter.keeps(row.as_slice()))
                    .map(|row| project(row, &positions))
                    .collect();

                let header = HeaderDecision {
                    source: HeaderSource::Kept,
                    row_index: None,
                    score: Some(current_score),
                };
                let table = Table::new(columns, rows).with_settled_header();
                Ok(Normalized::new(table, header, config))
            }
        }
    }

    /// Look for a header row among the leading rows of `table`, reading only
    /// the columns at `positions`
    pub fn rescan(&self, table: &Table, positions: &[usize], current_score: i32) -> Rescan {
        if table.has_settled_header() {
            return Rescan::Rejected(RescanRejection::HeaderSettled);
        }
        let config = self.config();

        let candidates = table
            .rows()
            .iter()
            .take(config.rescan_rows)
            .enumerate()
            .map(|(row_index, row)| HeaderCandidate {
                row_index,
                score: self.scorer.score(&project(row, positions)),
            });

        let Some(best) = best_candidate(candidates) else {
            return Rescan::Rejected(RescanRejection::NoCandidate);
        };
        if best.score < config.accept_score {
            return Rescan::Rejected(RescanRejection::BelowThreshold { score: best.score });
        }
        if best.score <= current_score {
            return Rescan::Rejected(RescanRejection::NotBetter {
                score: best.score,
                current: current_score,
            });
        }

        let promoted = project(&table.rows()[best.row_index], positions);
        let columns = clean_header_row(&promoted, &self.scorer);
        let named = columns.iter().filter(|c| !c.generated).count();
        if named < config.min_named_columns {
            tracing::warn!(
                row = best.row_index,
                named,
                "promoted header row has too few names, keeping the current headers"
            );
            return Rescan::Rejected(RescanRejection::TooFewNamedColumns { named });
        }

        Rescan::Accepted {
            candidate: best,
            columns,
        }
    }
}

/// Normalize a raw matrix with a one-off [`Normalizer`]
pub fn normalize_matrix(
    matrix: &RawMatrix,
    choice: HeaderChoice,
    config: &ScanConfig,
) -> Result<Normalized> {
    Normalizer::new(config)?.normalize_matrix(matrix, choice)
}

/// Normalize an extracted table with a one-off [`Normalizer`]
pub fn normalize_table(table: &Table, config: &ScanConfig) -> Result<Normalized> {
    Normalizer::new(config)?.normalize_table(table)
}

/// Normalize a mapping-based table with a one-off [`Normalizer`]
pub fn normalize_records<S: AsRef<str>>(
    headers: &[S],
    records: &[IndexMap<String, String>],
    config: &ScanConfig,
) -> Result<Normalized> {
    Normalizer::new(config)?.normalize_records(headers, records)
}
