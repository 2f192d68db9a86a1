use crate::error::{NormalizeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Marketplace field names that make a row look like a header row.
///
/// Entries are matched as case-insensitive substrings, so stems such as
/// "наимен" cover every inflection.
const DEFAULT_KEYWORDS: &[&str] = &[
    "артикул",
    "бренд",
    "наимен",
    "описан",
    "цена",
    "штрих",
    "цвет",
    "материал",
    "модель",
    "совместим",
    "фото",
    "sku",
    "article",
    "brand",
    "product name",
    "description",
    "price",
    "barcode",
    "color",
    "colour",
    "material",
    "model",
    "compatib",
    "photo",
    "image",
];

/// Phrases that only appear in template instructions, never in product data
const DEFAULT_HELPER_PHRASES: &[&str] = &[
    "this is a number",
    "unique identifier",
    "please fill in",
    "you will be able to",
    "это число",
    "уникальный идентификатор",
    "заполните",
    "вы сможете",
];

/// Tuning for header scoring, header location and row filtering.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Field names that earn `keyword_bonus` (case-insensitive substrings)
    pub keywords: Vec<String>,
    /// Regex for auto-generated blank-column labels
    pub placeholder_pattern: String,
    /// Rows with fewer non-empty values than this can never be headers
    pub min_header_cells: usize,
    /// Ceiling on the distinct-value part of the score
    pub distinct_cap: usize,
    pub keyword_bonus: i32,
    pub placeholder_penalty: i32,
    /// Values longer than this many characters are penalised
    pub long_value_chars: usize,
    pub long_value_penalty: i32,
    /// Values with more whitespace-separated words than this are penalised
    pub max_header_words: usize,
    pub wordy_penalty: i32,
    pub sentence_penalty: i32,
    /// Minimum score for a located row to be trusted as the header
    pub accept_score: i32,
    /// Leading rows searched when locating the header in a raw matrix
    pub matrix_scan_rows: usize,
    /// Leading data rows searched when re-checking an extracted table
    pub rescan_rows: usize,
    /// Fill ratio under which a matrix row counts as noise
    pub matrix_fill_threshold: f64,
    /// Fill ratio under which a row of an extracted table counts as noise
    pub rescan_fill_threshold: f64,
    /// Instructional phrases that mark a row as template help text
    pub helper_phrases: Vec<String>,
    /// Rows whose joined text is longer than this are template help text
    pub helper_max_chars: Option<usize>,
    /// Fewer named columns than this marks a result as low-confidence
    pub min_named_columns: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| (*k).to_string()).collect(),
            placeholder_pattern: "^__empty".to_string(),
            min_header_cells: 3,
            distinct_cap: 24,
            keyword_bonus: 6,
            placeholder_penalty: 10,
            long_value_chars: 80,
            long_value_penalty: 4,
            max_header_words: 6,
            wordy_penalty: 2,
            sentence_penalty: 2,
            accept_score: 8,
            matrix_scan_rows: 40,
            rescan_rows: 25,
            matrix_fill_threshold: 0.08,
            rescan_fill_threshold: 0.06,
            helper_phrases: DEFAULT_HELPER_PHRASES
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            helper_max_chars: Some(400),
            min_named_columns: 3,
        }
    }
}

impl ScanConfig {
    /// Load a config from a JSON or YAML file (chosen by extension)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NormalizeError::Config(format!("{}: {e}", path.display())))?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let config: ScanConfig = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| NormalizeError::Config(format!("{}: {e}", path.display())))?,
            _ => serde_json::from_str(&content)
                .map_err(|e| NormalizeError::Config(format!("{}: {e}", path.display())))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that windows are non-empty and ratios lie in `0..=1`
    pub fn validate(&self) -> Result<()> {
        if self.matrix_scan_rows == 0 || self.rescan_rows == 0 {
            return Err(NormalizeError::Config(
                "scan windows must cover at least one row".to_string(),
            ));
        }
        for (name, value) in [
            ("matrix_fill_threshold", self.matrix_fill_threshold),
            ("rescan_fill_threshold", self.rescan_fill_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(NormalizeError::Config(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Set the header acceptance score
    #[must_use]
    pub fn with_accept_score(mut self, accept_score: i32) -> Self {
        self.accept_score = accept_score;
        self
    }

    /// Set the keyword list
    #[must_use]
    pub fn with_keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set how many leading matrix rows are searched for the header
    #[must_use]
    pub fn with_matrix_scan_rows(mut self, rows: usize) -> Self {
        self.matrix_scan_rows = rows;
        self
    }

    /// Set the help-text length ceiling; `None` keeps long rows
    #[must_use]
    pub fn with_helper_max_chars(mut self, max_chars: Option<usize>) -> Self {
        self.helper_max_chars = max_chars;
        self
    }
}
