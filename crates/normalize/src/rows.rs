use crate::config::ScanConfig;

/// Highest count of filled cells that still makes a row "mostly empty"
pub fn fill_limit(column_count: usize, threshold: f64) -> usize {
    let scaled = (column_count as f64 * threshold).floor() as usize;
    scaled.max(1)
}

/// Drops near-empty rows and, when enabled, template help text.
#[derive(Debug, Clone)]
pub struct RowFilter {
    fill_limit: usize,
    helper_enabled: bool,
    helper_phrases: Vec<String>,
    helper_max_chars: Option<usize>,
}

impl RowFilter {
    /// A filter for rows of a table with `column_count` columns.
    ///
    /// `threshold` is the fill ratio at or under which a row is noise. The
    /// help-text predicate only runs when `helper_enabled` is set.
    pub fn new(
        config: &ScanConfig,
        column_count: usize,
        threshold: f64,
        helper_enabled: bool,
    ) -> Self {
        RowFilter {
            fill_limit: fill_limit(column_count, threshold),
            helper_enabled,
            helper_phrases: config.helper_phrases.iter().map(|p| p.to_lowercase()).collect(),
            helper_max_chars: config.helper_max_chars,
        }
    }

    /// Whether the row has no more filled cells than the fill limit
    pub fn is_mostly_empty<S: AsRef<str>>(&self, row: &[S]) -> bool {
        let filled = row.iter().filter(|v| !v.as_ref().trim().is_empty()).count();
        filled <= self.fill_limit
    }

    /// Whether the row reads like instructions from the template
    pub fn is_helper_text<S: AsRef<str>>(&self, row: &[S]) -> bool {
        let joined = row
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        if self
            .helper_max_chars
            .is_some_and(|max| joined.chars().count() > max)
        {
            return true;
        }
        self.helper_phrases.iter().any(|p| joined.contains(p.as_str()))
    }

    /// Whether a row survives both predicates
    pub fn keeps<S: AsRef<str>>(&self, row: &[S]) -> bool {
        if self.is_mostly_empty(row) {
            return false;
        }
        !(self.helper_enabled && self.is_helper_text(row))
    }

    /// Keep the rows that pass, in their original order
    pub fn retain_rows(&self, rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
        let before = rows.len();
        let kept: Vec<Vec<String>> = rows
            .into_iter()
            .filter(|row| self.keeps(row.as_slice()))
            .collect();
        if kept.len() < before {
            tracing::debug!(dropped = before - kept.len(), kept = kept.len(), "filtered rows");
        }
        kept
    }
}
