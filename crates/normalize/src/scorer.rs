use crate::config::ScanConfig;
use crate::error::Result;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Score of a row with too few values to ever be a header
pub const REJECTED_SCORE: i32 = -999;

const SENTENCE_END: [char; 3] = ['.', '!', '?'];

/// Rates how plausible it is that a row of values is a header row.
///
/// Built once per config; the keyword list and placeholder pattern are
/// compiled up front so scoring itself is pure and cheap.
#[derive(Debug, Clone)]
pub struct Scorer {
    config: ScanConfig,
    keywords: Option<Regex>,
    placeholder: Regex,
}

impl Scorer {
    /// Compile the keyword list and placeholder pattern of `config`
    pub fn new(config: &ScanConfig) -> Result<Self> {
        config.validate()?;

        let keywords = if config.keywords.is_empty() {
            None
        } else {
            let alternation = config
                .keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            Some(RegexBuilder::new(&alternation).case_insensitive(true).build()?)
        };

        let placeholder = RegexBuilder::new(&config.placeholder_pattern)
            .case_insensitive(true)
            .build()?;

        Ok(Scorer {
            config: config.clone(),
            keywords,
            placeholder,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Whether a (trimmed) label is an auto-generated blank-column marker
    #[must_use]
    pub fn is_placeholder(&self, value: &str) -> bool {
        self.placeholder.is_match(value.trim())
    }

    /// Whether a value mentions one of the configured field keywords
    #[must_use]
    pub fn is_keyword(&self, value: &str) -> bool {
        self.keywords.as_ref().is_some_and(|re| re.is_match(value))
    }

    /// Score one row of values; higher means more header-like.
    ///
    /// Rows with fewer than `min_header_cells` non-empty values get
    /// [`REJECTED_SCORE`]. Otherwise the score is the number of distinct
    /// values (capped), plus a bonus per keyword hit, minus penalties for
    /// placeholder labels, long values and sentence-like text.
    pub fn score<S: AsRef<str>>(&self, values: &[S]) -> i32 {
        let cfg = &self.config;
        let cleaned: Vec<&str> = values
            .iter()
            .map(|v| v.as_ref().trim())
            .filter(|v| !v.is_empty())
            .collect();

        if cleaned.len() < cfg.min_header_cells {
            return REJECTED_SCORE;
        }

        let distinct: HashSet<&str> = cleaned.iter().copied().collect();
        let mut score = distinct.len().min(cfg.distinct_cap) as i32;

        for value in &cleaned {
            if self.is_keyword(value) {
                score += cfg.keyword_bonus;
            }
            if self.placeholder.is_match(value) {
                score -= cfg.placeholder_penalty;
            }
            if value.chars().count() > cfg.long_value_chars {
                score -= cfg.long_value_penalty;
            }

            let words = value.split_whitespace().count();
            if words > cfg.max_header_words {
                score -= cfg.wordy_penalty;
            }
            if words >= 3 && (value.ends_with(SENTENCE_END) || value.contains(". ")) {
                score -= cfg.sentence_penalty;
            }
        }

        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> Scorer {
        Scorer::new(&ScanConfig::default()).unwrap()
    }

    #[test]
    fn test_too_few_values_rejected() {
        let s = scorer();
        assert_eq!(s.score(&["Group A", "", "Group A"]), REJECTED_SCORE);
        assert_eq!(s.score(&["  ", "x"]), REJECTED_SCORE);
        assert_eq!(s.score::<&str>(&[]), REJECTED_SCORE);
    }

    #[test]
    fn test_distinct_values_and_keywords() {
        let s = scorer();
        // 3 distinct + SKU + Price
        assert_eq!(s.score(&["SKU", "Name", "Price"]), 15);
        // data rows only count distinct values
        assert_eq!(s.score(&["A1", "Widget", "9.99"]), 3);
        // repeated values count once
        assert_eq!(s.score(&["x", "x", "x", "y"]), 2);
    }

    #[test]
    fn test_keywords_are_case_insensitive_substrings() {
        let s = scorer();
        assert!(s.is_keyword("АРТИКУЛ продавца"));
        assert!(s.is_keyword("Наименование товара"));
        assert!(s.is_keyword("Main image URL"));
        assert!(!s.is_keyword("Weight"));
    }

    #[test]
    fn test_distinct_cap() {
        let s = scorer();
        let wide: Vec<String> = (0..60).map(|i| format!("f{i}")).collect();
        assert_eq!(s.score(&wide), 24);
    }

    #[test]
    fn test_placeholder_penalty() {
        let s = scorer();
        assert!(s.is_placeholder("__EMPTY_3"));
        assert!(s.is_placeholder(" __empty"));
        assert!(!s.is_placeholder("Empty"));
        // 4 distinct - 10
        assert_eq!(s.score(&["a", "b", "c", "__EMPTY"]), -6);
    }

    #[test]
    fn test_long_and_sentence_values_penalised() {
        let s = scorer();
        let long = "x".repeat(81);
        // 3 distinct - 4
        assert_eq!(s.score(&["a", "b", long.as_str()]), -1);

        // 3 distinct - sentence
        assert_eq!(s.score(&["a", "b", "Fill this in."]), 1);

        // 3 distinct - wordy - sentence
        let hint = "Enter the value exactly as it appears on the label.";
        assert_eq!(s.score(&["a", "b", hint]), -1);

        // abbreviations are not sentences
        assert_eq!(s.score(&["a", "b", "Ед. изм."]), 3);
    }

    #[test]
    fn test_empty_keyword_list() {
        let s = Scorer::new(&ScanConfig::default().with_keywords(Vec::<String>::new())).unwrap();
        assert_eq!(s.score(&["SKU", "Name", "Price"]), 3);
    }

    #[test]
    fn test_invalid_placeholder_pattern() {
        let config = ScanConfig {
            placeholder_pattern: "(".to_string(),
            ..ScanConfig::default()
        };
        assert!(Scorer::new(&config).is_err());
    }
}
