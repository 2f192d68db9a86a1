use crate::error::{NormalizeError, Result};
use crate::scorer::Scorer;
use cardgrid_sheet::RawMatrix;
use serde::Serialize;

/// A row considered as the header, with its score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderCandidate {
    pub row_index: usize,
    pub score: i32,
}

/// Outcome of scanning the leading rows of a matrix for the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderLocation {
    /// Highest-scoring row in the window (earliest wins ties)
    pub best: HeaderCandidate,
    /// Whether `best` reached the acceptance score
    pub accepted: bool,
}

impl HeaderLocation {
    /// Row to use as the header: the best row when accepted, row 0 otherwise
    #[must_use]
    pub fn row_index(&self) -> usize {
        if self.accepted {
            self.best.row_index
        } else {
            0
        }
    }
}

/// Pick the highest-scoring candidate, keeping the first of equal scores
pub fn best_candidate<I>(candidates: I) -> Option<HeaderCandidate>
where
    I: IntoIterator<Item = HeaderCandidate>,
{
    let mut best: Option<HeaderCandidate> = None;
    for candidate in candidates {
        if best.map_or(true, |b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }
    best
}

/// Find the header row among the first `window` rows of `matrix`
pub fn locate(matrix: &RawMatrix, scorer: &Scorer, window: usize) -> Result<HeaderLocation> {
    let candidates = matrix
        .rows()
        .take(window.max(1))
        .enumerate()
        .map(|(row_index, row)| {
            let score = scorer.score(row);
            tracing::debug!(row = row_index, score, "scored header candidate");
            HeaderCandidate { row_index, score }
        });

    let best = best_candidate(candidates).ok_or(NormalizeError::EmptyInput)?;
    let accepted = best.score >= scorer.config().accept_score;

    Ok(HeaderLocation { best, accepted })
}
