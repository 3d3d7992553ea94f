//! Ranked Feature Tables
//! Feature → score tables sorted high to low, with the slicing used by the
//! reports.

use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFeature {
    pub feature: String,
    pub score: f64,
}

/// Scores sorted in non-increasing order; equal scores keep input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ranking {
    entries: Vec<RankedFeature>,
}

impl Ranking {
    /// Rank `(feature, score)` pairs. NaN scores are left out.
    pub fn from_scores<I, S>(scores: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut entries: Vec<RankedFeature> = scores
            .into_iter()
            .filter(|(_, score)| !score.is_nan())
            .map(|(feature, score)| RankedFeature {
                feature: feature.into(),
                score,
            })
            .collect();
        entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        Self { entries }
    }

    pub fn entries(&self) -> &[RankedFeature] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.feature == feature)
            .map(|e| e.score)
    }

    /// First `n` entries.
    pub fn top(&self, n: usize) -> Ranking {
        self.filtered(|_| true, Some(n))
    }

    /// Last `n` entries, still high to low.
    pub fn bottom(&self, n: usize) -> Ranking {
        let start = self.entries.len().saturating_sub(n);
        Ranking {
            entries: self.entries[start..].to_vec(),
        }
    }

    /// Every entry except the named features.
    pub fn without<S: AsRef<str>>(&self, features: &[S]) -> Ranking {
        self.filtered(
            |e| !features.iter().any(|f| f.as_ref() == e.feature),
            None,
        )
    }

    /// Entries with a score above zero.
    pub fn positive(&self) -> Ranking {
        self.filtered(|e| e.score > 0.0, None)
    }

    /// Entries with a score below zero.
    pub fn negative(&self) -> Ranking {
        self.filtered(|e| e.score < 0.0, None)
    }

    /// Scores divided by the largest one. Left as is when that is not positive.
    pub fn normalized(&self) -> Ranking {
        let max = self
            .entries
            .iter()
            .map(|e| e.score)
            .fold(f64::NEG_INFINITY, f64::max);
        if max <= 0.0 || !max.is_finite() {
            return self.clone();
        }
        Ranking {
            entries: self
                .entries
                .iter()
                .map(|e| RankedFeature {
                    feature: e.feature.clone(),
                    score: e.score / max,
                })
                .collect(),
        }
    }

    /// Whether scores never increase down the table.
    pub fn is_sorted_desc(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].score >= w[1].score)
    }

    fn filtered<F>(&self, keep: F, limit: Option<usize>) -> Ranking
    where
        F: Fn(&RankedFeature) -> bool,
    {
        Ranking {
            entries: self
                .entries
                .iter()
                .filter(|e| keep(e))
                .take(limit.unwrap_or(usize::MAX))
                .cloned()
                .collect(),
        }
    }
}
