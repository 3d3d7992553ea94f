//! Text summaries of the correlation ranking.

use crate::stats::Ranking;

/// Two-column table of feature names and scores to 3 decimals.
pub fn format_ranking(ranking: &Ranking) -> String {
    let width = ranking
        .entries()
        .iter()
        .map(|e| e.feature.chars().count())
        .chain(std::iter::once("Feature".len()))
        .max()
        .unwrap_or(0);

    let mut out = format!("{:<width$}  {:>11}\n", "Feature", "Correlation");
    for entry in ranking.entries() {
        out.push_str(&format!("{:<width$}  {:>11.3}\n", entry.feature, entry.score));
    }
    out
}

/// Strongest positive and most negative correlations with the target.
pub fn correlation_summary(skill_correlation: &Ranking, n: usize) -> String {
    let mut out = String::new();
    out.push_str("Positive Correlations (Likely to Increase Skill):\n");
    out.push_str(&format_ranking(&skill_correlation.positive().top(n)));
    out.push('\n');
    out.push_str("Negative Correlations (Likely to Decrease Skill):\n");
    out.push_str(&format_ranking(&skill_correlation.negative().bottom(n)));
    out
}
