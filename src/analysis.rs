//! Analysis Pipeline
//! Cleans the record set, builds previous-match features and produces the
//! importance and correlation rankings.

use crate::config::AppConfig;
use crate::data::{DataProcessor, FeatureMatrix, ProcessorError, TargetVector};
use crate::stats::{ForestConfig, RandomForest, Ranking, StatsCalculator};
use polars::prelude::DataFrame;
use tracing::{debug, info};

/// Everything the reports are drawn from.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Forest importances, high to low.
    pub importance: Ranking,
    /// Correlation with the target for every numeric column, including the
    /// target itself and its previous-match copy.
    pub correlation: Ranking,
    /// `correlation` without the target and its previous-match copy.
    pub skill_correlation: Ranking,
    /// R² of the forest on the held-out rows, when there were any.
    pub held_out_r2: Option<f64>,
    pub n_samples: usize,
    pub n_features: usize,
}

/// Run the full analysis over a loaded record set.
pub fn analyze(records: &DataFrame, config: &AppConfig) -> Result<AnalysisReport, ProcessorError> {
    let target = config.target_column.as_str();
    let previous_target = config.previous_target();

    let cleaned = DataProcessor::drop_columns(records, &config.irrelevant_columns)?;
    info!(
        "Kept {} of {} columns after dropping irrelevant ones",
        cleaned.width(),
        records.width()
    );

    let lagged = DataProcessor::lag_records(&cleaned, target)?;
    let (x, y) = DataProcessor::features_from_lagged(&lagged, target)?;
    info!(
        "Built {} previous-match rows with {} numeric features",
        x.n_samples(),
        x.n_features()
    );

    let (importance, held_out_r2) = fit_importance(&x, &y, config);

    let numeric = DataProcessor::numeric_columns(&lagged)?;
    let correlation = StatsCalculator::rank_correlation(&numeric, target)
        .ok_or_else(|| ProcessorError::MissingTarget(target.to_string()))?;
    let skill_correlation = correlation.without(&[target, previous_target.as_str()]);
    debug!(
        "{} correlations ranked, {} after excluding the target",
        correlation.len(),
        skill_correlation.len()
    );

    Ok(AnalysisReport {
        importance,
        correlation,
        skill_correlation,
        held_out_r2,
        n_samples: x.n_samples(),
        n_features: x.n_features(),
    })
}

/// Fit the forest on the training split and score it on the rest.
fn fit_importance(x: &FeatureMatrix, y: &TargetVector, config: &AppConfig) -> (Ranking, Option<f64>) {
    let (train, test) =
        StatsCalculator::train_test_split(x.n_samples(), config.test_fraction, config.forest.seed);
    let (x_train, y_train) = (x.subset(&train), y.subset(&train));

    let mut forest = RandomForest::new(ForestConfig::from(&config.forest));
    let importance = StatsCalculator::rank_importance(&mut forest, &x_train, &y_train);
    info!(
        "Fitted {} trees on {} rows ({} held out)",
        forest.n_trees(),
        train.len(),
        test.len()
    );

    let held_out_r2 = if test.is_empty() {
        None
    } else {
        let predicted = forest.predict(&x.subset(&test));
        StatsCalculator::r2_score(&y.subset(&test).values, &predicted)
    };
    match held_out_r2 {
        Some(r2) => info!("Held-out R²: {:.3}", r2),
        None => debug!("No held-out score available"),
    }

    (importance, held_out_r2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestSettings;
    use polars::prelude::*;

    fn matches(n: usize) -> DataFrame {
        // Newest first: skill climbs with kills in the match before.
        let kills: Vec<i64> = (0..n).map(|i| ((i * 37) % 11) as i64).collect();
        let deaths: Vec<i64> = (0..n).map(|i| ((i * 13) % 7) as i64).collect();
        let skill: Vec<i64> = (0..n)
            .map(|i| if i == 0 { 1000 } else { 1000 + 10 * kills[i - 1] - 3 * deaths[i - 1] })
            .collect();
        let maps: Vec<&str> = (0..n).map(|i| if i % 2 == 0 { "Rust" } else { "Hijacked" }).collect();
        let ids: Vec<String> = (0..n).map(|i| format!("m{i}")).collect();

        df!(
            "Match ID" => ids,
            "Map" => maps,
            "Skill" => skill,
            "Kills" => kills,
            "Deaths" => deaths
        )
        .unwrap()
    }

    fn config() -> AppConfig {
        AppConfig {
            forest: ForestSettings {
                n_trees: 12,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_analyze_end_to_end() {
        let report = analyze(&matches(60), &config()).unwrap();

        assert_eq!(report.n_samples, 59);
        assert_eq!(report.n_features, 2);
        assert!(report.importance.is_sorted_desc());
        assert!(report.correlation.is_sorted_desc());
        assert_eq!(report.importance.entries()[0].feature, "Kills (Previous Match)");

        assert!(report.correlation.get("Skill").is_some());
        assert_eq!(report.skill_correlation.len(), report.correlation.len() - 2);
        assert!(report.skill_correlation.get("Skill").is_none());
        assert!(report.skill_correlation.get("Skill (Previous Match)").is_none());
        assert!(report.skill_correlation.get("Kills (Previous Match)").unwrap() > 0.5);
        assert!(report.skill_correlation.get("Deaths (Previous Match)").unwrap() < 0.0);
        assert!(report.held_out_r2.is_some());
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let a = analyze(&matches(40), &config()).unwrap();
        let b = analyze(&matches(40), &config()).unwrap();

        assert_eq!(a.importance, b.importance);
        assert_eq!(a.held_out_r2, b.held_out_r2);
    }

    #[test]
    fn test_analyze_missing_target() {
        let df = df!("Kills" => [1i64, 2, 3]).unwrap();

        assert!(matches!(
            analyze(&df, &config()),
            Err(ProcessorError::MissingTarget(_))
        ));
    }
}
