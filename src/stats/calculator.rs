//! Statistics Calculator Module
//! Correlation with the target, importance ranking and held-out scoring.

use super::forest::ImportanceModel;
use super::ranking::Ranking;
use crate::data::{FeatureMatrix, NumericColumn, TargetVector};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use statrs::statistics::Statistics;

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Pearson correlation coefficient.
    ///
    /// `None` for mismatched lengths, fewer than two points, or a constant
    /// input.
    pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
        if x.len() != y.len() || x.len() < 2 {
            return None;
        }
        let cov = x.iter().covariance(y.iter());
        let denom = x.iter().std_dev() * y.iter().std_dev();
        let r = cov / denom;
        r.is_finite().then(|| r.clamp(-1.0, 1.0))
    }

    /// Pearson correlation over the rows where both values are present.
    pub fn pairwise_pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
        let (xs, ys): (Vec<f64>, Vec<f64>) = x
            .iter()
            .zip(y)
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .unzip();
        Self::pearson(&xs, &ys)
    }

    /// Correlate every column with `target` and rank high to low.
    ///
    /// The target and any lagged copy of it are kept; callers filter them out
    /// for display. Columns with an undefined correlation are not ranked.
    /// Returns `None` when `target` is not among `columns`.
    pub fn rank_correlation(columns: &[NumericColumn], target: &str) -> Option<Ranking> {
        let target_values = &columns.iter().find(|c| c.name == target)?.values;
        Some(Ranking::from_scores(columns.iter().filter_map(|c| {
            Self::pairwise_pearson(&c.values, target_values).map(|r| (c.name.clone(), r))
        })))
    }

    /// Fit `model` and rank its per-feature importances.
    pub fn rank_importance<M: ImportanceModel>(
        model: &mut M,
        x: &FeatureMatrix,
        y: &TargetVector,
    ) -> Ranking {
        model.fit(x, y);
        Ranking::from_scores(
            x.names
                .iter()
                .cloned()
                .zip(model.feature_importances().iter().copied()),
        )
    }

    /// Shuffle `0..n` and split off `ceil(n * test_fraction)` indices for
    /// testing. Everything goes to training when that would leave it empty.
    pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let n_test = (n as f64 * test_fraction.clamp(0.0, 1.0)).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return (indices, Vec::new());
        }
        let test = indices.split_off(n - n_test);
        (indices, test)
    }

    /// Coefficient of determination.
    pub fn r2_score(actual: &[f64], predicted: &[f64]) -> Option<f64> {
        if actual.len() != predicted.len() || actual.is_empty() {
            return None;
        }
        let mean = actual.iter().sum::<f64>() / actual.len() as f64;
        let ss_res: f64 = actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| (a - p).powi(2))
            .sum();
        let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
        if ss_tot == 0.0 {
            None
        } else {
            Some(1.0 - ss_res / ss_tot)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{ForestConfig, RandomForest};

    fn column(name: &str, values: &[f64]) -> NumericColumn {
        NumericColumn {
            name: name.to_string(),
            values: values.iter().map(|&v| Some(v)).collect(),
        }
    }

    #[test]
    fn test_pearson_perfect_and_inverse() {
        let x = [1.0, 2.0, 3.0, 4.0];

        assert!((StatsCalculator::pearson(&x, &[2.0, 4.0, 6.0, 8.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((StatsCalculator::pearson(&x, &[8.0, 6.0, 4.0, 2.0]).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_known_value() {
        let r = StatsCalculator::pearson(&[1.0, 2.0, 3.0], &[1.0, 3.0, 2.0]).unwrap();

        assert!((r - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_undefined_cases() {
        assert_eq!(StatsCalculator::pearson(&[1.0], &[2.0]), None);
        assert_eq!(StatsCalculator::pearson(&[1.0, 2.0], &[3.0]), None);
        assert_eq!(StatsCalculator::pearson(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn test_pairwise_skips_missing() {
        let x = [Some(1.0), None, Some(2.0), Some(3.0)];
        let y = [Some(2.0), Some(100.0), Some(4.0), Some(6.0)];

        let r = StatsCalculator::pairwise_pearson(&x, &y).unwrap();

        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rank_correlation_includes_target_and_sorts() {
        let columns = vec![
            column("Deaths (Previous Match)", &[4.0, 3.0, 2.0, 1.0]),
            column("Kills (Previous Match)", &[1.0, 2.0, 4.0, 3.0]),
            column("Skill (Previous Match)", &[0.0, 1.0, 2.0, 3.0]),
            column("Constant", &[7.0, 7.0, 7.0, 7.0]),
            column("Skill", &[1.0, 2.0, 3.0, 4.0]),
        ];

        let ranking = StatsCalculator::rank_correlation(&columns, "Skill").unwrap();

        assert!(ranking.is_sorted_desc());
        assert_eq!(ranking.len(), 4);
        assert!((ranking.get("Skill").unwrap() - 1.0).abs() < 1e-12);
        assert!((ranking.get("Deaths (Previous Match)").unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(ranking.get("Constant"), None);
        assert_eq!(ranking.entries().last().unwrap().feature, "Deaths (Previous Match)");
    }

    #[test]
    fn test_rank_correlation_missing_target() {
        let columns = vec![column("Kills", &[1.0, 2.0])];

        assert!(StatsCalculator::rank_correlation(&columns, "Skill").is_none());
    }

    #[test]
    fn test_rank_importance_sorted() {
        let x = FeatureMatrix {
            names: vec!["noise".into(), "kills".into()],
            rows: (0..60).map(|i| vec![((i * 31) % 7) as f64, i as f64]).collect(),
        };
        let y = TargetVector {
            name: "Skill".into(),
            values: (0..60).map(|i| 10.0 * i as f64).collect(),
        };
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 8,
            ..Default::default()
        });

        let ranking = StatsCalculator::rank_importance(&mut forest, &x, &y);

        assert!(ranking.is_sorted_desc());
        assert_eq!(ranking.entries()[0].feature, "kills");
        assert_eq!(ranking.normalized().get("kills"), Some(1.0));
    }

    #[test]
    fn test_train_test_split_sizes() {
        let (train, test) = StatsCalculator::train_test_split(10, 0.2, 42);

        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_train_test_split_deterministic() {
        assert_eq!(
            StatsCalculator::train_test_split(25, 0.2, 42),
            StatsCalculator::train_test_split(25, 0.2, 42)
        );
    }

    #[test]
    fn test_train_test_split_tiny_input() {
        let (train, test) = StatsCalculator::train_test_split(1, 0.2, 42);

        assert_eq!(train, [0]);
        assert!(test.is_empty());
    }

    #[test]
    fn test_r2_score() {
        assert_eq!(StatsCalculator::r2_score(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), Some(1.0));
        assert_eq!(StatsCalculator::r2_score(&[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0]), Some(0.0));
        assert_eq!(StatsCalculator::r2_score(&[4.0, 4.0], &[4.0, 4.0]), None);
    }
}
