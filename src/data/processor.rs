//! Data Processor Module
//! Column cleanup, previous-match lagging and feature matrix construction.

use super::loader::is_numeric;
use crate::config::previous_match_name;
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Dataset has no usable rows")]
    EmptyDataset,
    #[error("Target column '{0}' not found")]
    MissingTarget(String),
    #[error("Target column '{0}' is not numeric")]
    NonNumericTarget(String),
    #[error("No numeric feature columns besides the target")]
    NoFeatures,
}

/// Numeric values of one column, `None` where the cell was empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Row-major feature values with their column names.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.names.len()
    }

    /// Rows at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> FeatureMatrix {
        FeatureMatrix {
            names: self.names.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

/// Prediction target, one value per feature row.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetVector {
    pub name: String,
    pub values: Vec<f64>,
}

impl TargetVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn subset(&self, indices: &[usize]) -> TargetVector {
        TargetVector {
            name: self.name.clone(),
            values: indices.iter().map(|&i| self.values[i]).collect(),
        }
    }
}

/// Handles data cleaning and transformation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Drop the named columns that exist; unknown names are ignored.
    pub fn drop_columns<S: AsRef<str>>(
        df: &DataFrame,
        names: &[S],
    ) -> Result<DataFrame, ProcessorError> {
        let mut cleaned = df.clone();
        let mut dropped = 0;
        for name in names {
            let name = name.as_ref();
            if cleaned.get_column_index(name).is_some() {
                cleaned = cleaned.drop(name)?;
                dropped += 1;
            }
        }
        debug!("Dropped {} of {} listed columns", dropped, names.len());
        Ok(cleaned)
    }

    /// Pair every match with the one listed before it.
    ///
    /// Each column is shifted down one row and renamed with the
    /// previous-match suffix; the unshifted `target` column is appended under
    /// its own name. The first row has nothing to pair with and is dropped,
    /// so `N` records become `N - 1` rows.
    pub fn lag_records(df: &DataFrame, target: &str) -> Result<DataFrame, ProcessorError> {
        if df.height() == 0 {
            return Err(ProcessorError::EmptyDataset);
        }
        let current = df
            .column(target)
            .map_err(|_| ProcessorError::MissingTarget(target.to_string()))?
            .clone();

        let mut columns: Vec<Column> = df
            .get_columns()
            .iter()
            .map(|col| {
                let name = previous_match_name(col.name());
                Column::from(col.as_materialized_series().shift(1).with_name(name.into()))
            })
            .collect();
        columns.push(current);

        let lagged = DataFrame::new(columns)?;
        let lagged = lagged.slice(1, lagged.height() - 1);
        if lagged.height() == 0 {
            return Err(ProcessorError::EmptyDataset);
        }
        Ok(lagged)
    }

    /// Every numeric column of `df` as `f64`, in column order.
    pub fn numeric_columns(df: &DataFrame) -> Result<Vec<NumericColumn>, ProcessorError> {
        df.get_columns()
            .iter()
            .filter(|col| is_numeric(col.dtype()))
            .map(|col| {
                Ok(NumericColumn {
                    name: col.name().to_string(),
                    values: Self::column_values(col)?,
                })
            })
            .collect()
    }

    /// Column values cast to `f64`.
    pub fn column_values(col: &Column) -> Result<Vec<Option<f64>>, ProcessorError> {
        let as_f64 = col.cast(&DataType::Float64)?;
        let values = as_f64.f64()?.into_iter().collect();
        Ok(values)
    }

    /// Split a lagged record set into features and target.
    ///
    /// Features are the numeric columns other than `target` and its
    /// previous-match copy, with missing values read as 0. Rows whose target
    /// is missing are left out.
    pub fn features_from_lagged(
        lagged: &DataFrame,
        target: &str,
    ) -> Result<(FeatureMatrix, TargetVector), ProcessorError> {
        let target_col = lagged
            .column(target)
            .map_err(|_| ProcessorError::MissingTarget(target.to_string()))?;
        if !is_numeric(target_col.dtype()) {
            return Err(ProcessorError::NonNumericTarget(target.to_string()));
        }
        let target_values = Self::column_values(target_col)?;

        let previous_target = previous_match_name(target);
        let features: Vec<NumericColumn> = Self::numeric_columns(lagged)?
            .into_iter()
            .filter(|c| c.name != target && c.name != previous_target)
            .collect();
        if features.is_empty() {
            return Err(ProcessorError::NoFeatures);
        }

        let keep: Vec<usize> = target_values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|_| i))
            .collect();
        if keep.len() < target_values.len() {
            warn!(
                "{} rows have no '{}' value and are left out",
                target_values.len() - keep.len(),
                target
            );
        }
        if keep.is_empty() {
            return Err(ProcessorError::EmptyDataset);
        }

        let rows = keep
            .iter()
            .map(|&i| features.iter().map(|c| c.values[i].unwrap_or(0.0)).collect())
            .collect();
        let matrix = FeatureMatrix {
            names: features.into_iter().map(|c| c.name).collect(),
            rows,
        };
        let target = TargetVector {
            name: target.to_string(),
            values: keep.iter().filter_map(|&i| target_values[i]).collect(),
        };

        debug!(
            "Feature matrix: {} rows x {} features",
            matrix.n_samples(),
            matrix.n_features()
        );
        Ok((matrix, target))
    }

    /// Drop irrelevant columns, lag, and split into features and target.
    pub fn build_features<S: AsRef<str>>(
        records: &DataFrame,
        drop_columns: &[S],
        target: &str,
    ) -> Result<(FeatureMatrix, TargetVector), ProcessorError> {
        let cleaned = Self::drop_columns(records, drop_columns)?;
        let lagged = Self::lag_records(&cleaned, target)?;
        Self::features_from_lagged(&lagged, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> DataFrame {
        df!(
            "Skill" => [10i64, 20, 30],
            "Kills" => [Some(5i64), None, Some(9)],
            "Map" => ["Rust", "Shipment", "Nuketown"],
            "Match ID" => ["a", "b", "c"]
        )
        .unwrap()
    }

    fn values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        DataProcessor::column_values(df.column(name).unwrap()).unwrap()
    }

    #[test]
    fn test_drop_columns_ignores_unknown_names() {
        let cleaned = DataProcessor::drop_columns(&records(), &["Match ID", "Operator"]).unwrap();

        let names: Vec<String> = cleaned
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, ["Skill", "Kills", "Map"]);
    }

    #[test]
    fn test_lag_pairs_adjacent_rows() {
        let lagged = DataProcessor::lag_records(&records(), "Skill").unwrap();

        assert_eq!(lagged.height(), 2);
        assert_eq!(values(&lagged, "Skill"), [Some(20.0), Some(30.0)]);
        assert_eq!(values(&lagged, "Skill (Previous Match)"), [Some(10.0), Some(20.0)]);
        assert_eq!(values(&lagged, "Kills (Previous Match)"), [Some(5.0), None]);

        let maps: Vec<Option<&str>> = lagged
            .column("Map (Previous Match)")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(maps, [Some("Rust"), Some("Shipment")]);
    }

    #[test]
    fn test_lag_column_order() {
        let lagged = DataProcessor::lag_records(&records(), "Skill").unwrap();

        let names: Vec<String> = lagged
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            names,
            [
                "Skill (Previous Match)",
                "Kills (Previous Match)",
                "Map (Previous Match)",
                "Match ID (Previous Match)",
                "Skill",
            ]
        );
    }

    #[test]
    fn test_lag_row_count_is_n_minus_one() {
        for n in 2..6 {
            let df = df!("Skill" => (0..n).map(|i| i as f64).collect::<Vec<_>>()).unwrap();
            let lagged = DataProcessor::lag_records(&df, "Skill").unwrap();
            assert_eq!(lagged.height(), n - 1);
        }
    }

    #[test]
    fn test_lag_previous_columns_match_prior_record() {
        let df = records();
        let lagged = DataProcessor::lag_records(&df, "Skill").unwrap();

        let original = values(&df, "Kills");
        let previous = values(&lagged, "Kills (Previous Match)");
        let current = values(&lagged, "Skill");
        let skill = values(&df, "Skill");
        for i in 0..lagged.height() {
            assert_eq!(previous[i], original[i]);
            assert_eq!(current[i], skill[i + 1]);
        }
    }

    #[test]
    fn test_lag_single_row_is_empty() {
        let df = df!("Skill" => [1i64]).unwrap();

        assert!(matches!(
            DataProcessor::lag_records(&df, "Skill"),
            Err(ProcessorError::EmptyDataset)
        ));
    }

    #[test]
    fn test_lag_missing_target() {
        let df = df!("Kills" => [1i64, 2]).unwrap();

        assert!(matches!(
            DataProcessor::lag_records(&df, "Skill"),
            Err(ProcessorError::MissingTarget(_))
        ));
    }

    #[test]
    fn test_build_features_excludes_target_and_marker() {
        let (x, y) = DataProcessor::build_features(&records(), &["Match ID"], "Skill").unwrap();

        assert_eq!(x.names, ["Kills (Previous Match)"]);
        assert!(!x.names.iter().any(|n| n == "Skill" || n == "Skill (Previous Match)"));
        assert_eq!(x.rows, [vec![5.0], vec![0.0]]);
        assert_eq!(y.values, [20.0, 30.0]);
        assert_eq!(y.name, "Skill");
    }

    #[test]
    fn test_build_features_skips_rows_without_target() {
        let df = df!(
            "Skill" => [Some(10.0), None, Some(30.0), Some(40.0)],
            "Deaths" => [1.0, 2.0, 3.0, 4.0]
        )
        .unwrap();

        let (x, y) = DataProcessor::build_features(&df, &[] as &[&str], "Skill").unwrap();

        assert_eq!(y.values, [30.0, 40.0]);
        assert_eq!(x.rows, [vec![2.0], vec![3.0]]);
    }

    #[test]
    fn test_build_features_rejects_text_target() {
        let df = df!("Skill" => ["high", "low"], "Kills" => [1i64, 2]).unwrap();

        assert!(matches!(
            DataProcessor::build_features(&df, &[] as &[&str], "Skill"),
            Err(ProcessorError::NonNumericTarget(_))
        ));
    }

    #[test]
    fn test_build_features_without_numeric_features() {
        let df = df!("Skill" => [1i64, 2, 3], "Map" => ["a", "b", "c"]).unwrap();

        assert!(matches!(
            DataProcessor::build_features(&df, &[] as &[&str], "Skill"),
            Err(ProcessorError::NoFeatures)
        ));
    }

    #[test]
    fn test_build_features_empty_input() {
        let df = df!("Skill" => Vec::<i64>::new(), "Kills" => Vec::<i64>::new()).unwrap();

        assert!(matches!(
            DataProcessor::build_features(&df, &[] as &[&str], "Skill"),
            Err(ProcessorError::EmptyDataset)
        ));
    }

    #[test]
    fn test_feature_matrix_subset() {
        let x = FeatureMatrix {
            names: vec!["a".into(), "b".into()],
            rows: vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
        };

        let sub = x.subset(&[2, 0]);

        assert_eq!(sub.rows, [vec![5.0, 6.0], vec![1.0, 2.0]]);
        assert_eq!(sub.names, x.names);
    }
}
