//! Stats module - correlation, importance and ranking

mod calculator;
mod forest;
mod ranking;

pub use calculator::StatsCalculator;
pub use forest::{ForestConfig, ImportanceModel, RandomForest, RegressionTree};
pub use ranking::{RankedFeature, Ranking};
