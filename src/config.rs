//! Configuration Module
//! Paths, column exclusions and model settings shared by both binaries.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Suffix appended to every lagged column.
pub const PREVIOUS_MATCH_SUFFIX: &str = " (Previous Match)";

/// Columns with no bearing on per-match performance (identifiers, cosmetics,
/// progression counters and lifetime totals).
pub const IRRELEVANT_COLUMNS: &[&str] = &[
    "Map",
    "Team",
    "Operator",
    "Operator Skin",
    "Execution",
    "Weapon XP",
    "Operator XP",
    "Clan XP",
    "Battle Pass",
    "Prestige at Start",
    "Prestige at End",
    "Match ID",
    "Lifetime Wins",
    "Lifetime Losses",
    "Lifetime Kills",
    "Lifetime Deaths",
    "Lifetime Hits",
    "Lifetime Misses",
    "Lifetime Near Misses",
    "Lifetime Wall Bangs",
    "Lifetime Games Played",
    "Lifetime Time Played",
    "XP at Start",
    "XP at End",
    "Score at Start",
    "Score at End",
    "Rank at Start",
    "Rank at End",
    "Bonus XP",
    "Score XP",
    "Total XP",
    "Battle Pass XP",
    "Medal XP",
    "Armor Equipped",
    "Armor Destroyed",
    "Armor Collected",
    "Ground Vehicles Used",
    "Air Vehicles Used",
    "Challenge XP",
    "Match XP",
    "Misc XP",
    "Accolade XP",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Random forest hyperparameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForestSettings {
    pub n_trees: usize,
    /// `None` grows trees until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried at each split; `None` tries all of them.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestSettings {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

/// How many ranked entries each view shows.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TopN {
    pub importance_chart: usize,
    pub correlation_table: usize,
    pub improve_chart: usize,
    pub printed_summary: usize,
}

impl Default for TopN {
    fn default() -> Self {
        Self {
            importance_chart: 15,
            correlation_table: 10,
            improve_chart: 10,
            printed_summary: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub html_file_name: String,
    pub heading_tag: String,
    pub heading_text: String,
    pub csv_file_name: String,
    /// Relative paths are resolved against `data_dir`.
    pub chart_dir: PathBuf,
    pub target_column: String,
    pub irrelevant_columns: Vec<String>,
    pub forest: ForestSettings,
    pub test_fraction: f64,
    pub top_n: TopN,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            html_file_name: "Account.html".to_string(),
            heading_tag: "h2".to_string(),
            heading_text: "Multiplayer Match Data (reverse chronological)".to_string(),
            csv_file_name: "multiplayer_match_data.csv".to_string(),
            chart_dir: PathBuf::from("charts"),
            target_column: "Skill".to_string(),
            irrelevant_columns: IRRELEVANT_COLUMNS.iter().map(|s| s.to_string()).collect(),
            forest: ForestSettings::default(),
            test_fraction: 0.2,
            top_n: TopN::default(),
        }
    }
}

impl AppConfig {
    pub fn html_path(&self) -> PathBuf {
        self.data_dir.join(&self.html_file_name)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.data_dir.join(&self.csv_file_name)
    }

    pub fn chart_path(&self) -> PathBuf {
        self.data_dir.join(&self.chart_dir)
    }

    /// Name of the lagged copy of the target column.
    pub fn previous_target(&self) -> String {
        previous_match_name(&self.target_column)
    }
}

/// Lagged column name for `column`.
pub fn previous_match_name(column: &str) -> String {
    format!("{column}{PREVIOUS_MATCH_SUFFIX}")
}

/// Load configuration from a JSON file, falling back to defaults when the
/// file does not exist.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
