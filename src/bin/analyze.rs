//! Rank which previous-match stats track the next skill rating.

use anyhow::{Context, Result};
use match_insights::analysis::analyze;
use match_insights::charts::StaticChartRenderer;
use match_insights::config::load_config;
use match_insights::data::load_records;
use match_insights::report::correlation_summary;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config("config.json").context("Config load error")?;

    let csv_path = config.csv_path();
    let records = load_records(&csv_path)
        .with_context(|| format!("Failed to load {}", csv_path.display()))?;
    info!("Loaded {} matches from {}", records.height(), csv_path.display());

    let report = analyze(&records, &config)?;

    println!("{}", correlation_summary(&report.skill_correlation, config.top_n.printed_summary));

    match StaticChartRenderer::new(config.chart_path()) {
        Ok(renderer) => {
            let written = renderer.render_report(&report, &config.top_n);
            info!("{} charts written to {}", written.len(), config.chart_path().display());
        }
        Err(e) => warn!("Charts skipped: {:#}", e),
    }

    Ok(())
}
