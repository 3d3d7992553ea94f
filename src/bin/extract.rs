//! Pull the multiplayer match table out of the account report and save it
//! as CSV.

use match_insights::config::load_config;
use match_insights::extract::extract_to_csv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match load_config("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    // Failures are reported, never fatal.
    match extract_to_csv(&config) {
        Ok(path) => info!("Done: {}", path.display()),
        Err(e) => error!("{}", e),
    }
}
