//! Match Insights - match-report extraction and skill analysis
//!
//! `extract` pulls the multiplayer match table out of an account report and
//! writes it as CSV. `analyze` reads that CSV back, pairs every match with the
//! stats of the one before it, and ranks which of those stats track the next
//! skill rating.

pub mod analysis;
pub mod charts;
pub mod config;
pub mod data;
pub mod extract;
pub mod report;
pub mod stats;
