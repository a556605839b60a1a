//! Per-trial result dump

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::simulation::TrialResults;

#[derive(Debug, Serialize)]
struct TrialRow {
    trial: usize,
    rank_by_wealth: usize,
    rank_by_sharpe: usize,
    terminal_wealth: f64,
    terminal_sharpe: f64,
}

/// Write one CSV row per trial
pub fn write_trial_results(path: &Path, results: &TrialResults) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create results file {:?}", path))?;

    for trial in 0..results.len() {
        writer.serialize(TrialRow {
            trial,
            rank_by_wealth: results.ranks_by_wealth[trial],
            rank_by_sharpe: results.ranks_by_sharpe[trial],
            terminal_wealth: results.terminal_wealth[trial],
            terminal_sharpe: results.terminal_sharpe[trial],
        })?;
    }
    writer.flush()?;

    info!("Wrote {} trial results to {:?}", results.len(), path);
    Ok(())
}
