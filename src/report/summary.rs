//! Human-readable run log
//!
//! Every finished run appends one block to a shared text log: completion
//! time, the settings it ran with, and finals statistics for both rankings.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::simulation::{AggregateStatistics, ChallengeParams, FinalsSummary};

/// Log file name inside the output directory
pub const SUMMARY_FILE: &str = "Simulation_Output.txt";

const RULE: &str = "––––––––––––––––––––––––––––––––––––––––––––––––––––––––––––––––––––––";

/// One log block: completion time, settings, and both finals rankings
pub struct RunSummary<'a> {
    pub params: &'a ChallengeParams,
    pub stats: &'a AggregateStatistics,
    pub completed_at: DateTime<Local>,
}

impl fmt::Display for RunSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.params;
        writeln!(f, "Simulation Completed on {}", self.completed_at.format("%-m/%-d/%Y T%H:%M:%S"))?;
        writeln!(f, "Simulation Settings:")?;
        writeln!(f, "\ttrials={}", params.trials)?;
        writeln!(f, "\tsimulation_length_days={}", params.simulation_length_days)?;
        writeln!(f, "\tnum_teams={}", params.num_teams)?;
        writeln!(f, "\topponent_strategy={}", params.opponent_strategy)?;
        writeln!(f, "\tannual_trading_days={}", params.annual_trading_days)?;
        writeln!(f, "\tmax_implied_vol={}", params.max_implied_vol)?;
        writeln!(f, "\tmin_implied_vol={}", params.min_implied_vol)?;
        writeln!(f, "\trisk_free_return={}", params.risk_free_return)?;
        writeln!(f, "\tnum_portfolio_return_distributions={}", params.num_portfolio_return_distributions)?;
        writeln!(f, "\tmarket_drift={}", params.market_drift)?;
        writeln!(f, "\tseed={}", params.seed)?;

        write_ranking(f, "Total Earnings", &self.stats.by_wealth, self.stats.trials)?;
        write_ranking(f, "Sharpe Ratio", &self.stats.by_sharpe, self.stats.trials)?;

        writeln!(f, "{}", RULE)?;
        writeln!(f, "{}", RULE)
    }
}

fn write_ranking(f: &mut fmt::Formatter<'_>, metric: &str, summary: &FinalsSummary, trials: usize) -> fmt::Result {
    writeln!(f, "––––– If Team Ranking Determined by {} ––––", metric)?;
    writeln!(
        f,
        "Frequency of the focal team attending the finals (1st or 2nd place) of {} trials: {}",
        trials, summary.frequency
    )?;
    writeln!(f, "Probability of the focal team being 1st or 2nd and proceeding to finals: {}", summary.probability)?;
    writeln!(f, "Focal team's edge (how much more likely it is to reach the finals playing its strategy): {}", summary.edge)
}

/// Format one log block
pub fn render_summary(params: &ChallengeParams, stats: &AggregateStatistics, completed_at: DateTime<Local>) -> String {
    RunSummary { params, stats, completed_at }.to_string()
}

/// Append a log block to `path`, creating the file if needed
pub fn append_summary(
    path: &Path,
    params: &ChallengeParams,
    stats: &AggregateStatistics,
    completed_at: DateTime<Local>,
) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open summary log {:?}", path))?;

    file.write_all(render_summary(params, stats, completed_at).as_bytes())
        .with_context(|| format!("Failed to write summary log {:?}", path))?;

    info!("Appended run summary to {:?}", path);
    Ok(())
}

/// Write params and statistics together as pretty JSON
pub fn write_summary_json(path: &Path, params: &ChallengeParams, stats: &AggregateStatistics) -> Result<()> {
    let json = serde_json::to_string_pretty(&serde_json::json!({
        "params": params,
        "stats": stats,
    }))?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    info!("Wrote summary to {:?}", path);
    Ok(())
}
