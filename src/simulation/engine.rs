//! Monte Carlo driver
//!
//! Runs `trials` independent competitions in parallel with Rayon and reduces
//! the focal team's outcomes into finals probabilities. Every trial draws from
//! its own ChaCha stream derived from the run seed, so results do not depend
//! on how trials are spread over threads.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::config::SimulationConfig;
use super::error::SimResult;
use super::strategy::VolatilityMenu;
use super::trial::{CompetitionTrial, TrialResult};

/// Per-trial outcomes of the focal team, one entry per trial
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialResults {
    pub ranks_by_wealth: Vec<usize>,
    pub ranks_by_sharpe: Vec<usize>,
    pub terminal_wealth: Vec<f64>,
    pub terminal_sharpe: Vec<f64>,
}

impl TrialResults {
    pub fn len(&self) -> usize {
        self.ranks_by_wealth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks_by_wealth.is_empty()
    }

    pub fn push(&mut self, result: TrialResult) {
        self.ranks_by_wealth.push(result.rank_by_wealth);
        self.ranks_by_sharpe.push(result.rank_by_sharpe);
        self.terminal_wealth.push(result.terminal_wealth);
        self.terminal_sharpe.push(result.terminal_sharpe);
    }

    /// Result of trial `idx`
    pub fn get(&self, idx: usize) -> Option<TrialResult> {
        Some(TrialResult {
            rank_by_wealth: *self.ranks_by_wealth.get(idx)?,
            rank_by_sharpe: *self.ranks_by_sharpe.get(idx)?,
            terminal_wealth: *self.terminal_wealth.get(idx)?,
            terminal_sharpe: *self.terminal_sharpe.get(idx)?,
        })
    }
}

impl FromIterator<TrialResult> for TrialResults {
    fn from_iter<I: IntoIterator<Item = TrialResult>>(iter: I) -> Self {
        let mut results = TrialResults::default();
        for result in iter {
            results.push(result);
        }
        results
    }
}

/// How often the focal team reached the finals under one ranking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalsSummary {
    /// Trials finishing 1st or 2nd
    pub frequency: usize,
    /// `frequency / trials`
    pub probability: f64,
    /// Observed finals rate relative to a uniformly random team among the rest
    pub edge: f64,
}

impl FinalsSummary {
    /// Summarize the focal team's terminal ranks over all trials
    ///
    /// Requires at least one trial and at least two teams, which
    /// `MonteCarloEngine::new` enforces through config validation.
    pub fn from_ranks(ranks: &[usize], num_teams: usize) -> Self {
        debug_assert!(!ranks.is_empty(), "finals summary needs at least one trial");
        debug_assert!(num_teams >= 2, "finals summary needs at least two teams");
        let trials = ranks.len();
        let frequency = ranks.iter().filter(|&&rank| rank == 1 || rank == 2).count();

        let probability = frequency as f64 / trials as f64;
        // The 2 * trials finals slots not taken by the focal team are spread
        // over the other num_teams - 1 teams
        let random_team_rate = (2 * trials - frequency) as f64 / (num_teams - 1) as f64;
        let edge = frequency as f64 / random_team_rate;

        Self { frequency, probability, edge }
    }
}

/// Run-level statistics over all trials
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateStatistics {
    pub trials: usize,
    pub by_wealth: FinalsSummary,
    pub by_sharpe: FinalsSummary,
}

impl AggregateStatistics {
    pub fn from_results(results: &TrialResults, num_teams: usize) -> Self {
        Self {
            trials: results.len(),
            by_wealth: FinalsSummary::from_ranks(&results.ranks_by_wealth, num_teams),
            by_sharpe: FinalsSummary::from_ranks(&results.ranks_by_sharpe, num_teams),
        }
    }
}

/// Everything a run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub results: TrialResults,
    pub stats: AggregateStatistics,
}

/// Runs the configured number of competitions
pub struct MonteCarloEngine {
    config: SimulationConfig,
    menu: VolatilityMenu,
}

impl MonteCarloEngine {
    /// Validate the configuration and build the opponent volatility menu
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        let menu = VolatilityMenu::new(config.min_vol, config.max_vol, config.num_distributions);
        Ok(Self { config, menu })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn menu(&self) -> &VolatilityMenu {
        &self.menu
    }

    /// Run every trial and aggregate
    ///
    /// Runs on the current Rayon pool; wrap in `ThreadPool::install` to pick
    /// the thread count.
    pub fn run(&self) -> SimResult<SimulationOutcome> {
        let start = Instant::now();
        info!(
            "Running {} trials: {} teams, {} days, opponents {}",
            self.config.trials, self.config.num_teams, self.config.days, self.config.strategy
        );

        let results: Vec<TrialResult> = (0..self.config.trials)
            .into_par_iter()
            .map(|trial| self.run_trial(trial))
            .collect::<SimResult<Vec<_>>>()?;

        let results: TrialResults = results.into_iter().collect();
        let stats = AggregateStatistics::from_results(&results, self.config.num_teams);

        info!(
            "Finished {} trials in {:.2?} | finals by wealth {:.2}% (edge {:.2}x), by Sharpe {:.2}% (edge {:.2}x)",
            stats.trials,
            start.elapsed(),
            stats.by_wealth.probability * 100.0,
            stats.by_wealth.edge,
            stats.by_sharpe.probability * 100.0,
            stats.by_sharpe.edge,
        );

        Ok(SimulationOutcome { results, stats })
    }

    /// Play a single trial on its own random stream
    pub fn run_trial(&self, trial: usize) -> SimResult<TrialResult> {
        let mut rng = trial_rng(self.config.seed, trial);
        let result = CompetitionTrial::run(&self.config, &self.menu, &mut rng)?;
        debug!(
            "trial {}: rank {} by wealth ({:.4}), rank {} by Sharpe ({:.3})",
            trial, result.rank_by_wealth, result.terminal_wealth, result.rank_by_sharpe, result.terminal_sharpe
        );
        Ok(result)
    }
}

/// Random source for one trial: the run seed, on stream `trial`
pub fn trial_rng(seed: u64, trial: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(trial as u64);
    rng
}
