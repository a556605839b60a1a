//! Trading challenge simulation core
//!
//! Monte Carlo model of a multi-team trading competition where the focal
//! team (the last index) only takes risk while it is outside the top two.
//! This module takes a resolved configuration and returns per-trial results
//! plus aggregate finals statistics; it does no I/O.

mod config;
mod engine;
mod error;
mod leaderboard;
mod sampler;
mod sharpe;
mod strategy;
mod trial;

pub use config::{ChallengeParams, SimulationConfig};
pub use engine::{trial_rng, AggregateStatistics, FinalsSummary, MonteCarloEngine, SimulationOutcome, TrialResults};
pub use error::{SimResult, SimulationError};
pub use leaderboard::{terminal_rank, top_two, Podium};
pub use sampler::draw_return;
pub use sharpe::{sharpe_ratio, sharpe_ratios, ReturnHistory};
pub use strategy::{OpponentStrategy, VolatilityMenu};
pub use trial::{CompetitionTrial, Standings, TrialPhase, TrialResult};
