//! Errors raised by the simulation core

use thiserror::Error;

use super::trial::TrialPhase;

/// Failures that abort a simulation run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Opponent strategy identifier is not one of random/low/high/mixed/avg
    #[error("invalid opponent strategy '{0}' (expected one of: random, low, high, mixed, avg)")]
    InvalidStrategy(String),

    /// A numeric parameter is outside its accepted range
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A Sharpe ratio came out as NaN (zero-variance window with zero mean excess return)
    #[error("undefined Sharpe ratio for team {team} on day {day}")]
    UndefinedSharpe { day: usize, team: usize },

    /// Terminal results were requested before the last day was played
    #[error("trial cannot finish while {phase}")]
    TrialNotFinished { phase: TrialPhase },
}

pub type SimResult<T> = std::result::Result<T, SimulationError>;
