// Library crate - trading challenge Monte Carlo simulation and its reports

pub mod simulation;
pub mod report;

// Re-export commonly used types
pub use simulation::{
    AggregateStatistics, ChallengeParams, MonteCarloEngine, OpponentStrategy, SimulationConfig,
    SimulationError, SimulationOutcome, TrialResult, TrialResults,
};
