//! Configuration for the trading challenge simulation
//!
//! `ChallengeParams` carries the user-facing (annualized, percentage) knobs as
//! they arrive from the command line. `resolve()` turns them into the daily
//! quantities the simulation core works with.

use serde::{Deserialize, Serialize};

use super::error::{SimResult, SimulationError};
use super::strategy::OpponentStrategy;

/// Raw run parameters, annualized and in the units a user types them in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeParams {
    /// Days per year the exchange is open
    pub annual_trading_days: u32,

    /// Highest annualized implied volatility, in percent [0, 100]
    pub max_implied_vol: f64,

    /// Lowest annualized implied volatility, in percent [0, 100]
    pub min_implied_vol: f64,

    /// Opponent strategy identifier (random, low, high, mixed, avg)
    pub opponent_strategy: String,

    /// Annual risk-free rate used for Sharpe ratios [0, 1]
    pub risk_free_return: f64,

    /// Number of volatility levels opponents pick from
    pub num_portfolio_return_distributions: usize,

    /// Average annual market growth, charged as a penalty for holding cash [0, 1]
    pub market_drift: f64,

    /// Number of competing teams, focal team included
    pub num_teams: usize,

    /// Length of one competition in trading days
    pub simulation_length_days: usize,

    /// Number of Monte Carlo trials
    pub trials: usize,

    /// Base seed for the run's random source
    pub seed: u64,
}

impl Default for ChallengeParams {
    fn default() -> Self {
        Self {
            annual_trading_days: 252,
            max_implied_vol: 100.0,
            min_implied_vol: 10.0,
            opponent_strategy: "random".to_string(),
            risk_free_return: 0.0248,
            num_portfolio_return_distributions: 100,
            market_drift: 0.06,
            num_teams: 61,
            simulation_length_days: 50,
            trials: 1000,
            seed: 97,
        }
    }
}

impl ChallengeParams {
    /// Validate ranges and convert annual figures into daily ones
    pub fn resolve(&self) -> SimResult<SimulationConfig> {
        let strategy: OpponentStrategy = self.opponent_strategy.parse()?;

        if self.annual_trading_days == 0 {
            return Err(invalid("annual_trading_days", "must be at least 1"));
        }
        check_unit_range("max_implied_vol", self.max_implied_vol, 100.0)?;
        check_unit_range("min_implied_vol", self.min_implied_vol, 100.0)?;
        if self.min_implied_vol > self.max_implied_vol {
            return Err(invalid(
                "min_implied_vol",
                format!("{} exceeds max_implied_vol {}", self.min_implied_vol, self.max_implied_vol),
            ));
        }
        check_unit_range("risk_free_return", self.risk_free_return, 1.0)?;
        check_unit_range("market_drift", self.market_drift, 1.0)?;

        let days = self.annual_trading_days as f64;
        let config = SimulationConfig {
            annual_trading_days: self.annual_trading_days,
            min_vol: annual_vol_to_daily(self.min_implied_vol, days),
            max_vol: annual_vol_to_daily(self.max_implied_vol, days),
            strategy,
            risk_free: annual_rate_to_daily(self.risk_free_return, days),
            num_distributions: self.num_portfolio_return_distributions,
            drift: annual_rate_to_daily(self.market_drift, days),
            num_teams: self.num_teams,
            days: self.simulation_length_days,
            trials: self.trials,
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Resolved, daily-unit parameters consumed by the simulation core
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Annualization factor for Sharpe ratios
    pub annual_trading_days: u32,
    /// Lowest daily return volatility
    pub min_vol: f64,
    /// Highest daily return volatility (always used by the focal team)
    pub max_vol: f64,
    /// How opponents choose their volatility
    pub strategy: OpponentStrategy,
    /// Daily risk-free return
    pub risk_free: f64,
    /// Size of the opponent volatility menu
    pub num_distributions: usize,
    /// Daily market drift added to every applied return
    pub drift: f64,
    pub num_teams: usize,
    /// Competition length in days
    pub days: usize,
    pub trials: usize,
    pub seed: u64,
}

impl SimulationConfig {
    /// Index reserved for the focal team (always the last one)
    pub fn focal_team(&self) -> usize {
        self.num_teams - 1
    }

    /// Check the structural invariants the trial loop relies on
    pub fn validate(&self) -> SimResult<()> {
        if !self.min_vol.is_finite() || self.min_vol < 0.0 {
            return Err(invalid("min_vol", format!("{} is not a non-negative number", self.min_vol)));
        }
        if !self.max_vol.is_finite() || self.max_vol < self.min_vol {
            return Err(invalid(
                "max_vol",
                format!("{} must be finite and at least min_vol {}", self.max_vol, self.min_vol),
            ));
        }
        if !self.risk_free.is_finite() || !self.drift.is_finite() {
            return Err(invalid("risk_free/drift", "must be finite"));
        }
        if self.annual_trading_days == 0 {
            return Err(invalid("annual_trading_days", "must be at least 1"));
        }
        if self.num_distributions == 0 {
            return Err(invalid("num_portfolio_return_distributions", "must be at least 1"));
        }
        if self.num_teams < 2 {
            return Err(invalid("num_teams", format!("{} teams, need at least 2", self.num_teams)));
        }
        if self.days < 2 {
            return Err(invalid(
                "simulation_length_days",
                format!("{} days, a Sharpe ratio needs at least 2", self.days),
            ));
        }
        if self.trials == 0 {
            return Err(invalid("trials", "must be at least 1"));
        }
        Ok(())
    }
}

/// Annualized implied vol in percent -> daily standard deviation as a fraction
fn annual_vol_to_daily(implied_vol_pct: f64, annual_days: f64) -> f64 {
    (implied_vol_pct / annual_days.sqrt()) / 100.0
}

/// Compound annual rate -> equivalent daily rate
fn annual_rate_to_daily(rate: f64, annual_days: f64) -> f64 {
    (1.0 + rate).powf(1.0 / annual_days) - 1.0
}

fn check_unit_range(name: &'static str, value: f64, upper: f64) -> SimResult<()> {
    if !(0.0..=upper).contains(&value) {
        return Err(invalid(name, format!("{} is outside [0, {}]", value, upper)));
    }
    Ok(())
}

fn invalid(name: &'static str, reason: impl Into<String>) -> SimulationError {
    SimulationError::InvalidParameter { name, reason: reason.into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resolution() {
        let config = ChallengeParams::default().resolve().unwrap();

        assert_eq!(config.num_teams, 61);
        assert_eq!(config.focal_team(), 60);
        assert_eq!(config.strategy, OpponentStrategy::Random);
        // 100% annual vol over 252 days ~ 6.3% per day
        assert!((config.max_vol - 1.0 / 252f64.sqrt()).abs() < 1e-12);
        assert!((config.min_vol - 0.1 / 252f64.sqrt()).abs() < 1e-12);

        // Compounding the daily rate back over a year recovers the annual rate
        let annual_rf = (1.0 + config.risk_free).powi(252) - 1.0;
        assert!((annual_rf - 0.0248).abs() < 1e-10);
        let annual_drift = (1.0 + config.drift).powi(252) - 1.0;
        assert!((annual_drift - 0.06).abs() < 1e-10);
    }

    #[test]
    fn test_invalid_strategy_rejected() {
        let params = ChallengeParams {
            opponent_strategy: "aggressive".to_string(),
            ..Default::default()
        };
        assert_eq!(
            params.resolve(),
            Err(SimulationError::InvalidStrategy("aggressive".to_string()))
        );
    }

    #[test]
    fn test_range_checks() {
        let inverted = ChallengeParams {
            min_implied_vol: 80.0,
            max_implied_vol: 20.0,
            ..Default::default()
        };
        assert!(matches!(
            inverted.resolve(),
            Err(SimulationError::InvalidParameter { name: "min_implied_vol", .. })
        ));

        let one_team = ChallengeParams { num_teams: 1, ..Default::default() };
        assert!(matches!(
            one_team.resolve(),
            Err(SimulationError::InvalidParameter { name: "num_teams", .. })
        ));

        let no_trials = ChallengeParams { trials: 0, ..Default::default() };
        assert!(no_trials.resolve().is_err());

        let one_day = ChallengeParams { simulation_length_days: 1, ..Default::default() };
        assert!(matches!(
            one_day.resolve(),
            Err(SimulationError::InvalidParameter { name: "simulation_length_days", .. })
        ));

        let bad_rate = ChallengeParams { risk_free_return: 1.5, ..Default::default() };
        assert!(bad_rate.resolve().is_err());
    }

    #[test]
    fn test_zero_volatility_allowed() {
        let params = ChallengeParams {
            min_implied_vol: 0.0,
            max_implied_vol: 0.0,
            ..Default::default()
        };
        let config = params.resolve().unwrap();
        assert_eq!(config.min_vol, 0.0);
        assert_eq!(config.max_vol, 0.0);
    }
}
