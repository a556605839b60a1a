//! Opponent volatility selection
//!
//! Opponents do not trade a strategy of their own. Each day every opponent
//! picks a return distribution (mean 0, some volatility) and the policy here
//! decides which volatility that is.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::SimulationError;

/// How opponents pick their daily volatility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpponentStrategy {
    /// Fresh uniform pick from the volatility menu every team-day
    Random,
    /// Always the lowest volatility
    Low,
    /// Always the highest volatility
    High,
    /// Teams split in thirds: menu average, highest, random pick
    Mixed,
    /// Always the menu average
    Average,
}

impl OpponentStrategy {
    pub const ALL: [OpponentStrategy; 5] = [
        OpponentStrategy::Random,
        OpponentStrategy::Low,
        OpponentStrategy::High,
        OpponentStrategy::Mixed,
        OpponentStrategy::Average,
    ];

    /// Identifier as accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            OpponentStrategy::Random => "random",
            OpponentStrategy::Low => "low",
            OpponentStrategy::High => "high",
            OpponentStrategy::Mixed => "mixed",
            OpponentStrategy::Average => "avg",
        }
    }

    /// Volatility an opponent uses for one draw
    ///
    /// `team` is the opponent's index, `num_teams` the full team count
    /// (focal team included). Under `Mixed` the index range is cut into
    /// thirds of `num_teams`; the focal team sits in the last third but never
    /// reaches this policy.
    pub fn volatility<R: Rng>(
        &self,
        team: usize,
        num_teams: usize,
        menu: &VolatilityMenu,
        rng: &mut R,
    ) -> f64 {
        match self {
            OpponentStrategy::Random => menu.pick(rng),
            OpponentStrategy::Low => menu.min(),
            OpponentStrategy::High => menu.max(),
            OpponentStrategy::Average => menu.mean(),
            OpponentStrategy::Mixed => match mixed_band(team, num_teams) {
                0 => menu.mean(),
                1 => menu.max(),
                _ => menu.pick(rng),
            },
        }
    }
}

/// Third of the index range a team falls in (0, 1 or 2)
fn mixed_band(team: usize, num_teams: usize) -> usize {
    (team * 3 / num_teams).min(2)
}

impl FromStr for OpponentStrategy {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(OpponentStrategy::Random),
            "low" => Ok(OpponentStrategy::Low),
            "high" => Ok(OpponentStrategy::High),
            "mixed" => Ok(OpponentStrategy::Mixed),
            "avg" => Ok(OpponentStrategy::Average),
            other => Err(SimulationError::InvalidStrategy(other.to_string())),
        }
    }
}

impl std::fmt::Display for OpponentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Discrete volatility levels available to opponents
///
/// Levels are evenly spaced from `min` to `max` inclusive. With a single
/// level the menu holds only `min`, while `max()` still reports the
/// configured maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityMenu {
    levels: Vec<f64>,
    min: f64,
    max: f64,
    mean: f64,
}

impl VolatilityMenu {
    pub fn new(min: f64, max: f64, count: usize) -> Self {
        let levels = linspace(min, max, count);
        let mean = if levels.is_empty() {
            min
        } else {
            levels.iter().sum::<f64>() / levels.len() as f64
        };
        Self { levels, min, max, mean }
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Uniform pick with replacement
    pub fn pick<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.levels.is_empty() {
            return self.min;
        }
        self.levels[rng.gen_range(0..self.levels.len())]
    }
}

/// `count` evenly spaced values over [start, stop], endpoint pinned to `stop`
fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            values[count - 1] = stop;
            values
        }
    }
}
