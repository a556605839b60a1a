//! One simulated competition
//!
//! A trial walks the competition day by day:
//! 1. NOT STARTED - every team holds 1.0, nobody leads yet
//! 2. IN PROGRESS - each day all teams move, then the standings are refreshed
//! 3. COMPLETED - the focal team's terminal ranks and metrics are read off
//!
//! The focal team only takes risk while it is outside the top two. It
//! commits to the highest available volatility whenever it does.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::SimulationConfig;
use super::error::{SimResult, SimulationError};
use super::leaderboard::{terminal_rank, top_two, Podium};
use super::sampler::draw_return;
use super::sharpe::{sharpe_ratios, ReturnHistory};
use super::strategy::VolatilityMenu;

/// Mean of every return distribution in the game
const MU: f64 = 0.0;

/// First day (0-indexed) whose close refreshes the Sharpe standings
const FIRST_SHARPE_DAY: usize = 2;

/// Lifecycle of a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialPhase {
    NotStarted,
    /// `day` is the next day to be played
    InProgress { day: usize },
    Completed,
}

impl std::fmt::Display for TrialPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrialPhase::NotStarted => write!(f, "NOT_STARTED"),
            TrialPhase::InProgress { day } => write!(f, "IN_PROGRESS(day {})", day),
            TrialPhase::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// 1st/2nd place by each metric as of the last day close
///
/// `None` means no standings exist yet (start of trial, or before the
/// Sharpe window is long enough).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Standings {
    pub by_wealth: Option<Podium>,
    pub by_sharpe: Option<Podium>,
}

impl Standings {
    /// Whether the focal team may take a wealth draw today
    pub fn wealth_gate_open(&self, team: usize) -> bool {
        !self.by_wealth.is_some_and(|p| p.contains(team))
    }

    /// Whether the focal team may record a Sharpe-track return today
    pub fn sharpe_gate_open(&self, team: usize) -> bool {
        !self.by_sharpe.is_some_and(|p| p.contains(team))
    }
}

/// Focal team's outcome for one trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// 1 = richest team at the end
    pub rank_by_wealth: usize,
    /// 1 = best Sharpe ratio at the end
    pub rank_by_sharpe: usize,
    pub terminal_wealth: f64,
    pub terminal_sharpe: f64,
}

/// State owned by one competition
pub struct CompetitionTrial<'a> {
    config: &'a SimulationConfig,
    menu: &'a VolatilityMenu,
    phase: TrialPhase,
    wealth: Vec<f64>,
    history: ReturnHistory,
    standings: Standings,
}

impl<'a> CompetitionTrial<'a> {
    pub fn new(config: &'a SimulationConfig, menu: &'a VolatilityMenu) -> Self {
        Self {
            config,
            menu,
            phase: TrialPhase::NotStarted,
            wealth: Vec::new(),
            history: ReturnHistory::new(0, 0),
            standings: Standings::default(),
        }
    }

    /// Play every day and produce the focal team's result
    pub fn run<R: Rng>(config: &'a SimulationConfig, menu: &'a VolatilityMenu, rng: &mut R) -> SimResult<TrialResult> {
        let mut trial = Self::new(config, menu);
        while !trial.is_finished() {
            trial.play_day(rng)?;
        }
        trial.finish()
    }

    pub fn phase(&self) -> TrialPhase {
        self.phase
    }

    pub fn wealth(&self) -> &[f64] {
        &self.wealth
    }

    pub fn history(&self) -> &ReturnHistory {
        &self.history
    }

    pub fn standings(&self) -> Standings {
        self.standings
    }

    /// True once every day has been played
    pub fn is_finished(&self) -> bool {
        match self.phase {
            TrialPhase::InProgress { day } => day >= self.config.days,
            TrialPhase::Completed => true,
            TrialPhase::NotStarted => false,
        }
    }

    /// Play the next day: all teams move, then standings are refreshed
    ///
    /// Returns the standings that will gate the following day. Calling this
    /// after the last day is a no-op.
    pub fn play_day<R: Rng>(&mut self, rng: &mut R) -> SimResult<Standings> {
        let day = match self.phase {
            TrialPhase::NotStarted => {
                self.start();
                0
            }
            TrialPhase::InProgress { day } if day < self.config.days => day,
            _ => return Ok(self.standings),
        };

        self.move_teams(day, self.standings, rng);
        self.standings = self.close_day(day, self.standings)?;
        self.phase = TrialPhase::InProgress { day: day + 1 };

        Ok(self.standings)
    }

    /// Compute terminal ranks and metrics for the focal team
    ///
    /// Only legal once every day has been played. Any other phase, including
    /// an already completed trial, is rejected.
    pub fn finish(&mut self) -> SimResult<TrialResult> {
        match self.phase {
            TrialPhase::InProgress { day } if day >= self.config.days => {}
            phase => return Err(SimulationError::TrialNotFinished { phase }),
        }
        let focal = self.config.focal_team();

        let sharpe = sharpe_ratios(&self.history, self.config.days, self.config.risk_free, self.config.annual_trading_days);
        ensure_defined(&sharpe, self.config.days)?;

        self.phase = TrialPhase::Completed;
        Ok(TrialResult {
            rank_by_wealth: terminal_rank(&self.wealth, focal),
            rank_by_sharpe: terminal_rank(&sharpe, focal),
            terminal_wealth: self.wealth[focal],
            terminal_sharpe: sharpe[focal],
        })
    }

    fn start(&mut self) {
        self.wealth = vec![1.0; self.config.num_teams];
        self.history = ReturnHistory::new(self.config.num_teams, self.config.days);
        self.standings = Standings::default();
        self.phase = TrialPhase::InProgress { day: 0 };
    }

    /// Every team takes its turn for `day`, gated by the previous close
    fn move_teams<R: Rng>(&mut self, day: usize, previous: Standings, rng: &mut R) {
        let focal = self.config.focal_team();
        let growth = 1.0 + self.config.drift;

        for team in 0..self.config.num_teams {
            if team == focal {
                // Two independent draws: one for wealth, one for the Sharpe track
                if previous.wealth_gate_open(team) {
                    let ret = draw_return(MU, self.config.max_vol, rng);
                    self.wealth[team] *= growth + ret;
                }
                if previous.sharpe_gate_open(team) {
                    let ret = draw_return(MU, self.config.max_vol, rng);
                    self.history.record(team, day, ret);
                }
            } else {
                let vol = self.config.strategy.volatility(team, self.config.num_teams, self.menu, rng);
                let ret = draw_return(MU, vol, rng);
                self.wealth[team] *= growth + ret;
                self.history.record(team, day, ret);
            }
        }
    }

    /// Standings after `day` has been played
    ///
    /// Wealth standings use today's wealth. Sharpe standings, from the third
    /// day on, use returns of the days strictly before `day`.
    fn close_day(&self, day: usize, previous: Standings) -> SimResult<Standings> {
        let by_wealth = top_two(&self.wealth);

        let by_sharpe = if day >= FIRST_SHARPE_DAY {
            let sharpe = sharpe_ratios(&self.history, day, self.config.risk_free, self.config.annual_trading_days);
            ensure_defined(&sharpe, day)?;
            top_two(&sharpe)
        } else {
            previous.by_sharpe
        };

        Ok(Standings { by_wealth, by_sharpe })
    }
}

fn ensure_defined(sharpe: &[f64], day: usize) -> SimResult<()> {
    match sharpe.iter().position(|s| s.is_nan()) {
        Some(team) => Err(SimulationError::UndefinedSharpe { day, team }),
        None => Ok(()),
    }
}
