//! Annualized Sharpe ratios over a team x day return history

/// Daily returns of every team, one row per team
///
/// Cells start at 0.0, which is also what a team that sat out a day keeps.
#[derive(Debug, Clone)]
pub struct ReturnHistory {
    num_teams: usize,
    days: usize,
    cells: Vec<f64>,
}

impl ReturnHistory {
    pub fn new(num_teams: usize, days: usize) -> Self {
        Self {
            num_teams,
            days,
            cells: vec![0.0; num_teams * days],
        }
    }

    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    pub fn days(&self) -> usize {
        self.days
    }

    /// Store the return a team realized on `day`
    pub fn record(&mut self, team: usize, day: usize, ret: f64) {
        self.cells[team * self.days + day] = ret;
    }

    pub fn get(&self, team: usize, day: usize) -> f64 {
        self.cells[team * self.days + day]
    }

    /// Returns of one team for days `0..window`
    pub fn row(&self, team: usize, window: usize) -> &[f64] {
        let start = team * self.days;
        &self.cells[start..start + window.min(self.days)]
    }
}

/// Annualized Sharpe ratio of one return series
///
/// `mean(r - rf) / std(r - rf) * sqrt(annual_days)` with the sample
/// (N - 1) standard deviation. Fewer than two returns give NaN; a
/// zero-variance series gives +/-inf, or NaN when its mean excess return is
/// also zero.
pub fn sharpe_ratio(returns: &[f64], risk_free: f64, annual_days: u32) -> f64 {
    let n = returns.len();
    if n < 2 {
        return f64::NAN;
    }

    let mean = returns.iter().map(|r| r - risk_free).sum::<f64>() / n as f64;
    let variance = returns
        .iter()
        .map(|r| {
            let dev = (r - risk_free) - mean;
            dev * dev
        })
        .sum::<f64>()
        / (n - 1) as f64;

    mean / variance.sqrt() * (annual_days as f64).sqrt()
}

/// Sharpe ratio of every team over days `0..window`
pub fn sharpe_ratios(history: &ReturnHistory, window: usize, risk_free: f64, annual_days: u32) -> Vec<f64> {
    (0..history.num_teams())
        .map(|team| sharpe_ratio(history.row(team, window), risk_free, annual_days))
        .collect()
}
