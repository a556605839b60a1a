//! Leaderboard positions by wealth or Sharpe ratio
//!
//! Two different orderings live here:
//! - `top_two` picks the day's 1st and 2nd place, used to gate the focal
//!   team's moves. Ties go to the lowest index.
//! - `terminal_rank` ranks one team at the end of a trial from an ascending
//!   stable sort. Ties go to the highest index.
//!
//! Scores must be NaN-free; callers check Sharpe ratios before ranking.

use std::cmp::Ordering;

/// Indices of the 1st and 2nd place teams (always distinct)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Podium {
    pub first: usize,
    pub second: usize,
}

impl Podium {
    /// True if `team` currently holds 1st or 2nd place
    pub fn contains(&self, team: usize) -> bool {
        self.first == team || self.second == team
    }
}

/// Find the two highest scores in one pass over the array
///
/// 1st place is the first index (in scan order) holding the maximum score;
/// 2nd place is the first of the remaining indices holding the highest
/// remaining score. Returns `None` for fewer than two teams.
pub fn top_two(scores: &[f64]) -> Option<Podium> {
    let mut first: Option<usize> = None;
    let mut second: Option<usize> = None;

    for (idx, &score) in scores.iter().enumerate() {
        match first {
            None => first = Some(idx),
            Some(f) if score > scores[f] => {
                second = first;
                first = Some(idx);
            }
            Some(_) => match second {
                None => second = Some(idx),
                Some(s) if score > scores[s] => second = Some(idx),
                Some(_) => {}
            },
        }
    }

    Some(Podium { first: first?, second: second? })
}

/// 1-based rank of `team` once the competition is over
///
/// Rank is `n - position` where position is the team's slot in an ascending
/// stable sort of the scores, so equal scores favour the later index.
pub fn terminal_rank(scores: &[f64], team: usize) -> usize {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal));

    let position = order.iter().position(|&idx| idx == team).unwrap_or(0);
    scores.len() - position
}
