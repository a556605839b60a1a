//! Daily return draws

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Largest move a single day can produce in either direction (+/-100%)
pub const MAX_DAILY_RETURN: f64 = 1.0;

/// Draw one day's percentage return from Normal(mu, sigma), clamped to [-1, 1]
///
/// `sigma` must be non-negative. A zero `sigma` returns `mu` exactly but
/// still consumes one normal draw from `rng`.
pub fn draw_return<R: Rng>(mu: f64, sigma: f64, rng: &mut R) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    (mu + sigma * z).clamp(-MAX_DAILY_RETURN, MAX_DAILY_RETURN)
}
