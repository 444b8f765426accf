// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const MIN_MULTIPLIER: f64 = 1000.0;
pub const MAX_MULTIPLIER: f64 = 2000.0;

/// Supplies the per-country multiplier in `[MIN_MULTIPLIER, MAX_MULTIPLIER)`.
pub trait MultiplierSource: Send {
    fn next_multiplier(&mut self) -> f64;
}

/// Uniformly random multiplier
pub struct RandomMultiplier {
    rng: StdRng,
}

impl RandomMultiplier {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomMultiplier {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiplierSource for RandomMultiplier {
    fn next_multiplier(&mut self) -> f64 {
        self.rng.random_range(MIN_MULTIPLIER..MAX_MULTIPLIER)
    }
}

/// Always returns the same multiplier
#[derive(Debug, Clone, Copy)]
pub struct FixedMultiplier(pub f64);

impl MultiplierSource for FixedMultiplier {
    fn next_multiplier(&mut self) -> f64 {
        self.0
    }
}

/// Synthetic GDP estimate: `population * multiplier / exchange_rate`.
pub struct GdpEstimator {
    source: Box<dyn MultiplierSource>,
}

impl GdpEstimator {
    pub fn new(source: impl MultiplierSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    pub fn random() -> Self {
        Self::new(RandomMultiplier::new())
    }

    /// `None` when population or rate is missing, or the rate is zero. A zero
    /// population with a usable rate estimates to `0.0`.
    pub fn estimate(&mut self, population: Option<i64>, exchange_rate: Option<f64>) -> Option<f64> {
        let population = population?;
        let rate = exchange_rate?;
        if rate == 0.0 {
            return None;
        }

        let multiplier = self.source.next_multiplier();
        Some(round2(population as f64 * multiplier / rate))
    }
}

impl Default for GdpEstimator {
    fn default() -> Self {
        Self::random()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_estimate_within_bounds() {
        let mut estimator = GdpEstimator::new(RandomMultiplier::seeded(42));
        for (population, rate) in [(1000, 2.0), (83_000_000, 0.92), (5, 1600.5), (1, 1.0)] {
            let gdp = estimator.estimate(Some(population), Some(rate)).unwrap();
            let low = population as f64 * MIN_MULTIPLIER / rate;
            let high = population as f64 * MAX_MULTIPLIER / rate;
            // Rounding can move the value by at most half a cent
            assert!(gdp >= low - 0.005 && gdp <= high + 0.005, "{gdp} outside [{low}, {high}]");
            assert_relative_eq!(gdp, round2(gdp));
        }
    }

    #[test]
    fn test_estimate_with_fixed_multiplier() {
        let mut estimator = GdpEstimator::new(FixedMultiplier(1500.0));
        assert_relative_eq!(estimator.estimate(Some(1000), Some(2.0)).unwrap(), 750_000.0);
        assert_relative_eq!(estimator.estimate(Some(7), Some(3.0)).unwrap(), 3500.0);
        assert_relative_eq!(estimator.estimate(Some(1), Some(3.0)).unwrap(), 500.0);
        assert_relative_eq!(estimator.estimate(Some(1), Some(7.0)).unwrap(), 214.29);
    }

    #[test]
    fn test_estimate_unresolvable() {
        let mut estimator = GdpEstimator::new(FixedMultiplier(1500.0));
        assert_eq!(estimator.estimate(Some(1000), Some(0.0)), None);
        assert_eq!(estimator.estimate(Some(1000), None), None);
        assert_eq!(estimator.estimate(None, Some(2.0)), None);
        assert_eq!(estimator.estimate(None, None), None);
    }

    #[test]
    fn test_zero_population_estimates_zero() {
        let mut estimator = GdpEstimator::new(FixedMultiplier(1500.0));
        assert_eq!(estimator.estimate(Some(0), Some(2.0)), Some(0.0));
    }

    #[test]
    fn test_random_multiplier_range() {
        let mut source = RandomMultiplier::seeded(7);
        for _ in 0..1000 {
            let m = source.next_multiplier();
            assert!((MIN_MULTIPLIER..MAX_MULTIPLIER).contains(&m));
        }
    }
}
