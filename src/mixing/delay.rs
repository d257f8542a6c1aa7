// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Release delay sampling.
//!
//! Delays follow an exponential shape with mean `max / 3`: most chunks go
//! out early and a tail goes out late, which avoids an evenly spaced (and
//! easily correlated) release schedule.

use rand::Rng;

use crate::config::DEFAULT_MIN_DELAY_HOURS;
use crate::error::{MixerError, MixerResult};

/// Samples sorted release delays in hours.
#[derive(Debug, Clone, Copy)]
pub struct DelaySampler {
    min_delay_hours: f64,
}

impl Default for DelaySampler {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY_HOURS)
    }
}

impl DelaySampler {
    pub fn new(min_delay_hours: f64) -> Self {
        Self { min_delay_hours }
    }

    /// Draw `count` delays in `[min, max_delay_hours]`, ascending.
    ///
    /// When `max_delay_hours` is below the configured minimum every delay
    /// equals `max_delay_hours`.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
        max_delay_hours: f64,
    ) -> MixerResult<Vec<f64>> {
        if !max_delay_hours.is_finite() || max_delay_hours <= 0.0 {
            return Err(MixerError::InvalidDelayBound(max_delay_hours));
        }

        let lower = self.min_delay_hours.min(max_delay_hours);
        let mean = max_delay_hours / 3.0;

        let mut delays: Vec<f64> = (0..count)
            .map(|_| {
                let u: f64 = rng.gen();
                let raw = -(1.0 - u).ln() * mean;
                raw.clamp(lower, max_delay_hours)
            })
            .collect();
        delays.sort_by(f64::total_cmp);

        Ok(delays)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn delays_are_bounded_and_sorted() {
        let sampler = DelaySampler::default();
        for (seed, max) in [(1u64, 24.0), (2, 1.0), (3, 72.0), (4, 0.75)] {
            let mut rng = StdRng::seed_from_u64(seed);
            let delays = sampler.sample(&mut rng, 64, max).unwrap();

            assert_eq!(delays.len(), 64);
            assert!(delays.iter().all(|d| (0.5..=max).contains(d)), "max {max}");
            assert!(delays.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn zero_count_is_empty() {
        let mut rng = StdRng::seed_from_u64(5);
        let delays = DelaySampler::default().sample(&mut rng, 0, 12.0).unwrap();
        assert!(delays.is_empty());
    }

    #[test]
    fn skewed_towards_early_release() {
        let mut rng = StdRng::seed_from_u64(6);
        let delays = DelaySampler::default().sample(&mut rng, 2000, 30.0).unwrap();
        let early = delays.iter().filter(|d| **d < 15.0).count();
        // P(X < max/2) for Exp(mean = max/3) is about 0.78
        assert!(early > 1400, "only {early} early releases");
    }

    #[test]
    fn bound_below_minimum_collapses_to_bound() {
        let mut rng = StdRng::seed_from_u64(7);
        let delays = DelaySampler::default().sample(&mut rng, 5, 0.25).unwrap();
        assert!(delays.iter().all(|d| *d == 0.25));
    }

    #[test]
    fn rejects_invalid_bounds() {
        let mut rng = StdRng::seed_from_u64(8);
        let sampler = DelaySampler::default();
        assert!(sampler.sample(&mut rng, 3, 0.0).is_err());
        assert!(sampler.sample(&mut rng, 3, -1.0).is_err());
        assert!(sampler.sample(&mut rng, 3, f64::INFINITY).is_err());
        assert!(sampler.sample(&mut rng, 3, f64::NAN).is_err());
    }
}
