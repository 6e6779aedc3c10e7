//! Politeness delay sampling

use crate::config::DelayProfile;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::time::Duration;

/// Longest wait between two fetches, in seconds (one day)
pub const MAX_DELAY_SECS: f64 = 86_400.0;

/// Converts a delay in seconds to a [`Duration`]
///
/// Negative, zero and NaN values give no delay; anything above
/// [`MAX_DELAY_SECS`] (including infinity) is capped to it.
pub fn delay_from_secs(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs.min(MAX_DELAY_SECS)).unwrap_or(Duration::ZERO)
}

/// Draws one delay per crawl cycle from a [`DelayProfile`]
pub struct DelaySampler {
    rng: StdRng,
}

impl DelaySampler {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// A sampler with a fixed seed, for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn sample(&mut self, profile: &DelayProfile) -> Duration {
        let choices = profile.choices();
        let secs = choices.choose(&mut self.rng).copied().unwrap_or(0.0);
        delay_from_secs(secs)
    }
}

impl Default for DelaySampler {
    fn default() -> Self {
        Self::new()
    }
}

/// The wait before the next fetch: the longer of the sampled politeness
/// delay and the robots.txt crawl delay
pub fn effective_delay(sampled: Duration, robots: Duration) -> Duration {
    sampled.max(robots)
}
