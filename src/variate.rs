//! Random variate streams for domain models.
//!
//! The kernel itself consumes only already-computed times and
//! priorities; models draw their delays from a `VariateStream`. Each
//! stream owns its generator state, seeded explicitly, so replications
//! are reproducible and no process-wide state exists.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A seeded source of uniform, exponential, and Poisson-process
/// variates (inverse-transform sampling).
#[derive(Debug, Clone)]
pub struct VariateStream {
    rng: SmallRng,
}

impl VariateStream {
    /// Create a stream from an explicit seed.
    pub fn new(seed: u64) -> Self {
        VariateStream {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Uniform real in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniform real in `[min, max)`.
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.unit()
    }

    /// Uniform integer in `[min, max]`.
    pub fn uniform_int(&mut self, min: i64, max: i64) -> i64 {
        self.rng.gen_range(min..=max)
    }

    /// Exponential variate with the given mean: `−ln(1−u)·mean`.
    pub fn exponential(&mut self, mean: f64) -> f64 {
        -(1.0 - self.unit()).ln() * mean
    }

    /// Inter-arrival time of a Poisson process with rate `lambda`
    /// (an exponential variate with mean `1/lambda`).
    pub fn poisson_interval(&mut self, lambda: f64) -> f64 {
        -(1.0 - self.unit()).ln() / lambda
    }
}
