//! xorshift64* generator used by the stress engine
//!
//! The generator state is a single `u64`, which makes it trivially cloneable
//! into a [`TimeSnapshot`](crate::orchestrator::TimeSnapshot). Restoring a
//! snapshot therefore also rewinds the random stream.
//!
//! # Determinism
//!
//! Same seed → same sequence of draws, on every platform. Floating point
//! draws are built from the top 53 bits so they never depend on the
//! platform's float rounding mode.

use serde::{Deserialize, Serialize};

/// Seeded xorshift64* random number generator
///
/// # Example
/// ```
/// use nft_lending_stress_core_rs::DeterministicRng;
///
/// let mut rng = DeterministicRng::new(7);
/// let delta = rng.uniform(-0.15, 0.15);
/// assert!(delta >= -0.15 && delta < 0.15);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    /// Create a generator from a seed. A zero seed is mapped to 1 because
    /// xorshift has an all-zero fixed point.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Next raw 64-bit value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform draw in `[0.0, 1.0)`
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform draw in `[low, high)`. Returns `low` when the interval is empty.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        low + (high - low) * self.next_f64()
    }

    /// Current internal state, for diagnostics and checkpoint comparison
    pub fn state(&self) -> u64 {
        self.state
    }
}
