//! Deterministic random number generation
//!
//! Every random draw made by an agent (price walks, jitter) goes through
//! [`DeterministicRng`], which lives in the simulation context so that it is
//! captured by snapshots and forks.

mod xorshift;

pub use xorshift::DeterministicRng;
