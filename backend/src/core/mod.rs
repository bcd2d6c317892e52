//! Simulated time
//!
//! The [`EventScheduler`] is the only source of simulated time in a run.

pub mod scheduler;

pub use scheduler::EventScheduler;
