//! Orchestrator - engine, checkpoints and time travel
//!
//! See `engine.rs` for the tick loop and `time_machine.rs` for snapshot,
//! restore and fork.

pub mod checkpoint;
pub mod engine;
pub mod time_machine;

pub use checkpoint::TimeSnapshot;
pub use engine::{EngineConfig, EnginePhase, SimulationEngine, SimulationError};
pub use time_machine::TimeMachine;
