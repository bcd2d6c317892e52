//! NFT Lending Stress Core - Rust Engine
//!
//! Deterministic discrete-event simulation for stress-testing an
//! NFT-collateralized lending protocol: mass borrowing, price shocks,
//! governance capture and liquidation cascades.
//!
//! # Architecture
//!
//! - **core**: Event scheduler, the single source of simulated time
//! - **events**: Tagged scheduled commands and their executor
//! - **risk**: LTV and health-factor classification (pure functions)
//! - **metrics**: Counters, gauges, time series and snapshots
//! - **models**: Protocol handle, in-memory pool, context, event log
//! - **agents**: Behavioural actors driven by the tick loop
//! - **orchestrator**: Simulation engine, checkpoints and time machine
//! - **reports**: Executive summary and risk metrics from a snapshot
//! - **scenarios**: Ready-made stress runs
//! - **batch**: Parallel execution of independent runs
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All money values are i64
//! 2. All randomness is deterministic (seeded RNG in the context)
//! 3. Simulated time never moves backwards
//! 4. A run is single-threaded; parallelism exists only across batches

// Module declarations
pub mod agents;
pub mod batch;
pub mod core;
pub mod events;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod reports;
pub mod risk;
pub mod rng;
pub mod scenarios;

// Re-exports for convenience
pub use agents::SimulationAgent;
pub use batch::{run_batches, BatchOutcome};
pub use core::EventScheduler;
pub use events::{CommandError, ScheduledEvent, SimCommand};
pub use metrics::{MetricValue, MetricsRegistry, MetricsSnapshot};
pub use models::{
    EngineEvent, EventLog, InMemoryLendingPool, LendingProtocol, ProtocolError, SimulationContext,
};
pub use orchestrator::{
    EngineConfig, EnginePhase, SimulationEngine, SimulationError, TimeMachine, TimeSnapshot,
};
pub use reports::{ReportGenerator, SimulationReport};
pub use risk::{assess_position, compute_ltv, PositionAssessment, RiskStatus};
pub use rng::DeterministicRng;
pub use scenarios::ScenarioConfig;
