//! Checkpoint - immutable capture of a running engine
//!
//! A [`TimeSnapshot`] holds plain-data copies of everything that influences
//! the future of a run: the scheduler (clock, queue, insertion counter), the
//! context (protocol, state, metrics, random generator), the agents and the
//! event log.
//!
//! # Critical Invariants
//!
//! - **Isolation**: nothing in a snapshot is shared with the engine it came
//!   from; mutating either side never changes the other
//! - **Determinism**: an engine restored from a snapshot executes the same
//!   events in the same order, and draws the same random numbers, as the
//!   original did from that instant
//! - **Fingerprint**: two snapshots with identical observable state hash to
//!   the same SHA-256 digest

use crate::agents::SimulationAgent;
use crate::core::EventScheduler;
use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use crate::models::{EventLog, SimulationContext, StateMap};
use crate::orchestrator::engine::{EngineConfig, EnginePhase};
use crate::events::ScheduledEvent;
use serde_json::json;
use sha2::{Digest, Sha256};

/// Complete engine state at one instant of simulated time
#[derive(Debug, Clone)]
pub struct TimeSnapshot {
    pub(crate) id: usize,
    pub(crate) timestamp: u64,
    pub(crate) config: EngineConfig,
    pub(crate) scheduler: EventScheduler,
    pub(crate) context: SimulationContext,
    pub(crate) agents: Vec<Box<dyn SimulationAgent>>,
    pub(crate) event_log: EventLog,
    pub(crate) phase: EnginePhase,
}

impl TimeSnapshot {
    /// Position of this snapshot in its machine's history
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn state(&self) -> &StateMap {
        &self.context.state
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.context.metrics
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.context.metrics.snapshot()
    }

    pub fn pending_events(&self) -> usize {
        self.scheduler.pending_events()
    }

    /// Queued events in firing order
    pub fn queued(&self) -> Vec<&ScheduledEvent> {
        self.scheduler.pending().collect()
    }

    pub fn oracle_price(&self) -> f64 {
        self.context.protocol.oracle_price()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// SHA-256 over clock, queue, state, metrics and generator state
    ///
    /// The snapshot id is left out, so a restored engine checkpointed again
    /// at the same instant produces the same digest.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let queue: Vec<&ScheduledEvent> = self.scheduler.pending().collect();
        let canonical = json!({
            "timestamp": self.timestamp,
            "queue": queue,
            "state": self.context.state,
            "metrics": self.context.metrics.snapshot().fingerprint()?,
            "rng": self.context.rng.state(),
            "liquidity": self.context.protocol.total_liquidity(),
            "price": self.context.protocol.oracle_price(),
        });

        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_string(&canonical)?.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}
