//! Time Machine - snapshot, restore and fork
//!
//! Wraps a [`SimulationEngine`] with an ordered snapshot history so a run can
//! be rewound to any captured instant, or branched into an independent
//! counterfactual continuation.
//!
//! # Critical Invariants
//!
//! 1. **Round-trip**: `restore(&snapshot())` is a no-op on all observable state
//! 2. **Replay**: after a restore, the engine executes exactly the events the
//!    original run executed from that instant, in the same order
//! 3. **Fork isolation**: a fork shares no mutable memory with its parent
//!
//! # Example
//!
//! ```rust
//! use nft_lending_stress_core_rs::events::SimCommand;
//! use nft_lending_stress_core_rs::models::InMemoryLendingPool;
//! use nft_lending_stress_core_rs::orchestrator::{EngineConfig, SimulationEngine, TimeMachine};
//!
//! let pool = InMemoryLendingPool::new(1_000_000, 100_000.0);
//! let engine = SimulationEngine::new(EngineConfig::default(), Box::new(pool)).unwrap();
//! let mut machine = TimeMachine::new(engine);
//!
//! machine.engine_mut().schedule_event(5, SimCommand::PriceShock { factor: 0.5 }, "crash", None);
//! let before_crash = machine.snapshot();
//!
//! machine.advance(10).unwrap();
//! assert_eq!(machine.engine().protocol().oracle_price(), 50_000.0);
//!
//! let mut branch = machine.fork_from_snapshot(&before_crash);
//! assert_eq!(branch.engine().protocol().oracle_price(), 100_000.0);
//! branch.advance(10).unwrap();
//! assert_eq!(branch.now(), 10);
//! ```

use super::checkpoint::TimeSnapshot;
use super::engine::{SimulationEngine, SimulationError};
use tracing::info;
use uuid::Uuid;

/// Engine wrapper with snapshot history
#[derive(Debug, Clone)]
pub struct TimeMachine {
    id: Uuid,
    parent: Option<Uuid>,
    engine: SimulationEngine,
    history: Vec<TimeSnapshot>,
}

impl TimeMachine {
    pub fn new(engine: SimulationEngine) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent: None,
            engine,
            history: Vec::new(),
        }
    }

    /// Branch id of this machine
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Branch id of the machine this one was forked from
    pub fn parent(&self) -> Option<Uuid> {
        self.parent
    }

    pub fn now(&self) -> u64 {
        self.engine.now()
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SimulationEngine {
        &mut self.engine
    }

    // ========================================================================
    // Time control
    // ========================================================================

    /// Advance the clock by `seconds`, executing due events without ticking
    /// agents
    pub fn advance(&mut self, seconds: u64) -> Result<usize, SimulationError> {
        self.engine.advance(seconds)
    }

    /// Fixed-cadence run with agent ticks
    pub fn run(&mut self, duration: u64) -> Result<u64, SimulationError> {
        self.engine.run(duration)
    }

    /// Run for `duration`, taking a snapshot every `every` seconds
    ///
    /// A snapshot is taken before the first chunk, then after each chunk.
    /// Returns the snapshots taken by this call.
    pub fn run_with_checkpoints(
        &mut self,
        duration: u64,
        every: u64,
    ) -> Result<Vec<TimeSnapshot>, SimulationError> {
        if every == 0 {
            return Err(SimulationError::InvalidConfig(
                "checkpoint interval must be positive".to_string(),
            ));
        }

        let end = self.now().saturating_add(duration);
        let mut taken = vec![self.snapshot()];
        while self.now() < end {
            let chunk = every.min(end - self.now());
            self.engine.run(chunk)?;
            taken.push(self.snapshot());
        }
        Ok(taken)
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Capture the current state and append it to the history
    pub fn snapshot(&mut self) -> TimeSnapshot {
        let snapshot = self.engine.checkpoint(self.history.len());
        info!(
            branch = %self.id,
            snapshot = snapshot.id(),
            time = snapshot.timestamp(),
            pending = snapshot.pending_events(),
            "snapshot taken"
        );
        self.history.push(snapshot.clone());
        snapshot
    }

    /// Replace the live engine state with a copy of `snapshot`
    pub fn restore(&mut self, snapshot: &TimeSnapshot) {
        info!(
            branch = %self.id,
            snapshot = snapshot.id(),
            from = self.now(),
            to = snapshot.timestamp(),
            "restoring snapshot"
        );
        self.engine.restore_checkpoint(snapshot);
    }

    /// Restore the `index`-th snapshot of this machine's history
    pub fn restore_index(&mut self, index: usize) -> Option<u64> {
        let snapshot = self.history.get(index)?.clone();
        self.restore(&snapshot);
        Some(snapshot.timestamp())
    }

    /// New, fully independent machine continuing from `snapshot`
    ///
    /// The fork starts with an empty history and records this machine as its
    /// parent.
    pub fn fork_from_snapshot(&self, snapshot: &TimeSnapshot) -> TimeMachine {
        let fork = TimeMachine {
            id: Uuid::new_v4(),
            parent: Some(self.id),
            engine: SimulationEngine::from_checkpoint(snapshot),
            history: Vec::new(),
        };
        info!(
            parent = %self.id,
            branch = %fork.id,
            time = snapshot.timestamp(),
            "forked from snapshot"
        );
        fork
    }

    pub fn history(&self) -> &[TimeSnapshot] {
        &self.history
    }

    pub fn snapshot_count(&self) -> usize {
        self.history.len()
    }

    pub fn last_snapshot(&self) -> Option<&TimeSnapshot> {
        self.history.last()
    }
}
