//! Simulation Engine
//!
//! Runs registered agents against the event scheduler and the shared
//! simulation context.
//!
//! # Architecture
//!
//! ```text
//! run(duration):
//!   while now < start + duration:
//!     1. on_tick for every agent, in registration order
//!     2. advance the scheduler by one tick interval
//!     3. execute every scheduled event that became due
//!
//! run_until_event_empty():
//!   while events are pending:
//!     1. on_tick for every agent
//!     2. jump the clock to the next event time and execute what is due
//! ```
//!
//! Every scheduled event goes through one dispatch wrapper, which applies the
//! command, increments `events_executed` exactly once on success and appends
//! an entry to the event log.
//!
//! # Lifecycle
//!
//! `Idle → Running → Drained / Completed`. Agents can be registered while
//! Idle or Running. [`SimulationEngine::complete`] publishes the final
//! gauges and closes the engine for good.
//!
//! # Example
//!
//! ```rust
//! use nft_lending_stress_core_rs::agents::PassiveLenderAgent;
//! use nft_lending_stress_core_rs::models::InMemoryLendingPool;
//! use nft_lending_stress_core_rs::orchestrator::{EngineConfig, SimulationEngine};
//!
//! let pool = InMemoryLendingPool::new(1_000_000, 100_000.0);
//! let mut engine = SimulationEngine::new(EngineConfig::default(), Box::new(pool)).unwrap();
//! engine.register_agent(Box::new(PassiveLenderAgent::new("lenders"))).unwrap();
//!
//! engine.run(10).unwrap();
//! assert_eq!(engine.now(), 10);
//! assert_eq!(engine.metrics().get_counter("ticks"), 10);
//! ```

use crate::agents::SimulationAgent;
use crate::core::EventScheduler;
use crate::events::{execute_command, CommandError, EventKey, FollowUp, ScheduledEvent, SimCommand};
use crate::metrics::{names, MetricsRegistry, MetricsSnapshot};
use crate::models::{EngineEvent, EventLog, LendingProtocol, SimulationContext, StateMap};
use crate::orchestrator::checkpoint::TimeSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

// ============================================================================
// Configuration Types
// ============================================================================

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Simulated time at which the clock starts
    pub start_time: u64,

    /// Seconds advanced after each agent round
    pub tick_interval: u64,

    /// Seed of the context's random number generator
    pub rng_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_time: 0,
            tick_interval: 1,
            rng_seed: 42,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.tick_interval == 0 {
            return Err(SimulationError::InvalidConfig(
                "tick_interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Simulation error types
///
/// All of these are fatal to the current run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Cannot schedule at {requested}: current time is {current_time}")]
    InvalidSchedule { requested: u64, current_time: u64 },

    #[error("Cannot move clock back to {requested}: current time is {current_time}")]
    TimeTravel { requested: u64, current_time: u64 },

    #[error("Event '{description}' at t={timestamp} failed: {source}")]
    EventExecution {
        description: String,
        timestamp: u64,
        #[source]
        source: CommandError,
    },

    #[error("Agent registration is closed in phase {phase}")]
    RegistrationClosed { phase: EnginePhase },

    #[error("Engine has already completed")]
    EngineCompleted,

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

// ============================================================================
// Engine
// ============================================================================

/// Lifecycle phase of a [`SimulationEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnginePhase {
    Idle,
    Running,
    Drained,
    Completed,
}

impl fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnginePhase::Idle => "Idle",
            EnginePhase::Running => "Running",
            EnginePhase::Drained => "Drained",
            EnginePhase::Completed => "Completed",
        };
        f.write_str(name)
    }
}

/// Single-run simulation engine
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    config: EngineConfig,
    scheduler: EventScheduler,
    context: SimulationContext,
    agents: Vec<Box<dyn SimulationAgent>>,
    event_log: EventLog,
    phase: EnginePhase,
}

impl SimulationEngine {
    /// Create an engine around a protocol handle
    pub fn new(
        config: EngineConfig,
        protocol: Box<dyn LendingProtocol>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self {
            scheduler: EventScheduler::new(config.start_time),
            context: SimulationContext::new(protocol, config.rng_seed),
            agents: Vec::new(),
            event_log: EventLog::new(),
            phase: EnginePhase::Idle,
            config,
        })
    }

    // ========================================================================
    // Agents
    // ========================================================================

    /// Register an agent and run its `on_register` hook immediately
    pub fn register_agent(
        &mut self,
        mut agent: Box<dyn SimulationAgent>,
    ) -> Result<(), SimulationError> {
        if matches!(self.phase, EnginePhase::Drained | EnginePhase::Completed) {
            return Err(SimulationError::RegistrationClosed { phase: self.phase });
        }

        agent.on_register(self)?;

        let name = agent.name().to_string();
        debug!(time = self.now(), agent = %name, "agent registered");
        self.event_log.log(EngineEvent::AgentRegistered {
            time: self.now(),
            agent: name,
        });
        self.agents.push(agent);
        Ok(())
    }

    /// Names of registered agents, in registration order
    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(|agent| agent.name()).collect()
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Schedule a command `delay` seconds from now
    pub fn schedule_event(
        &mut self,
        delay: u64,
        command: SimCommand,
        description: impl Into<String>,
        payload: Option<Value>,
    ) -> EventKey {
        self.scheduler.schedule(delay, command, description, payload)
    }

    /// Schedule a command at an absolute timestamp
    pub fn schedule_event_at(
        &mut self,
        timestamp: u64,
        command: SimCommand,
        description: impl Into<String>,
        payload: Option<Value>,
    ) -> Result<EventKey, SimulationError> {
        self.scheduler
            .schedule_at(timestamp, command, description, payload)
    }

    // ========================================================================
    // Time control
    // ========================================================================

    /// One agent round: `on_tick` for every agent in registration order
    ///
    /// The first agent error aborts the round.
    pub fn tick(&mut self) -> Result<(), SimulationError> {
        self.ensure_open()?;
        if self.phase == EnginePhase::Idle {
            self.phase = EnginePhase::Running;
        }

        let mut agents = std::mem::take(&mut self.agents);
        let mut result = Ok(());
        for agent in agents.iter_mut() {
            if let Err(err) = agent.on_tick(self) {
                result = Err(err);
                break;
            }
        }
        // Agents registered from inside a tick go after the existing ones
        let registered_during_tick = std::mem::replace(&mut self.agents, agents);
        self.agents.extend(registered_during_tick);

        self.context.metrics.inc(names::TICKS);
        debug!(time = self.now(), agents = self.agents.len(), "tick");
        result
    }

    /// Run fixed-cadence ticks for `duration` seconds of simulated time
    ///
    /// Returns the number of ticks executed.
    pub fn run(&mut self, duration: u64) -> Result<u64, SimulationError> {
        self.ensure_open()?;
        self.phase = EnginePhase::Running;

        let end = self.now().saturating_add(duration);
        info!(start = self.now(), end, agents = self.agents.len(), "simulation run started");

        let mut ticks = 0;
        while self.now() < end {
            self.tick()?;
            self.advance(self.config.tick_interval)?;
            ticks += 1;
        }

        info!(
            time = self.now(),
            ticks,
            events_executed = self.metrics().get_counter(names::EVENTS_EXECUTED),
            "simulation run finished"
        );
        Ok(ticks)
    }

    /// Alternate agent rounds with jumps to the next event until the queue
    /// is empty
    ///
    /// Does not terminate if agents or recurring commands keep scheduling
    /// new events forever.
    pub fn run_until_event_empty(&mut self) -> Result<u64, SimulationError> {
        self.ensure_open()?;
        self.phase = EnginePhase::Running;

        let mut rounds = 0;
        while self.scheduler.pending_events() > 0 {
            self.tick()?;
            if let Some(next) = self.scheduler.next_event_time() {
                self.run_until(next.max(self.now()))?;
            }
            rounds += 1;
        }

        self.phase = EnginePhase::Drained;
        info!(time = self.now(), rounds, "event queue drained");
        Ok(rounds)
    }

    /// Advance the clock by `seconds` and execute due events
    pub fn advance(&mut self, seconds: u64) -> Result<usize, SimulationError> {
        let Self {
            scheduler,
            context,
            event_log,
            ..
        } = self;
        scheduler.advance_time(seconds, dispatch(context, event_log))
    }

    /// Jump the clock to `timestamp` and execute due events
    pub fn run_until(&mut self, timestamp: u64) -> Result<usize, SimulationError> {
        let Self {
            scheduler,
            context,
            event_log,
            ..
        } = self;
        scheduler.run_until(timestamp, dispatch(context, event_log))
    }

    /// Drain every scheduled event without ticking agents
    pub fn run_all_events(&mut self) -> Result<usize, SimulationError> {
        let Self {
            scheduler,
            context,
            event_log,
            ..
        } = self;
        scheduler.run_all(dispatch(context, event_log))
    }

    /// Publish final gauges and close the engine
    pub fn complete(&mut self) -> Result<MetricsSnapshot, SimulationError> {
        self.ensure_open()?;

        let liquidity = self.context.protocol.total_liquidity();
        let solvent = self.context.protocol.is_solvent();
        let metrics = &mut self.context.metrics;
        metrics.set_gauge(names::FINAL_LIQUIDITY, liquidity);
        metrics.set_gauge(names::POOL_LIQUIDITY, liquidity);
        metrics.set_gauge(names::PROTOCOL_SOLVENCY, solvent);

        let ticks = metrics.get_counter(names::TICKS);
        let events_executed = metrics.get_counter(names::EVENTS_EXECUTED);
        self.event_log.log(EngineEvent::RunCompleted {
            time: self.now(),
            ticks,
            events_executed,
        });
        self.phase = EnginePhase::Completed;

        info!(
            time = self.now(),
            ticks,
            events_executed,
            final_liquidity = liquidity,
            solvent,
            "simulation completed"
        );
        Ok(self.context.metrics.snapshot())
    }

    fn ensure_open(&self) -> Result<(), SimulationError> {
        if self.phase == EnginePhase::Completed {
            return Err(SimulationError::EngineCompleted);
        }
        Ok(())
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Capture the complete engine state
    pub fn checkpoint(&self, id: usize) -> TimeSnapshot {
        TimeSnapshot {
            id,
            timestamp: self.now(),
            config: self.config.clone(),
            scheduler: self.scheduler.clone(),
            context: self.context.clone(),
            agents: self.agents.clone(),
            event_log: self.event_log.clone(),
            phase: self.phase,
        }
    }

    /// Replace the live state with copies taken from `snapshot`
    pub fn restore_checkpoint(&mut self, snapshot: &TimeSnapshot) {
        self.config = snapshot.config.clone();
        self.scheduler = snapshot.scheduler.clone();
        self.context = snapshot.context.clone();
        self.agents = snapshot.agents.clone();
        self.event_log = snapshot.event_log.clone();
        self.phase = snapshot.phase;
    }

    /// Build an independent engine from a snapshot
    pub fn from_checkpoint(snapshot: &TimeSnapshot) -> Self {
        Self {
            config: snapshot.config.clone(),
            scheduler: snapshot.scheduler.clone(),
            context: snapshot.context.clone(),
            agents: snapshot.agents.clone(),
            event_log: snapshot.event_log.clone(),
            phase: snapshot.phase,
        }
    }

    // ========================================================================
    // State access
    // ========================================================================

    pub fn now(&self) -> u64 {
        self.scheduler.current_time()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    pub fn pending_events(&self) -> usize {
        self.scheduler.pending_events()
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut SimulationContext {
        &mut self.context
    }

    pub fn protocol(&self) -> &dyn LendingProtocol {
        self.context.protocol.as_ref()
    }

    pub fn protocol_mut(&mut self) -> &mut dyn LendingProtocol {
        self.context.protocol.as_mut()
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.context.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut MetricsRegistry {
        &mut self.context.metrics
    }

    pub fn state(&self) -> &StateMap {
        &self.context.state
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }
}

/// Executor handed to the scheduler: applies the command, counts the
/// outcome and appends it to the event log
fn dispatch<'a>(
    context: &'a mut SimulationContext,
    event_log: &'a mut EventLog,
) -> impl FnMut(&ScheduledEvent, u64) -> Result<Vec<FollowUp>, CommandError> + 'a {
    move |event, now| match execute_command(context, event, now) {
        Ok(follow_ups) => {
            context.metrics.inc(names::EVENTS_EXECUTED);
            event_log.log(EngineEvent::EventExecuted {
                time: now,
                sequence: event.key.sequence,
                kind: event.command.kind().to_string(),
                description: event.description.clone(),
            });
            Ok(follow_ups)
        }
        Err(err) => {
            context.metrics.inc(names::EVENTS_FAILED);
            event_log.log(EngineEvent::EventFailed {
                time: now,
                description: event.description.clone(),
                error: err.to_string(),
            });
            Err(err)
        }
    }
}
