//! Simulation Engine Tests
//!
//! Critical invariants tested:
//! - Agents tick in registration order, once per tick interval
//! - Every executed event increments `events_executed` exactly once
//! - Lifecycle: Idle → Running → Drained / Completed
//! - Engine errors abort the run with context

use nft_lending_stress_core_rs::agents::{PassiveLenderAgent, SimulationAgent};
use nft_lending_stress_core_rs::events::SimCommand;
use nft_lending_stress_core_rs::metrics::names;
use nft_lending_stress_core_rs::models::{EngineEvent, InMemoryLendingPool};
use nft_lending_stress_core_rs::orchestrator::{
    EngineConfig, EnginePhase, SimulationEngine, SimulationError,
};
use serde_json::{json, Value};

// ============================================================================
// Test Helpers
// ============================================================================

/// Appends its name to the `tick_order` state array every tick
#[derive(Debug, Clone)]
struct OrderRecorder {
    name: String,
}

impl OrderRecorder {
    fn boxed(name: &str) -> Box<dyn SimulationAgent> {
        Box::new(Self {
            name: name.to_string(),
        })
    }
}

impl SimulationAgent for OrderRecorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_tick(&mut self, engine: &mut SimulationEngine) -> Result<(), SimulationError> {
        let ctx = engine.context_mut();
        let entry = ctx
            .state
            .entry("tick_order".to_string())
            .or_insert_with(|| json!([]));
        if let Value::Array(items) = entry {
            items.push(Value::from(self.name.clone()));
        }
        Ok(())
    }
}

/// Schedules a marker event on registration
#[derive(Debug, Clone)]
struct SelfScheduler;

impl SimulationAgent for SelfScheduler {
    fn name(&self) -> &str {
        "self-scheduler"
    }

    fn on_register(&mut self, engine: &mut SimulationEngine) -> Result<(), SimulationError> {
        engine.schedule_event(
            3,
            SimCommand::SetState { key: "registered_event".into() },
            "scheduled at registration",
            Some(json!("fired")),
        );
        Ok(())
    }
}

/// Fails on its second tick
#[derive(Debug, Clone)]
struct FailingAgent {
    ticks: u32,
}

impl SimulationAgent for FailingAgent {
    fn name(&self) -> &str {
        "failing"
    }

    fn on_tick(&mut self, _engine: &mut SimulationEngine) -> Result<(), SimulationError> {
        self.ticks += 1;
        if self.ticks == 2 {
            return Err(SimulationError::InvalidConfig("agent gave up".into()));
        }
        Ok(())
    }
}

fn engine_with(config: EngineConfig) -> SimulationEngine {
    let pool = InMemoryLendingPool::new(500_000, 100_000.0);
    SimulationEngine::new(config, Box::new(pool)).unwrap()
}

fn engine() -> SimulationEngine {
    engine_with(EngineConfig::default())
}

// ============================================================================
// Tick loop
// ============================================================================

#[test]
fn test_agents_tick_in_registration_order() {
    let mut engine = engine();
    engine.register_agent(OrderRecorder::boxed("first")).unwrap();
    engine.register_agent(OrderRecorder::boxed("second")).unwrap();

    engine.run(2).unwrap();
    assert_eq!(
        engine.state().get("tick_order"),
        Some(&json!(["first", "second", "first", "second"]))
    );
    assert_eq!(engine.agent_names(), vec!["first", "second"]);
}

#[test]
fn test_run_honours_tick_interval() {
    let mut engine = engine_with(EngineConfig {
        start_time: 1_000,
        tick_interval: 5,
        rng_seed: 1,
    });
    engine.register_agent(OrderRecorder::boxed("a")).unwrap();

    let ticks = engine.run(20).unwrap();
    assert_eq!(ticks, 4);
    assert_eq!(engine.now(), 1_020);
}

#[test]
fn test_run_is_resumable() {
    let mut engine = engine();
    engine.run(10).unwrap();
    engine.run(5).unwrap();
    assert_eq!(engine.now(), 15);
    assert_eq!(engine.metrics().get_counter(names::TICKS), 15);
}

#[test]
fn test_agent_error_aborts_run() {
    let mut engine = engine();
    engine.register_agent(Box::new(FailingAgent { ticks: 0 })).unwrap();

    let err = engine.run(10).unwrap_err();
    assert_eq!(err, SimulationError::InvalidConfig("agent gave up".into()));
    assert_eq!(engine.now(), 1);
    // Agents are still registered after the failed round
    assert_eq!(engine.agent_names(), vec!["failing"]);
}

// ============================================================================
// Scheduled events
// ============================================================================

#[test]
fn test_on_register_can_schedule() {
    let mut engine = engine();
    engine.register_agent(Box::new(SelfScheduler)).unwrap();
    assert_eq!(engine.pending_events(), 1);

    engine.run(5).unwrap();
    assert_eq!(engine.state().get("registered_event"), Some(&json!("fired")));
    assert_eq!(engine.metrics().get_counter(names::EVENTS_EXECUTED), 1);
}

#[test]
fn test_recurring_command_counts_each_execution() {
    let mut engine = engine();
    engine.schedule_event(
        10,
        SimCommand::Recurring {
            command: Box::new(SimCommand::PriceShock { factor: 0.9 }),
            interval: 10,
            remaining: 3,
        },
        "bleeding market",
        None,
    );

    engine.run(100).unwrap();
    assert_eq!(engine.metrics().get_counter(names::EVENTS_EXECUTED), 3);
    assert_eq!(engine.metrics().get_counter(names::MARKET_CRASHES), 3);
    let times: Vec<u64> = engine
        .metrics()
        .get_series(names::NFT_PRICE)
        .iter()
        .map(|p| p.time)
        .collect();
    assert_eq!(times, vec![10, 20, 30]);
}

#[test]
fn test_schedule_event_at_in_past_fails() {
    let mut engine = engine();
    engine.run(10).unwrap();
    let err = engine
        .schedule_event_at(5, SimCommand::SetState { key: "x".into() }, "late", None)
        .unwrap_err();
    assert_eq!(
        err,
        SimulationError::InvalidSchedule {
            requested: 5,
            current_time: 10
        }
    );
}

#[test]
fn test_run_until_rejects_time_travel() {
    let mut engine = engine();
    engine.run(10).unwrap();
    assert!(matches!(
        engine.run_until(3),
        Err(SimulationError::TimeTravel { requested: 3, current_time: 10 })
    ));
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_phase_transitions() {
    let mut engine = engine();
    assert_eq!(engine.phase(), EnginePhase::Idle);

    engine.schedule_event(4, SimCommand::SetState { key: "x".into() }, "x", None);
    engine.run(1).unwrap();
    assert_eq!(engine.phase(), EnginePhase::Running);

    engine.run_until_event_empty().unwrap();
    assert_eq!(engine.phase(), EnginePhase::Drained);
    assert!(matches!(
        engine.register_agent(OrderRecorder::boxed("late")),
        Err(SimulationError::RegistrationClosed { phase: EnginePhase::Drained })
    ));

    engine.complete().unwrap();
    assert_eq!(engine.phase(), EnginePhase::Completed);
    assert_eq!(engine.complete().unwrap_err(), SimulationError::EngineCompleted);
    assert_eq!(engine.run_until_event_empty(), Err(SimulationError::EngineCompleted));
}

#[test]
fn test_run_until_event_empty_on_empty_queue() {
    let mut engine = engine();
    assert_eq!(engine.run_until_event_empty(), Ok(0));
    assert_eq!(engine.now(), 0);
}

#[test]
fn test_event_log_records_lifecycle() {
    let mut engine = engine();
    engine.register_agent(Box::new(PassiveLenderAgent::new("lenders"))).unwrap();
    engine.schedule_event(2, SimCommand::SetState { key: "x".into() }, "marker", None);
    engine.run(3).unwrap();
    engine.complete().unwrap();

    let types: Vec<&str> = engine
        .event_log()
        .events()
        .iter()
        .map(EngineEvent::event_type)
        .collect();
    assert_eq!(types, vec!["AgentRegistered", "EventExecuted", "RunCompleted"]);
    assert!(matches!(
        engine.event_log().events()[2],
        EngineEvent::RunCompleted { time: 3, ticks: 3, events_executed: 1 }
    ));
}

#[test]
fn test_complete_reports_insolvency() {
    let mut pool = InMemoryLendingPool::new(0, 100.0);
    pool.add_position("whale", 1.0, "COMMON", 1_000);
    let mut engine = SimulationEngine::new(EngineConfig::default(), Box::new(pool)).unwrap();

    let snapshot = engine.complete().unwrap();
    assert_eq!(
        snapshot.gauge(names::PROTOCOL_SOLVENCY).and_then(|v| v.as_bool()),
        Some(false)
    );
    assert_eq!(
        snapshot.gauge(names::FINAL_LIQUIDITY).and_then(|v| v.as_f64()),
        Some(0.0)
    );
}
