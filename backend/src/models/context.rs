//! Simulation context
//!
//! The one mutable record shared by the engine, the agents and the event
//! executor for the lifetime of a run. Mutations are serialized by the
//! single-threaded tick loop.

use super::protocol::LendingProtocol;
use crate::metrics::MetricsRegistry;
use crate::rng::DeterministicRng;
use serde_json::Value;
use std::collections::BTreeMap;

/// Free-form simulation state (`string → JSON value`)
pub type StateMap = BTreeMap<String, Value>;

/// Protocol handle, metrics, state and randomness of one run
#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub protocol: Box<dyn LendingProtocol>,
    pub metrics: MetricsRegistry,
    pub state: StateMap,
    pub rng: DeterministicRng,
}

impl SimulationContext {
    pub fn new(protocol: Box<dyn LendingProtocol>, rng_seed: u64) -> Self {
        Self {
            protocol,
            metrics: MetricsRegistry::new(),
            state: StateMap::new(),
            rng: DeterministicRng::new(rng_seed),
        }
    }

    /// Numeric state entry, if present and numeric
    pub fn state_f64(&self, key: &str) -> Option<f64> {
        self.state.get(key).and_then(Value::as_f64)
    }

    pub fn set_state(&mut self, key: &str, value: impl Into<Value>) {
        self.state.insert(key.to_string(), value.into());
    }
}
