//! Passive-lender agent
//!
//! Read-only liquidity providers: no deposits, no withdrawals. Every tick
//! republishes the pool's liquidity gauges.

use super::SimulationAgent;
use crate::metrics::names;
use crate::orchestrator::{SimulationEngine, SimulationError};

#[derive(Debug, Clone, PartialEq)]
pub struct PassiveLenderAgent {
    name: String,
}

impl PassiveLenderAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl SimulationAgent for PassiveLenderAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_tick(&mut self, engine: &mut SimulationEngine) -> Result<(), SimulationError> {
        let liquidity = engine.protocol().total_liquidity();
        let metrics = engine.metrics_mut();
        metrics.set_gauge(names::CURRENT_LIQUIDITY, liquidity);
        metrics.set_gauge(names::POOL_LIQUIDITY, liquidity);
        Ok(())
    }
}
