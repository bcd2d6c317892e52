//! Price-volatility agent
//!
//! Multiplicative random walk on the oracle price:
//!
//! ```text
//! price' = max(0, price · (1 + U(−volatility, +volatility) + drift))
//! ```
//!
//! A walk with `volatility > 1` could step below zero; the clamp keeps the
//! oracle price non-negative for any parameters.

use super::SimulationAgent;
use crate::metrics::names;
use crate::orchestrator::{SimulationEngine, SimulationError};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceVolatilityAgent {
    name: String,
    volatility_pct: f64,
    drift: f64,
}

impl PriceVolatilityAgent {
    pub fn new(name: impl Into<String>, volatility_pct: f64) -> Self {
        Self {
            name: name.into(),
            volatility_pct: volatility_pct.abs(),
            drift: 0.0,
        }
    }

    /// Constant per-tick drift added to every step
    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    pub fn volatility_pct(&self) -> f64 {
        self.volatility_pct
    }
}

impl SimulationAgent for PriceVolatilityAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_tick(&mut self, engine: &mut SimulationEngine) -> Result<(), SimulationError> {
        let now = engine.now();
        let ctx = engine.context_mut();

        let delta = ctx.rng.uniform(-self.volatility_pct, self.volatility_pct) + self.drift;
        let stepped = ctx.protocol.oracle_price() * (1.0 + delta);
        let price = if stepped.is_finite() { stepped.max(0.0) } else { 0.0 };

        ctx.protocol.oracle_mut().set_price(price);
        ctx.metrics.record(names::NFT_PRICE, now, price);
        debug!(time = now, price, delta, "oracle price moved");
        Ok(())
    }
}
