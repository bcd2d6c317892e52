//! Health-monitor agent
//!
//! Observes a fixed list of borrowers. Each tick it classifies every
//! position through the risk engine, records finite health factors on the
//! `health_factor` series and counts observations below one.

use super::SimulationAgent;
use crate::metrics::names;
use crate::orchestrator::{SimulationEngine, SimulationError};
use crate::risk::{assess_position, RiskStatus};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct HealthMonitorAgent {
    name: String,
    borrowers: Vec<String>,
    volatility: f64,
    zone_risk: f64,
}

impl HealthMonitorAgent {
    pub fn new(name: impl Into<String>, borrowers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            borrowers,
            volatility: 0.0,
            zone_risk: 0.0,
        }
    }

    /// Market inputs passed to the LTV model when classifying
    pub fn with_market_risk(mut self, volatility: f64, zone_risk: f64) -> Self {
        self.volatility = volatility;
        self.zone_risk = zone_risk;
        self
    }
}

impl SimulationAgent for HealthMonitorAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_tick(&mut self, engine: &mut SimulationEngine) -> Result<(), SimulationError> {
        let now = engine.now();
        let ctx = engine.context_mut();

        let mut at_risk = 0i64;
        for user in &self.borrowers {
            let Some(position) = ctx.protocol.position(user) else {
                continue;
            };
            let assessment = assess_position(
                position.collateral_value.floor() as i64,
                position.debt,
                &position.rarity,
                self.volatility,
                self.zone_risk,
            );

            if assessment.health_factor.is_finite() {
                ctx.metrics
                    .record(names::HEALTH_FACTOR, now, assessment.health_factor);
            }
            if assessment.status == RiskStatus::Liquidatable {
                ctx.metrics.inc(names::HEALTH_FACTOR_BELOW_ONE);
            }
            if assessment.status != RiskStatus::Safe {
                at_risk += 1;
            }
        }

        ctx.metrics.set_gauge(names::POSITIONS_AT_RISK, at_risk);
        debug!(time = now, at_risk, "positions classified");
        Ok(())
    }
}
