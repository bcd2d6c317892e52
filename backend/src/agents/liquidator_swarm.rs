//! Liquidator-swarm agent
//!
//! Each tick, walks the protocol's underwater borrowers in order and
//! liquidates at most `capacity_per_tick` of them. The number liquidated in
//! a tick is recorded on the `liquidations_per_tick` series whenever it is
//! non-zero, which is what cascade-rate analysis reads.

use super::SimulationAgent;
use crate::metrics::names;
use crate::orchestrator::{SimulationEngine, SimulationError};
use crate::risk::{assess_position, RecommendedAction};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct LiquidatorSwarmAgent {
    name: String,
    capacity_per_tick: usize,
}

impl LiquidatorSwarmAgent {
    pub fn new(name: impl Into<String>, capacity_per_tick: usize) -> Self {
        Self {
            name: name.into(),
            capacity_per_tick,
        }
    }

    pub fn capacity_per_tick(&self) -> usize {
        self.capacity_per_tick
    }
}

impl SimulationAgent for LiquidatorSwarmAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_tick(&mut self, engine: &mut SimulationEngine) -> Result<(), SimulationError> {
        let now = engine.now();
        let ctx = engine.context_mut();

        let mut liquidated = 0usize;
        for borrower in ctx.protocol.underwater_borrowers() {
            if liquidated >= self.capacity_per_tick {
                break;
            }

            // Confirm with the risk engine before acting
            if let Some(position) = ctx.protocol.position(&borrower) {
                let assessment = assess_position(
                    position.collateral_value.floor() as i64,
                    position.debt,
                    &position.rarity,
                    0.0,
                    0.0,
                );
                if assessment.recommended_action != RecommendedAction::Liquidate {
                    continue;
                }
            }

            match ctx.protocol.liquidate(&borrower) {
                Ok(outcome) => {
                    liquidated += 1;
                    ctx.metrics.inc(names::LIQUIDATIONS);
                    if outcome.bad_debt > 0 {
                        ctx.metrics.inc(names::BAD_DEBT_EVENTS);
                    }
                }
                Err(err) => {
                    ctx.metrics.inc(names::LIQUIDATION_REJECTIONS);
                    warn!(time = now, user = %borrower, error = %err, "liquidation rejected");
                }
            }
        }

        if liquidated > 0 {
            ctx.metrics
                .record(names::LIQUIDATIONS_PER_TICK, now, liquidated as f64);
            debug!(time = now, liquidated, "liquidator swarm acted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InMemoryLendingPool, LendingProtocol};
    use crate::orchestrator::EngineConfig;

    #[test]
    fn test_capacity_bounds_each_tick() {
        let mut pool = InMemoryLendingPool::new(0, 100.0);
        for i in 0..7 {
            pool.add_position(&format!("b{:02}", i), 1.0, "COMMON", 200);
        }
        let mut engine = SimulationEngine::new(EngineConfig::default(), Box::new(pool)).unwrap();
        engine
            .register_agent(Box::new(LiquidatorSwarmAgent::new("liquidators", 3)))
            .unwrap();

        engine.run(4).unwrap();
        assert_eq!(
            engine.metrics().get_series(names::LIQUIDATIONS_PER_TICK).iter().map(|p| p.value).collect::<Vec<_>>(),
            vec![3.0, 3.0, 1.0]
        );
        assert_eq!(engine.metrics().get_counter(names::LIQUIDATIONS), 7);
        assert_eq!(engine.metrics().get_counter(names::BAD_DEBT_EVENTS), 7);
        assert!(engine.protocol().underwater_borrowers().is_empty());
    }
}
