//! Liquidity-drainer agent
//!
//! An attacker borrows their full headroom early, then triggers a
//! liquidation attempt on their own position later. Both steps are
//! scheduled events.

use super::SimulationAgent;
use crate::events::SimCommand;
use crate::metrics::names;
use crate::orchestrator::{SimulationEngine, SimulationError};

pub const LIQUIDITY_DRAIN: &str = "liquidity_drain";

#[derive(Debug, Clone, PartialEq)]
pub struct LiquidityDrainerAgent {
    name: String,
    borrower: String,
    borrow_delay: u64,
    liquidation_delay: u64,
}

impl LiquidityDrainerAgent {
    /// Drain with a max borrow at t+5 and a liquidation attempt at t+30
    pub fn new(name: impl Into<String>, borrower: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            borrower: borrower.into(),
            borrow_delay: 5,
            liquidation_delay: 30,
        }
    }

    pub fn with_timing(mut self, borrow_delay: u64, liquidation_delay: u64) -> Self {
        self.borrow_delay = borrow_delay;
        self.liquidation_delay = liquidation_delay;
        self
    }

    pub fn borrower(&self) -> &str {
        &self.borrower
    }
}

impl SimulationAgent for LiquidityDrainerAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_register(&mut self, engine: &mut SimulationEngine) -> Result<(), SimulationError> {
        engine
            .metrics_mut()
            .set_metadata(names::ATTACK_TYPE, LIQUIDITY_DRAIN);

        engine.schedule_event(
            self.borrow_delay,
            SimCommand::BorrowMax {
                user: self.borrower.clone(),
            },
            "Aggressive borrow",
            None,
        );
        engine.schedule_event(
            self.liquidation_delay,
            SimCommand::LiquidateIfUnderwater {
                user: self.borrower.clone(),
            },
            "Trigger liquidation",
            None,
        );
        Ok(())
    }
}
