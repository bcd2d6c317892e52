//! Borrower-swarm agent
//!
//! A group of similar borrowers that open positions together and are then
//! hit by a scripted market crash. Both actions are scheduled events created
//! at registration; the agent does nothing per tick.

use super::SimulationAgent;
use crate::events::SimCommand;
use crate::orchestrator::{SimulationEngine, SimulationError};

#[derive(Debug, Clone, PartialEq)]
pub struct BorrowerSwarmAgent {
    name: String,
    borrowers: Vec<String>,
    open_delay: u64,
    borrow_fraction: f64,
    crash_delay: u64,
    crash_factor: f64,
}

impl BorrowerSwarmAgent {
    /// Swarm that borrows 90% of its headroom at t+5 and crashes the price
    /// to 40% at t+50
    pub fn new(name: impl Into<String>, borrowers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            borrowers,
            open_delay: 5,
            borrow_fraction: 0.9,
            crash_delay: 50,
            crash_factor: 0.4,
        }
    }

    pub fn with_open(mut self, delay: u64, borrow_fraction: f64) -> Self {
        self.open_delay = delay;
        self.borrow_fraction = borrow_fraction;
        self
    }

    pub fn with_crash(mut self, delay: u64, factor: f64) -> Self {
        self.crash_delay = delay;
        self.crash_factor = factor;
        self
    }

    pub fn borrowers(&self) -> &[String] {
        &self.borrowers
    }
}

impl SimulationAgent for BorrowerSwarmAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_register(&mut self, engine: &mut SimulationEngine) -> Result<(), SimulationError> {
        engine.schedule_event(
            self.open_delay,
            SimCommand::OpenPositions {
                borrowers: self.borrowers.clone(),
                borrow_fraction: self.borrow_fraction,
            },
            "Borrowers open positions",
            None,
        );
        engine.schedule_event(
            self.crash_delay,
            SimCommand::PriceShock {
                factor: self.crash_factor,
            },
            "Global NFT price crash",
            None,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InMemoryLendingPool;
    use crate::orchestrator::EngineConfig;

    #[test]
    fn test_registration_schedules_open_then_crash() {
        let pool = InMemoryLendingPool::new(1_000_000, 100_000.0);
        let mut engine = SimulationEngine::new(EngineConfig::default(), Box::new(pool)).unwrap();
        engine
            .register_agent(Box::new(BorrowerSwarmAgent::new("swarm", vec!["b0".into()])))
            .unwrap();

        let queued: Vec<(u64, &str)> = engine
            .scheduler()
            .pending()
            .map(|e| (e.timestamp(), e.command.kind()))
            .collect();
        assert_eq!(queued, vec![(5, "open_positions"), (50, "price_shock")]);
    }
}
