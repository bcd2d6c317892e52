//! Simulation Agent Module
//!
//! This module defines the agent interface used by the engine's tick loop.
//!
//! # Overview
//!
//! An agent is a named, stateful actor that reacts to protocol state. It is
//! registered once before the run and lives for the whole run. Each variant
//! encodes one behavioural policy:
//!
//! 1. **PriceVolatility**: random-walk oracle price, clamped at zero
//! 2. **BorrowerSwarm**: scheduled mass borrow followed by a price shock
//! 3. **LiquidatorSwarm**: liquidates up to a fixed capacity per tick
//! 4. **MaliciousGovernance**: proposes then force-executes a parameter change
//! 5. **PassiveLender**: republishes the liquidity gauge every tick
//! 6. **HealthMonitor**: classifies tracked positions every tick
//! 7. **LiquidityDrainer**: borrows the full headroom, later tries to liquidate
//!
//! Agents never touch each other. They communicate only through the shared
//! context and the protocol handle, and they record protocol rejections as
//! metrics instead of failing the run.
//!
//! # Agent Interface
//!
//! ```rust
//! use nft_lending_stress_core_rs::agents::SimulationAgent;
//! use nft_lending_stress_core_rs::orchestrator::{SimulationEngine, SimulationError};
//!
//! #[derive(Debug, Clone)]
//! struct TickCounter {
//!     seen: u64,
//! }
//!
//! impl SimulationAgent for TickCounter {
//!     fn name(&self) -> &str {
//!         "tick-counter"
//!     }
//!
//!     fn on_tick(&mut self, engine: &mut SimulationEngine) -> Result<(), SimulationError> {
//!         self.seen += 1;
//!         engine.metrics_mut().set_gauge("ticks_seen", self.seen as i64);
//!         Ok(())
//!     }
//! }
//! ```

use crate::orchestrator::{SimulationEngine, SimulationError};
use std::fmt;

pub mod borrower_swarm;
pub mod governance;
pub mod health_monitor;
pub mod liquidator_swarm;
pub mod liquidity_drainer;
pub mod passive_lender;
pub mod price_volatility;

pub use borrower_swarm::BorrowerSwarmAgent;
pub use governance::MaliciousGovernanceAgent;
pub use health_monitor::HealthMonitorAgent;
pub use liquidator_swarm::LiquidatorSwarmAgent;
pub use liquidity_drainer::LiquidityDrainerAgent;
pub use passive_lender::PassiveLenderAgent;
pub use price_volatility::PriceVolatilityAgent;

/// Cloning support for boxed agents
///
/// Snapshots capture agents by value so a restored run resumes with the
/// agents' private state as it was.
pub trait AgentClone {
    fn clone_box(&self) -> Box<dyn SimulationAgent>;
}

impl<T> AgentClone for T
where
    T: SimulationAgent + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn SimulationAgent> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn SimulationAgent> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Actor driven by the engine's tick loop
pub trait SimulationAgent: AgentClone + Send + fmt::Debug {
    /// Stable display name
    fn name(&self) -> &str;

    /// Called once when the agent is registered
    ///
    /// Agents that act through scheduled events schedule them here.
    fn on_register(&mut self, _engine: &mut SimulationEngine) -> Result<(), SimulationError> {
        Ok(())
    }

    /// Called once per tick, in registration order
    fn on_tick(&mut self, _engine: &mut SimulationEngine) -> Result<(), SimulationError> {
        Ok(())
    }
}
