//! Price volatility scenario
//!
//! Borrowers open positions right away, then the oracle follows a random
//! walk while a health monitor and a small opportunistic liquidator crew
//! react every tick.

use super::{borrower_ids, engine_for, finish, pool_with_borrowers, validate_fraction};
use crate::agents::{HealthMonitorAgent, LiquidatorSwarmAgent, PriceVolatilityAgent};
use crate::events::SimCommand;
use crate::orchestrator::{EngineConfig, SimulationError};
use crate::reports::SimulationReport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceVolatilityConfig {
    pub engine: EngineConfig,
    pub initial_liquidity: i64,
    pub nft_price: f64,
    pub borrowers: usize,
    pub rarity: String,
    pub borrow_fraction: f64,
    pub volatility_pct: f64,
    pub liquidator_capacity: usize,
    pub duration: u64,
}

impl Default for PriceVolatilityConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            initial_liquidity: 1_200_000,
            nft_price: 100_000.0,
            borrowers: 10,
            rarity: "COMMON".to_string(),
            borrow_fraction: 0.9,
            volatility_pct: 0.15,
            liquidator_capacity: 3,
            duration: 300,
        }
    }
}

impl PriceVolatilityConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        self.engine.validate()?;
        validate_fraction("borrow_fraction", self.borrow_fraction)?;
        if !(self.volatility_pct >= 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "volatility_pct must be non-negative, got {}",
                self.volatility_pct
            )));
        }
        Ok(())
    }
}

pub fn run_price_volatility(
    config: &PriceVolatilityConfig,
) -> Result<SimulationReport, SimulationError> {
    config.validate()?;

    let borrowers = borrower_ids(config.borrowers);
    let pool = pool_with_borrowers(
        config.initial_liquidity,
        config.nft_price,
        &borrowers,
        &config.rarity,
    );
    let mut engine = engine_for(&config.engine, pool)?;

    engine.schedule_event(
        0,
        SimCommand::OpenPositions {
            borrowers: borrowers.clone(),
            borrow_fraction: config.borrow_fraction,
        },
        "Borrowers open positions",
        None,
    );

    engine.register_agent(Box::new(PriceVolatilityAgent::new(
        "oracle-volatility",
        config.volatility_pct,
    )))?;
    engine.register_agent(Box::new(HealthMonitorAgent::new("health-monitor", borrowers)))?;
    engine.register_agent(Box::new(LiquidatorSwarmAgent::new(
        "opportunistic-liquidators",
        config.liquidator_capacity,
    )))?;

    finish(engine, config.duration)
}
