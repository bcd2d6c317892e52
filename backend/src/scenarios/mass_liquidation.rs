//! Mass liquidation scenario
//!
//! Thirty borrowers open positions at 90% of their headroom, a global crash
//! cuts the NFT price to 40% and a liquidator swarm with a capacity of ten
//! per tick works through the cascade.

use super::{borrower_ids, engine_for, finish, pool_with_borrowers, validate_fraction};
use crate::agents::{BorrowerSwarmAgent, LiquidatorSwarmAgent};
use crate::orchestrator::{EngineConfig, SimulationError};
use crate::reports::SimulationReport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassLiquidationConfig {
    pub engine: EngineConfig,
    pub initial_liquidity: i64,
    pub nft_price: f64,
    pub borrowers: usize,
    pub rarity: String,
    pub borrow_fraction: f64,
    pub open_delay: u64,
    pub crash_delay: u64,
    pub crash_factor: f64,
    pub liquidator_capacity: usize,
    pub duration: u64,
}

impl Default for MassLiquidationConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            initial_liquidity: 2_000_000,
            nft_price: 100_000.0,
            borrowers: 30,
            rarity: "COMMON".to_string(),
            borrow_fraction: 0.9,
            open_delay: 5,
            crash_delay: 50,
            crash_factor: 0.4,
            liquidator_capacity: 10,
            duration: 300,
        }
    }
}

impl MassLiquidationConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        self.engine.validate()?;
        validate_fraction("borrow_fraction", self.borrow_fraction)?;
        if self.crash_factor < 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "crash_factor must be non-negative, got {}",
                self.crash_factor
            )));
        }
        Ok(())
    }
}

pub fn run_mass_liquidation(
    config: &MassLiquidationConfig,
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

    engine.register_agent(Box::new(
        BorrowerSwarmAgent::new("borrower-swarm", borrowers)
            .with_open(config.open_delay, config.borrow_fraction)
            .with_crash(config.crash_delay, config.crash_factor),
    ))?;
    engine.register_agent(Box::new(LiquidatorSwarmAgent::new(
        "liquidator-swarm",
        config.liquidator_capacity,
    )))?;

    finish(engine, config.duration)
}
