//! Liquidity drain scenario
//!
//! One attacker with heavy collateral borrows their full headroom, the
//! collateral price collapses, and a scheduled liquidation attempt tries to
//! recover the loan. Passive lenders publish the remaining liquidity every
//! tick.

use super::{engine_for, finish};
use crate::agents::{LiquidityDrainerAgent, PassiveLenderAgent};
use crate::events::SimCommand;
use crate::models::InMemoryLendingPool;
use crate::orchestrator::{EngineConfig, SimulationError};
use crate::reports::SimulationReport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidityDrainConfig {
    pub engine: EngineConfig,
    pub initial_liquidity: i64,
    pub nft_price: f64,
    pub attacker: String,
    /// Number of NFT units the attacker pledges
    pub attacker_collateral_weight: f64,
    pub rarity: String,
    pub borrow_delay: u64,
    /// Price collapse before the liquidation attempt; `None` keeps the price
    pub crash_delay: Option<u64>,
    pub crash_factor: f64,
    pub liquidation_delay: u64,
    pub duration: u64,
}

impl Default for LiquidityDrainConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            initial_liquidity: 1_000_000,
            nft_price: 100_000.0,
            attacker: "0xDRAINER".to_string(),
            attacker_collateral_weight: 8.0,
            rarity: "COMMON".to_string(),
            borrow_delay: 5,
            crash_delay: Some(20),
            crash_factor: 0.4,
            liquidation_delay: 30,
            duration: 300,
        }
    }
}

impl LiquidityDrainConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        self.engine.validate()?;
        if !(self.attacker_collateral_weight >= 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "attacker_collateral_weight must be non-negative, got {}",
                self.attacker_collateral_weight
            )));
        }
        if !(self.crash_factor >= 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "crash_factor must be non-negative, got {}",
                self.crash_factor
            )));
        }
        Ok(())
    }
}

pub fn run_liquidity_drain(
    config: &LiquidityDrainConfig,
) -> Result<SimulationReport, SimulationError> {
    config.validate()?;

    let mut pool = InMemoryLendingPool::new(config.initial_liquidity, config.nft_price);
    pool.add_borrower(&config.attacker, config.attacker_collateral_weight, &config.rarity);
    let mut engine = engine_for(&config.engine, pool)?;

    engine.register_agent(Box::new(
        LiquidityDrainerAgent::new("liquidity-drainer", config.attacker.clone())
            .with_timing(config.borrow_delay, config.liquidation_delay),
    ))?;
    engine.register_agent(Box::new(PassiveLenderAgent::new("passive-lenders")))?;

    if let Some(delay) = config.crash_delay {
        engine.schedule_event(
            delay,
            SimCommand::PriceShock {
                factor: config.crash_factor,
            },
            "Collateral price collapse",
            None,
        );
    }

    finish(engine, config.duration)
}
