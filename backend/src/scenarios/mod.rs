//! Stress Scenarios
//!
//! Ready-made runs that build an in-memory pool, register the scenario's
//! agents, run the engine and turn the final metrics into a report.
//!
//! Available scenarios:
//! 1. **MassLiquidation**: borrower swarm + global crash + liquidator swarm
//! 2. **PriceVolatility**: random-walk oracle, health monitor, opportunistic liquidators
//! 3. **GovernanceAttack**: a captured DAO raises the liquidation bonus
//! 4. **LiquidityDrain**: one attacker borrows the pool dry, passive lenders watch
//!
//! # Loading from JSON
//!
//! ```rust
//! use nft_lending_stress_core_rs::scenarios::ScenarioConfig;
//!
//! let config = ScenarioConfig::from_json(
//!     r#"{"scenario": "governance_attack", "duration": 150}"#,
//! ).unwrap();
//! let report = config.run().unwrap();
//! assert_eq!(report.summary.events_executed, 2);
//! ```

use crate::metrics::{names, MetricValue};
use crate::models::InMemoryLendingPool;
use crate::orchestrator::{EngineConfig, SimulationEngine, SimulationError};
use crate::reports::{ReportGenerator, SimulationReport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

pub mod governance_attack;
pub mod liquidity_drain;
pub mod mass_liquidation;
pub mod price_volatility;

pub use governance_attack::{run_governance_attack, GovernanceAttackConfig};
pub use liquidity_drain::{run_liquidity_drain, LiquidityDrainConfig};
pub use mass_liquidation::{run_mass_liquidation, MassLiquidationConfig};
pub use price_volatility::{run_price_volatility, PriceVolatilityConfig};

/// Any scenario, selected by the `scenario` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum ScenarioConfig {
    MassLiquidation(MassLiquidationConfig),
    PriceVolatility(PriceVolatilityConfig),
    GovernanceAttack(GovernanceAttackConfig),
    LiquidityDrain(LiquidityDrainConfig),
}

impl ScenarioConfig {
    /// Parse a scenario from JSON; omitted fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json).map_err(|e| SimulationError::InvalidConfig(e.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioConfig::MassLiquidation(_) => "mass_liquidation",
            ScenarioConfig::PriceVolatility(_) => "price_volatility",
            ScenarioConfig::GovernanceAttack(_) => "governance_attack",
            ScenarioConfig::LiquidityDrain(_) => "liquidity_drain",
        }
    }

    pub fn engine_config(&self) -> &EngineConfig {
        match self {
            ScenarioConfig::MassLiquidation(c) => &c.engine,
            ScenarioConfig::PriceVolatility(c) => &c.engine,
            ScenarioConfig::GovernanceAttack(c) => &c.engine,
            ScenarioConfig::LiquidityDrain(c) => &c.engine,
        }
    }

    /// Same scenario with a different random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        match &mut self {
            ScenarioConfig::MassLiquidation(c) => c.engine.rng_seed = seed,
            ScenarioConfig::PriceVolatility(c) => c.engine.rng_seed = seed,
            ScenarioConfig::GovernanceAttack(c) => c.engine.rng_seed = seed,
            ScenarioConfig::LiquidityDrain(c) => c.engine.rng_seed = seed,
        }
        self
    }

    pub fn run(&self) -> Result<SimulationReport, SimulationError> {
        info!(scenario = self.name(), seed = self.engine_config().rng_seed, "running scenario");
        match self {
            ScenarioConfig::MassLiquidation(c) => run_mass_liquidation(c),
            ScenarioConfig::PriceVolatility(c) => run_price_volatility(c),
            ScenarioConfig::GovernanceAttack(c) => run_governance_attack(c),
            ScenarioConfig::LiquidityDrain(c) => run_liquidity_drain(c),
        }
    }
}

// ============================================================================
// Shared runner plumbing
// ============================================================================

/// Borrower ids `0xB0`, `0xB1`, ...
pub fn borrower_ids(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("0xB{}", i)).collect()
}

/// Pool funded with `liquidity` and one unit-weight NFT per borrower
pub(crate) fn pool_with_borrowers(
    liquidity: i64,
    price: f64,
    borrowers: &[String],
    rarity: &str,
) -> InMemoryLendingPool {
    let mut pool = InMemoryLendingPool::new(liquidity, price);
    for user in borrowers {
        pool.add_borrower(user, 1.0, rarity);
    }
    pool
}

/// Engine with the `initial_liquidity` gauge already published
pub(crate) fn engine_for(
    config: &EngineConfig,
    pool: InMemoryLendingPool,
) -> Result<SimulationEngine, SimulationError> {
    let mut engine = SimulationEngine::new(config.clone(), Box::new(pool))?;
    let liquidity = engine.protocol().total_liquidity();
    engine
        .metrics_mut()
        .set_gauge(names::INITIAL_LIQUIDITY, liquidity);
    Ok(engine)
}

/// Run for `duration`, complete the engine and build the report
pub(crate) fn finish(
    mut engine: SimulationEngine,
    duration: u64,
) -> Result<SimulationReport, SimulationError> {
    engine.run(duration)?;
    let snapshot = engine.complete()?;
    Ok(ReportGenerator::new(snapshot).generate())
}

pub(crate) fn validate_fraction(name: &str, value: f64) -> Result<(), SimulationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SimulationError::InvalidConfig(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Gauge view of a JSON state value
pub(crate) fn metric_from_state(value: &Value) -> MetricValue {
    if let Some(v) = value.as_i64() {
        MetricValue::Int(v)
    } else if let Some(v) = value.as_f64() {
        MetricValue::Float(v)
    } else if let Some(v) = value.as_bool() {
        MetricValue::Bool(v)
    } else {
        MetricValue::Text(value.to_string())
    }
}
