//! Governance attack scenario
//!
//! A malicious actor captures the DAO and pushes the liquidation bonus from
//! 10500 to 14000 bps without a vote. The report records the parameter
//! before and after the attack as `initial_<parameter>` and
//! `final_<parameter>` gauges.

use super::{engine_for, metric_from_state};
use crate::agents::MaliciousGovernanceAgent;
use crate::models::InMemoryLendingPool;
use crate::orchestrator::{EngineConfig, SimulationError};
use crate::reports::{ReportGenerator, SimulationReport};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceAttackConfig {
    pub engine: EngineConfig,
    pub initial_liquidity: i64,
    pub nft_price: f64,
    pub attacker: String,
    pub parameter: String,
    pub initial_value: i64,
    pub malicious_value: i64,
    pub propose_delay: u64,
    pub execute_delay: u64,
    pub duration: u64,
}

impl Default for GovernanceAttackConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            initial_liquidity: 1_000_000,
            nft_price: 100_000.0,
            attacker: "0xATTACKER".to_string(),
            parameter: "liquidation_bonus".to_string(),
            initial_value: 10_500,
            malicious_value: 14_000,
            propose_delay: 10,
            execute_delay: 100,
            duration: 200,
        }
    }
}

impl GovernanceAttackConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        self.engine.validate()?;
        if self.parameter.is_empty() {
            return Err(SimulationError::InvalidConfig(
                "parameter must not be empty".to_string(),
            ));
        }
        if self.execute_delay < self.propose_delay {
            return Err(SimulationError::InvalidConfig(
                "execute_delay must not precede propose_delay".to_string(),
            ));
        }
        Ok(())
    }

    /// Gauge holding the parameter value before the run
    pub fn initial_gauge(&self) -> String {
        format!("initial_{}", self.parameter)
    }

    /// Gauge holding the parameter value after the run
    pub fn final_gauge(&self) -> String {
        format!("final_{}", self.parameter)
    }
}

pub fn run_governance_attack(
    config: &GovernanceAttackConfig,
) -> Result<SimulationReport, SimulationError> {
    config.validate()?;

    let pool = InMemoryLendingPool::new(config.initial_liquidity, config.nft_price);
    let mut engine = engine_for(&config.engine, pool)?;

    engine.register_agent(Box::new(
        MaliciousGovernanceAgent::new("malicious-governance", config.attacker.clone())
            .with_parameter(config.parameter.clone(), config.malicious_value)
            .with_timing(config.propose_delay, config.execute_delay),
    ))?;

    engine
        .context_mut()
        .set_state(&config.parameter, config.initial_value);
    engine
        .metrics_mut()
        .set_gauge(&config.initial_gauge(), config.initial_value);

    engine.run(config.duration)?;

    let final_value = engine
        .state()
        .get(&config.parameter)
        .cloned()
        .unwrap_or(Value::Null);
    engine
        .metrics_mut()
        .set_gauge(&config.final_gauge(), metric_from_state(&final_value));

    let snapshot = engine.complete()?;
    Ok(ReportGenerator::new(snapshot).generate())
}
