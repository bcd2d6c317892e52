//! Malicious-governance agent
//!
//! Models a worst-case DAO capture: a proposal is staged, then executed
//! directly into context state later, with no vote in between.

use super::SimulationAgent;
use crate::events::SimCommand;
use crate::metrics::names;
use crate::orchestrator::{SimulationEngine, SimulationError};
use serde_json::Value;

pub const GOVERNANCE_CAPTURE: &str = "governance_capture";

#[derive(Debug, Clone, PartialEq)]
pub struct MaliciousGovernanceAgent {
    name: String,
    attacker: String,
    parameter: String,
    malicious_value: Value,
    propose_delay: u64,
    execute_delay: u64,
}

impl MaliciousGovernanceAgent {
    /// Attack that raises `liquidation_bonus` to 14000 bps: proposal at
    /// t+10, execution at t+100
    pub fn new(name: impl Into<String>, attacker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attacker: attacker.into(),
            parameter: "liquidation_bonus".to_string(),
            malicious_value: Value::from(14_000),
            propose_delay: 10,
            execute_delay: 100,
        }
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameter = parameter.into();
        self.malicious_value = value.into();
        self
    }

    pub fn with_timing(mut self, propose_delay: u64, execute_delay: u64) -> Self {
        self.propose_delay = propose_delay;
        self.execute_delay = execute_delay;
        self
    }

    pub fn attacker(&self) -> &str {
        &self.attacker
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }
}

impl SimulationAgent for MaliciousGovernanceAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_register(&mut self, engine: &mut SimulationEngine) -> Result<(), SimulationError> {
        engine
            .metrics_mut()
            .set_metadata(names::ATTACK_TYPE, GOVERNANCE_CAPTURE);

        engine.schedule_event(
            self.propose_delay,
            SimCommand::ProposeParameter {
                key: self.parameter.clone(),
                value: self.malicious_value.clone(),
            },
            "Malicious governance proposal",
            Some(Value::from(self.attacker.clone())),
        );
        engine.schedule_event(
            self.execute_delay,
            SimCommand::ExecuteProposal {
                key: self.parameter.clone(),
            },
            "Execute malicious proposal",
            Some(Value::from(self.attacker.clone())),
        );
        Ok(())
    }
}
