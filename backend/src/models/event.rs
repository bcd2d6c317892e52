//! Engine event log
//!
//! Audit trail of what the engine did during a run, in execution order.
//! Metrics answer "how much"; the log answers "what happened and when",
//! which is what a failing scenario needs to be reproduced.
//!
//! The log is part of every snapshot, so a restored or forked run carries
//! the history that led up to the snapshot.

use serde::{Deserialize, Serialize};

/// Something the engine did, stamped with simulated time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Agent registered with the engine
    AgentRegistered { time: u64, agent: String },

    /// Scheduled event executed successfully
    EventExecuted {
        time: u64,
        sequence: u64,
        kind: String,
        description: String,
    },

    /// Scheduled event failed and aborted the current drain
    EventFailed {
        time: u64,
        description: String,
        error: String,
    },

    /// Engine was completed and final gauges were published
    RunCompleted {
        time: u64,
        ticks: u64,
        events_executed: u64,
    },
}

impl EngineEvent {
    pub fn time(&self) -> u64 {
        match self {
            EngineEvent::AgentRegistered { time, .. }
            | EngineEvent::EventExecuted { time, .. }
            | EngineEvent::EventFailed { time, .. }
            | EngineEvent::RunCompleted { time, .. } => *time,
        }
    }

    /// Short name of the entry type
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::AgentRegistered { .. } => "AgentRegistered",
            EngineEvent::EventExecuted { .. } => "EventExecuted",
            EngineEvent::EventFailed { .. } => "EventFailed",
            EngineEvent::RunCompleted { .. } => "RunCompleted",
        }
    }
}

/// Ordered engine event log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    events: Vec<EngineEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Entries stamped with `time`
    pub fn events_at(&self, time: u64) -> Vec<&EngineEvent> {
        self.events.iter().filter(|e| e.time() == time).collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&EngineEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Descriptions of executed events, in execution order
    pub fn executed_descriptions(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                EngineEvent::EventExecuted { description, .. } => Some(description.as_str()),
                _ => None,
            })
            .collect()
    }
}
