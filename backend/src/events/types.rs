//! Scheduled event types
//!
//! # Design Principles
//!
//! 1. **Determinism**: events are totally ordered by `(timestamp, sequence)`
//! 2. **Self-contained**: a command carries every value it needs to execute
//! 3. **Plain data**: events clone without aliasing, so snapshots are isolated

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordering key of a scheduled event
///
/// `sequence` is the scheduler's insertion counter, so events sharing a
/// timestamp fire in the order they were scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventKey {
    pub timestamp: u64,
    pub sequence: u64,
}

/// A command the engine knows how to apply to the simulation context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimCommand {
    /// Every borrower borrows `borrow_fraction` of their current headroom
    OpenPositions {
        borrowers: Vec<String>,
        borrow_fraction: f64,
    },

    /// Multiply the oracle price by `factor` and flag the crash in state
    PriceShock { factor: f64 },

    /// Stage a governance parameter change under `proposed_<key>`
    ProposeParameter { key: String, value: Value },

    /// Copy a staged proposal into the live parameter, bypassing any vote
    ExecuteProposal { key: String },

    /// Borrow the full headroom available to `user`
    BorrowMax { user: String },

    /// Liquidate `user` if their health factor is below one
    LiquidateIfUnderwater { user: String },

    /// Write the event payload (or null) into context state under `key`
    SetState { key: String },

    /// Run `command`, then reschedule itself `interval` seconds later until
    /// `remaining` executions have happened. `remaining: 0` does nothing.
    Recurring {
        command: Box<SimCommand>,
        interval: u64,
        remaining: u32,
    },
}

impl SimCommand {
    /// Short, stable name of the command kind
    pub fn kind(&self) -> &'static str {
        match self {
            SimCommand::OpenPositions { .. } => "open_positions",
            SimCommand::PriceShock { .. } => "price_shock",
            SimCommand::ProposeParameter { .. } => "propose_parameter",
            SimCommand::ExecuteProposal { .. } => "execute_proposal",
            SimCommand::BorrowMax { .. } => "borrow_max",
            SimCommand::LiquidateIfUnderwater { .. } => "liquidate_if_underwater",
            SimCommand::SetState { .. } => "set_state",
            SimCommand::Recurring { .. } => "recurring",
        }
    }
}

/// An event owned by the scheduler's queue until it is popped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub key: EventKey,
    pub command: SimCommand,
    pub description: String,
    pub payload: Option<Value>,
}

impl ScheduledEvent {
    pub fn timestamp(&self) -> u64 {
        self.key.timestamp
    }
}

/// Event requested by a command while it executes
///
/// Inserted by the scheduler at `now + delay` once the command returns.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowUp {
    pub delay: u64,
    pub command: SimCommand,
    pub description: String,
    pub payload: Option<Value>,
}
