//! Scheduled simulation events
//!
//! This module handles:
//! - The tagged [`SimCommand`] carried by every scheduled event
//! - The single executor that applies a command to the simulation context
//!
//! Events never hold executable references. An agent that wants something
//! to happen later schedules a command variant, and the engine dispatches it
//! through [`execute_command`] when the scheduler pops it.

pub mod handler;
pub mod types;

pub use handler::{execute_command, CommandError};
pub use types::{EventKey, FollowUp, ScheduledEvent, SimCommand};
