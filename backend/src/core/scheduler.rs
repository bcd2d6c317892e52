//! Event Scheduler
//!
//! Deterministic priority queue of [`ScheduledEvent`]s keyed on simulated time.
//!
//! # Critical Invariants
//!
//! 1. **Monotonic time**: `current_time` never decreases
//! 2. **Total order**: events fire by timestamp, ties by insertion order
//! 3. **No hidden state**: the scheduler is plain data, so `clone()` is a full,
//!    isolated copy of the queue, the clock and the insertion counter
//!
//! # Example
//!
//! ```rust
//! use nft_lending_stress_core_rs::core::EventScheduler;
//! use nft_lending_stress_core_rs::events::SimCommand;
//!
//! let mut scheduler = EventScheduler::new(0);
//! for delay in [30, 10, 20] {
//!     scheduler.schedule(delay, SimCommand::SetState { key: format!("t{}", delay) }, "mark", None);
//! }
//!
//! let mut fired = Vec::new();
//! scheduler
//!     .run_all(|event, now| {
//!         fired.push(now);
//!         let _ = event;
//!         Ok(Vec::new())
//!     })
//!     .unwrap();
//! assert_eq!(fired, vec![10, 20, 30]);
//! ```

use crate::events::{CommandError, EventKey, FollowUp, ScheduledEvent, SimCommand};
use crate::orchestrator::SimulationError;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Min-priority queue clock for simulated time
#[derive(Debug, Clone, PartialEq)]
pub struct EventScheduler {
    current_time: u64,
    next_sequence: u64,
    queue: BTreeMap<EventKey, ScheduledEvent>,
}

impl EventScheduler {
    /// Create an empty scheduler whose clock starts at `start_time`
    pub fn new(start_time: u64) -> Self {
        Self {
            current_time: start_time,
            next_sequence: 0,
            queue: BTreeMap::new(),
        }
    }

    // ========================================================================
    // Event management
    // ========================================================================

    /// Schedule `command` to fire `delay` seconds from now
    pub fn schedule(
        &mut self,
        delay: u64,
        command: SimCommand,
        description: impl Into<String>,
        payload: Option<Value>,
    ) -> EventKey {
        let timestamp = self.current_time.saturating_add(delay);
        self.insert(timestamp, command, description.into(), payload)
    }

    /// Schedule `command` at an absolute timestamp
    ///
    /// Fails with [`SimulationError::InvalidSchedule`] when `timestamp` is
    /// already in the past. An event at exactly `current_time` is accepted and
    /// fires on the next drain.
    pub fn schedule_at(
        &mut self,
        timestamp: u64,
        command: SimCommand,
        description: impl Into<String>,
        payload: Option<Value>,
    ) -> Result<EventKey, SimulationError> {
        if timestamp < self.current_time {
            return Err(SimulationError::InvalidSchedule {
                requested: timestamp,
                current_time: self.current_time,
            });
        }
        Ok(self.insert(timestamp, command, description.into(), payload))
    }

    fn insert(
        &mut self,
        timestamp: u64,
        command: SimCommand,
        description: String,
        payload: Option<Value>,
    ) -> EventKey {
        let key = EventKey {
            timestamp,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.queue.insert(
            key,
            ScheduledEvent {
                key,
                command,
                description,
                payload,
            },
        );
        key
    }

    // ========================================================================
    // Time control
    // ========================================================================

    /// Move the clock forward by exactly `seconds`, then execute every event
    /// due at or before the new time
    ///
    /// Returns the number of events executed.
    pub fn advance_time<E>(&mut self, seconds: u64, mut executor: E) -> Result<usize, SimulationError>
    where
        E: FnMut(&ScheduledEvent, u64) -> Result<Vec<FollowUp>, CommandError>,
    {
        self.current_time = self.current_time.saturating_add(seconds);
        self.execute_due(&mut executor)
    }

    /// Jump the clock to `timestamp` and execute everything due
    ///
    /// Fails with [`SimulationError::TimeTravel`] if `timestamp` is behind
    /// the current time; the clock is left untouched in that case.
    pub fn run_until<E>(&mut self, timestamp: u64, mut executor: E) -> Result<usize, SimulationError>
    where
        E: FnMut(&ScheduledEvent, u64) -> Result<Vec<FollowUp>, CommandError>,
    {
        if timestamp < self.current_time {
            return Err(SimulationError::TimeTravel {
                requested: timestamp,
                current_time: self.current_time,
            });
        }
        self.current_time = timestamp;
        self.execute_due(&mut executor)
    }

    /// Drain the whole queue, moving the clock to each popped event
    ///
    /// Does not terminate if events keep rescheduling themselves forever.
    pub fn run_all<E>(&mut self, mut executor: E) -> Result<usize, SimulationError>
    where
        E: FnMut(&ScheduledEvent, u64) -> Result<Vec<FollowUp>, CommandError>,
    {
        let mut executed = 0;
        while let Some((_, event)) = self.queue.pop_first() {
            self.current_time = self.current_time.max(event.timestamp());
            self.execute(event, &mut executor)?;
            executed += 1;
        }
        Ok(executed)
    }

    fn execute_due<E>(&mut self, executor: &mut E) -> Result<usize, SimulationError>
    where
        E: FnMut(&ScheduledEvent, u64) -> Result<Vec<FollowUp>, CommandError>,
    {
        let mut executed = 0;
        loop {
            let due = matches!(
                self.queue.first_key_value(),
                Some((key, _)) if key.timestamp <= self.current_time
            );
            if !due {
                break;
            }
            let Some((_, event)) = self.queue.pop_first() else {
                break;
            };
            self.execute(event, executor)?;
            executed += 1;
        }
        Ok(executed)
    }

    /// Run one popped event. The event is consumed whether or not it succeeds.
    fn execute<E>(&mut self, event: ScheduledEvent, executor: &mut E) -> Result<(), SimulationError>
    where
        E: FnMut(&ScheduledEvent, u64) -> Result<Vec<FollowUp>, CommandError>,
    {
        debug!(
            time = self.current_time,
            sequence = event.key.sequence,
            description = %event.description,
            "executing scheduled event"
        );
        match executor(&event, self.current_time) {
            Ok(follow_ups) => {
                for follow_up in follow_ups {
                    self.schedule(
                        follow_up.delay,
                        follow_up.command,
                        follow_up.description,
                        follow_up.payload,
                    );
                }
                Ok(())
            }
            Err(source) => {
                warn!(
                    time = self.current_time,
                    description = %event.description,
                    error = %source,
                    "scheduled event failed"
                );
                Err(SimulationError::EventExecution {
                    description: event.description,
                    timestamp: event.key.timestamp,
                    source,
                })
            }
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    /// Number of events still queued
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Timestamp of the earliest queued event, if any
    pub fn next_event_time(&self) -> Option<u64> {
        self.queue.keys().next().map(|key| key.timestamp)
    }

    /// Queued events in firing order
    pub fn pending(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.queue.values()
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new(0)
    }
}
