//! Scheduled command execution
//!
//! [`execute_command`] is the only place where a popped [`ScheduledEvent`]
//! touches the simulation context. Protocol rejections of borrows and
//! liquidations are recorded as metrics; only failures that make the command
//! itself meaningless are returned as [`CommandError`]s and abort the drain.

use crate::events::types::{FollowUp, ScheduledEvent, SimCommand};
use crate::metrics::names;
use crate::models::{ProtocolError, SimulationContext};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a scheduled command could not be executed
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CommandError {
    #[error("No pending proposal for parameter '{0}'")]
    NoPendingProposal(String),

    #[error("Protocol rejected command: {0}")]
    Protocol(#[from] ProtocolError),
}

/// State key under which a proposal for `key` is staged
pub fn proposal_key(key: &str) -> String {
    format!("proposed_{}", key)
}

/// Apply a scheduled event's command to the context
///
/// Returns the follow-up events the command wants scheduled.
pub fn execute_command(
    ctx: &mut SimulationContext,
    event: &ScheduledEvent,
    now: u64,
) -> Result<Vec<FollowUp>, CommandError> {
    apply(ctx, &event.command, event.payload.as_ref(), &event.description, now)
}

fn apply(
    ctx: &mut SimulationContext,
    command: &SimCommand,
    payload: Option<&Value>,
    description: &str,
    now: u64,
) -> Result<Vec<FollowUp>, CommandError> {
    match command {
        SimCommand::OpenPositions {
            borrowers,
            borrow_fraction,
        } => {
            open_positions(ctx, borrowers, *borrow_fraction, now);
            Ok(Vec::new())
        }

        SimCommand::PriceShock { factor } => {
            let shocked = (ctx.protocol.oracle_price() * factor).max(0.0);
            ctx.protocol.oracle_mut().set_price(shocked);
            ctx.set_state("market_crash", true);
            ctx.metrics.inc(names::MARKET_CRASHES);
            ctx.metrics.record(names::NFT_PRICE, now, ctx.protocol.oracle_price());
            info!(time = now, factor = *factor, price = shocked, "price shock applied");
            Ok(Vec::new())
        }

        SimCommand::ProposeParameter { key, value } => {
            ctx.set_state(&proposal_key(key), value.clone());
            ctx.metrics.inc(names::GOVERNANCE_PROPOSALS);
            info!(time = now, parameter = %key, value = %value, "governance proposal staged");
            Ok(Vec::new())
        }

        SimCommand::ExecuteProposal { key } => {
            let value = ctx
                .state
                .get(&proposal_key(key))
                .cloned()
                .ok_or_else(|| CommandError::NoPendingProposal(key.clone()))?;
            ctx.set_state(key, value.clone());
            ctx.metrics.inc(names::GOVERNANCE_EXECUTIONS);
            info!(time = now, parameter = %key, value = %value, "governance proposal executed");
            Ok(Vec::new())
        }

        SimCommand::BorrowMax { user } => {
            borrow_max(ctx, user, now);
            Ok(Vec::new())
        }

        SimCommand::LiquidateIfUnderwater { user } => {
            if ctx.protocol.health_factor(user) < crate::risk::LIQUIDATION_HF {
                match ctx.protocol.liquidate(user) {
                    Ok(outcome) => {
                        ctx.metrics.inc(names::LIQUIDATIONS);
                        if outcome.bad_debt > 0 {
                            ctx.metrics.inc(names::BAD_DEBT_EVENTS);
                        }
                        debug!(time = now, user = %user, repaid = outcome.repaid, "position liquidated");
                    }
                    Err(err) => {
                        ctx.metrics.inc(names::LIQUIDATION_REJECTIONS);
                        warn!(time = now, user = %user, error = %err, "liquidation rejected");
                    }
                }
            }
            Ok(Vec::new())
        }

        SimCommand::SetState { key } => {
            ctx.set_state(key, payload.cloned().unwrap_or(Value::Null));
            Ok(Vec::new())
        }

        SimCommand::Recurring {
            command: inner,
            interval,
            remaining,
        } => {
            if *remaining == 0 {
                return Ok(Vec::new());
            }
            let mut follow_ups = apply(ctx, inner, payload, description, now)?;
            if *remaining > 1 {
                follow_ups.push(FollowUp {
                    delay: *interval,
                    command: SimCommand::Recurring {
                        command: inner.clone(),
                        interval: *interval,
                        remaining: remaining - 1,
                    },
                    description: description.to_string(),
                    payload: payload.cloned(),
                });
            }
            Ok(follow_ups)
        }
    }
}

/// Borrow everything `user` may borrow; rejections and empty headroom are
/// counted, never returned
fn borrow_max(ctx: &mut SimulationContext, user: &str, now: u64) {
    let amount = ctx.protocol.max_borrow(user);
    if amount <= 0 {
        ctx.metrics.inc(names::BORROW_REJECTIONS);
        warn!(time = now, user = %user, "no borrow headroom");
        return;
    }

    match ctx.protocol.borrow(user, amount) {
        Ok(()) => {
            ctx.metrics.inc(names::BORROW_EVENTS);
            ctx.metrics
                .record(names::POOL_LIQUIDITY, now, ctx.protocol.total_liquidity() as f64);
            debug!(time = now, user = %user, amount, "borrowed full headroom");
        }
        Err(err) => {
            ctx.metrics.inc(names::BORROW_REJECTIONS);
            warn!(time = now, user = %user, amount, error = %err, "borrow rejected");
        }
    }
}

fn open_positions(ctx: &mut SimulationContext, borrowers: &[String], fraction: f64, now: u64) {
    let fraction = fraction.clamp(0.0, 1.0);
    let mut opened = 0usize;

    for user in borrowers {
        let amount = (ctx.protocol.max_borrow(user) as f64 * fraction).floor() as i64;
        match ctx.protocol.borrow(user, amount) {
            Ok(()) => {
                ctx.metrics.inc(names::BORROW_EVENTS);
                opened += 1;
            }
            Err(err) => {
                ctx.metrics.inc(names::BORROW_REJECTIONS);
                warn!(time = now, user = %user, error = %err, "borrow rejected");
            }
        }
    }

    ctx.metrics
        .record(names::POOL_LIQUIDITY, now, ctx.protocol.total_liquidity() as f64);
    info!(time = now, opened, requested = borrowers.len(), "positions opened");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::EventKey;
    use crate::models::{InMemoryLendingPool, LendingProtocol};
    use serde_json::json;

    fn context() -> SimulationContext {
        let mut pool = InMemoryLendingPool::new(1_000_000, 100_000.0);
        for user in ["b0", "b1", "b2"] {
            pool.add_borrower(user, 1.0, "COMMON");
        }
        SimulationContext::new(Box::new(pool), 7)
    }

    fn event(command: SimCommand, payload: Option<Value>) -> ScheduledEvent {
        ScheduledEvent {
            key: EventKey {
                timestamp: 0,
                sequence: 0,
            },
            command,
            description: "test".to_string(),
            payload,
        }
    }

    #[test]
    fn test_open_positions_borrows_fraction_of_headroom() {
        let mut ctx = context();
        let cmd = SimCommand::OpenPositions {
            borrowers: vec!["b0".into(), "b1".into(), "ghost".into()],
            borrow_fraction: 0.9,
        };
        execute_command(&mut ctx, &event(cmd, None), 5).unwrap();

        assert_eq!(ctx.metrics.get_counter(names::BORROW_EVENTS), 2);
        assert_eq!(ctx.metrics.get_counter(names::BORROW_REJECTIONS), 1);
        assert_eq!(ctx.protocol.total_liquidity(), 1_000_000 - 2 * 45_000);
    }

    #[test]
    fn test_execute_without_proposal_fails() {
        let mut ctx = context();
        let cmd = SimCommand::ExecuteProposal {
            key: "liquidation_bonus".into(),
        };
        let err = execute_command(&mut ctx, &event(cmd, None), 1).unwrap_err();
        assert_eq!(err, CommandError::NoPendingProposal("liquidation_bonus".into()));
    }

    #[test]
    fn test_proposal_then_execution() {
        let mut ctx = context();
        ctx.set_state("liquidation_bonus", 10_500);
        let propose = SimCommand::ProposeParameter {
            key: "liquidation_bonus".into(),
            value: json!(14_000),
        };
        execute_command(&mut ctx, &event(propose, None), 10).unwrap();
        assert_eq!(ctx.state_f64("liquidation_bonus"), Some(10_500.0));

        let execute = SimCommand::ExecuteProposal {
            key: "liquidation_bonus".into(),
        };
        execute_command(&mut ctx, &event(execute, None), 100).unwrap();
        assert_eq!(ctx.state_f64("liquidation_bonus"), Some(14_000.0));
    }

    #[test]
    fn test_set_state_uses_payload() {
        let mut ctx = context();
        let cmd = SimCommand::SetState { key: "flag".into() };
        execute_command(&mut ctx, &event(cmd.clone(), Some(json!("on"))), 0).unwrap();
        assert_eq!(ctx.state.get("flag"), Some(&json!("on")));

        execute_command(&mut ctx, &event(cmd, None), 0).unwrap();
        assert_eq!(ctx.state.get("flag"), Some(&Value::Null));
    }

    #[test]
    fn test_recurring_requests_follow_up_until_exhausted() {
        let mut ctx = context();
        let recurring = |remaining| SimCommand::Recurring {
            command: Box::new(SimCommand::PriceShock { factor: 0.9 }),
            interval: 10,
            remaining,
        };

        let follow_ups = execute_command(&mut ctx, &event(recurring(2), None), 0).unwrap();
        assert_eq!(follow_ups.len(), 1);
        assert_eq!(follow_ups[0].delay, 10);
        assert_eq!(follow_ups[0].command, recurring(1));

        let follow_ups = execute_command(&mut ctx, &event(recurring(1), None), 10).unwrap();
        assert!(follow_ups.is_empty());
        assert_eq!(ctx.metrics.get_counter(names::MARKET_CRASHES), 2);
    }

    #[test]
    fn test_recurring_with_zero_remaining_is_a_no_op() {
        let mut ctx = context();
        let cmd = SimCommand::Recurring {
            command: Box::new(SimCommand::PriceShock { factor: 0.5 }),
            interval: 10,
            remaining: 0,
        };
        let follow_ups = execute_command(&mut ctx, &event(cmd, None), 0).unwrap();
        assert!(follow_ups.is_empty());
        assert_eq!(ctx.metrics.get_counter(names::MARKET_CRASHES), 0);
        assert_eq!(ctx.protocol.oracle_price(), 100_000.0);
    }

    #[test]
    fn test_borrow_max_rejection_is_counted() {
        let mut pool = InMemoryLendingPool::new(10_000, 100_000.0);
        pool.add_borrower("whale", 1.0, "COMMON");
        pool.add_borrower("empty", 0.0, "COMMON");
        let mut ctx = SimulationContext::new(Box::new(pool), 7);

        for user in ["whale", "empty"] {
            let cmd = SimCommand::BorrowMax { user: user.into() };
            assert!(execute_command(&mut ctx, &event(cmd, None), 5).unwrap().is_empty());
        }

        assert_eq!(ctx.metrics.get_counter(names::BORROW_EVENTS), 0);
        assert_eq!(ctx.metrics.get_counter(names::BORROW_REJECTIONS), 2);
        assert_eq!(ctx.protocol.total_liquidity(), 10_000);
    }

    #[test]
    fn test_price_shock_scales_oracle() {
        let mut ctx = context();
        execute_command(&mut ctx, &event(SimCommand::PriceShock { factor: 0.5 }, None), 50).unwrap();
        assert_eq!(ctx.protocol.oracle_price(), 50_000.0);
        assert_eq!(ctx.state.get("market_crash"), Some(&json!(true)));
    }
}
