//! Protocol handle
//!
//! The engine talks to the lending protocol only through [`LendingProtocol`].
//! Implementations may be a mock, the in-memory [`InMemoryLendingPool`], or
//! an adapter to a live chain; the engine only relies on the method
//! contracts below and on mutations being visible to the next call within
//! the same tick.
//!
//! [`InMemoryLendingPool`]: crate::models::pool::InMemoryLendingPool

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Rejections raised by a protocol handle
///
/// Stress scenarios provoke these on purpose; agents record them as metrics
/// instead of aborting the run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProtocolError {
    #[error("Unknown borrower: {0}")]
    UnknownBorrower(String),

    #[error("Amount must be positive, got {0}")]
    InvalidAmount(i64),

    #[error("Borrow of {requested} exceeds limit {available} for {user}")]
    ExceedsBorrowLimit {
        user: String,
        requested: i64,
        available: i64,
    },

    #[error("Insufficient pool liquidity: required {required}, available {available}")]
    InsufficientLiquidity { required: i64, available: i64 },

    #[error("Position {user} is not liquidatable (health factor {health_factor})")]
    NotLiquidatable { user: String, health_factor: f64 },

    #[error("Repayment of {amount} exceeds debt {debt} for {user}")]
    RepayExceedsDebt { user: String, amount: i64, debt: i64 },
}

/// Collateral value and debt of one borrower at the current oracle price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionView {
    pub user: String,
    pub collateral_value: f64,
    pub debt: i64,
    pub rarity: String,
}

/// Result of a successful liquidation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidationOutcome {
    /// Debt recovered into the pool
    pub repaid: i64,
    /// Debt that collateral could not cover
    pub bad_debt: i64,
}

/// Price oracle sub-handle
pub trait PriceOracle {
    fn price(&self) -> f64;
    fn set_price(&mut self, value: f64);
}

/// Cloning support for boxed protocol handles
///
/// Snapshots and forks need an independent copy of the protocol so that a
/// branch never observes another branch's mutations.
pub trait ProtocolClone {
    fn clone_box(&self) -> Box<dyn LendingProtocol>;
}

impl<T> ProtocolClone for T
where
    T: LendingProtocol + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn LendingProtocol> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn LendingProtocol> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Minimal contract the engine and agents need from a lending protocol
pub trait LendingProtocol: ProtocolClone + Send + fmt::Debug {
    /// Liquidity currently available to borrowers
    fn total_liquidity(&self) -> i64;

    fn is_solvent(&self) -> bool;

    /// Remaining borrow headroom for `user` (0 for unknown users)
    fn max_borrow(&self, user: &str) -> i64;

    fn borrow(&mut self, user: &str, amount: i64) -> Result<(), ProtocolError>;

    fn repay(&mut self, user: &str, amount: i64) -> Result<(), ProtocolError>;

    fn deposit(&mut self, amount: i64) -> Result<(), ProtocolError>;

    /// Health factor of `user`; `+∞` when the user has no debt
    fn health_factor(&self, user: &str) -> f64;

    fn liquidate(&mut self, user: &str) -> Result<LiquidationOutcome, ProtocolError>;

    /// Borrowers with a health factor below 1.0, in a deterministic order
    fn underwater_borrowers(&self) -> Vec<String>;

    fn position(&self, user: &str) -> Option<PositionView>;

    fn oracle(&self) -> &dyn PriceOracle;

    fn oracle_mut(&mut self) -> &mut dyn PriceOracle;

    fn oracle_price(&self) -> f64 {
        self.oracle().price()
    }
}
