//! In-memory lending pool
//!
//! A small, deterministic model of an NFT-collateralized lending pool used
//! by the scenario runners and the tests.
//!
//! Each borrower pledges one NFT whose value is `oracle price × weight`.
//! Borrow limits come from [`compute_ltv_with`], liquidations recover
//! `min(debt, collateral value)` into the pool and book the remainder as bad
//! debt.
//!
//! # Critical Invariants
//!
//! 1. **Liquidity never goes negative**: borrows beyond available liquidity are rejected
//! 2. **Ordered positions**: positions live in a `BTreeMap`, so every listing is sorted
//!    by borrower id
//! 3. **Solvency**: `liquidity + Σ min(debt, collateral) ≥ deposits`

use super::protocol::{
    LendingProtocol, LiquidationOutcome, PositionView, PriceOracle, ProtocolError,
};
use crate::risk::{compute_ltv_with, health_factor, LtvParams, LIQUIDATION_HF};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Oracle with a single settable price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InMemoryOracle {
    price: f64,
}

impl InMemoryOracle {
    pub fn new(price: f64) -> Self {
        Self {
            price: price.max(0.0),
        }
    }
}

impl PriceOracle for InMemoryOracle {
    fn price(&self) -> f64 {
        self.price
    }

    fn set_price(&mut self, value: f64) {
        self.price = if value.is_finite() { value.max(0.0) } else { 0.0 };
    }
}

/// One borrower's pledged collateral and outstanding debt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolPosition {
    pub collateral_weight: f64,
    pub debt: i64,
    pub rarity: String,
}

/// Deterministic in-memory lending pool
///
/// # Example
/// ```
/// use nft_lending_stress_core_rs::models::{InMemoryLendingPool, LendingProtocol};
///
/// let mut pool = InMemoryLendingPool::new(1_000_000, 100_000.0);
/// pool.add_borrower("alice", 1.0, "COMMON");
///
/// assert_eq!(pool.max_borrow("alice"), 50_000);
/// pool.borrow("alice", 40_000).unwrap();
/// assert_eq!(pool.total_liquidity(), 960_000);
/// assert_eq!(pool.health_factor("alice"), 2.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InMemoryLendingPool {
    liquidity: i64,
    deposits: i64,
    bad_debt: i64,
    oracle: InMemoryOracle,
    positions: BTreeMap<String, PoolPosition>,
    ltv_params: LtvParams,
    volatility: f64,
    zone_risk: f64,
}

impl InMemoryLendingPool {
    /// Create a pool funded with `initial_liquidity` and an oracle at `price`
    pub fn new(initial_liquidity: i64, price: f64) -> Self {
        let initial_liquidity = initial_liquidity.max(0);
        Self {
            liquidity: initial_liquidity,
            deposits: initial_liquidity,
            bad_debt: 0,
            oracle: InMemoryOracle::new(price),
            positions: BTreeMap::new(),
            ltv_params: LtvParams::default(),
            volatility: 0.0,
            zone_risk: 0.0,
        }
    }

    /// Override the LTV parameters and the market risk inputs
    pub fn with_risk(mut self, params: LtvParams, volatility: f64, zone_risk: f64) -> Self {
        self.ltv_params = params;
        self.volatility = volatility;
        self.zone_risk = zone_risk;
        self
    }

    /// Register a borrower pledging one NFT
    pub fn add_borrower(&mut self, user: &str, collateral_weight: f64, rarity: &str) {
        self.positions.insert(
            user.to_string(),
            PoolPosition {
                collateral_weight: collateral_weight.max(0.0),
                debt: 0,
                rarity: rarity.to_string(),
            },
        );
    }

    /// Register a borrower with debt already outstanding
    ///
    /// The debt is treated as lent out of earlier deposits, so it does not
    /// reduce the current liquidity.
    pub fn add_position(&mut self, user: &str, collateral_weight: f64, rarity: &str, debt: i64) {
        let debt = debt.max(0);
        self.deposits += debt;
        self.positions.insert(
            user.to_string(),
            PoolPosition {
                collateral_weight: collateral_weight.max(0.0),
                debt,
                rarity: rarity.to_string(),
            },
        );
    }

    pub fn bad_debt(&self) -> i64 {
        self.bad_debt
    }

    pub fn deposits(&self) -> i64 {
        self.deposits
    }

    fn collateral_value(&self, position: &PoolPosition) -> f64 {
        self.oracle.price() * position.collateral_weight
    }

    fn get(&self, user: &str) -> Result<&PoolPosition, ProtocolError> {
        self.positions
            .get(user)
            .ok_or_else(|| ProtocolError::UnknownBorrower(user.to_string()))
    }
}

impl LendingProtocol for InMemoryLendingPool {
    fn total_liquidity(&self) -> i64 {
        self.liquidity
    }

    fn is_solvent(&self) -> bool {
        let recoverable: f64 = self
            .positions
            .values()
            .map(|p| (p.debt as f64).min(self.collateral_value(p)))
            .sum();
        self.liquidity as f64 + recoverable >= self.deposits as f64
    }

    fn max_borrow(&self, user: &str) -> i64 {
        let Some(position) = self.positions.get(user) else {
            return 0;
        };
        let value = self.collateral_value(position).floor() as i64;
        let limit = compute_ltv_with(
            &self.ltv_params,
            value,
            &position.rarity,
            self.volatility,
            self.zone_risk,
        )
        .borrow_limit;
        (limit - position.debt).max(0)
    }

    fn borrow(&mut self, user: &str, amount: i64) -> Result<(), ProtocolError> {
        if amount <= 0 {
            return Err(ProtocolError::InvalidAmount(amount));
        }
        self.get(user)?;
        let available = self.max_borrow(user);
        if amount > available {
            return Err(ProtocolError::ExceedsBorrowLimit {
                user: user.to_string(),
                requested: amount,
                available,
            });
        }
        if amount > self.liquidity {
            return Err(ProtocolError::InsufficientLiquidity {
                required: amount,
                available: self.liquidity,
            });
        }

        self.liquidity -= amount;
        if let Some(position) = self.positions.get_mut(user) {
            position.debt += amount;
        }
        Ok(())
    }

    fn repay(&mut self, user: &str, amount: i64) -> Result<(), ProtocolError> {
        if amount <= 0 {
            return Err(ProtocolError::InvalidAmount(amount));
        }
        let debt = self.get(user)?.debt;
        if amount > debt {
            return Err(ProtocolError::RepayExceedsDebt {
                user: user.to_string(),
                amount,
                debt,
            });
        }

        self.liquidity += amount;
        if let Some(position) = self.positions.get_mut(user) {
            position.debt -= amount;
        }
        Ok(())
    }

    fn deposit(&mut self, amount: i64) -> Result<(), ProtocolError> {
        if amount <= 0 {
            return Err(ProtocolError::InvalidAmount(amount));
        }
        self.liquidity += amount;
        self.deposits += amount;
        Ok(())
    }

    fn health_factor(&self, user: &str) -> f64 {
        match self.positions.get(user) {
            Some(position) => health_factor(self.collateral_value(position), position.debt as f64),
            None => f64::INFINITY,
        }
    }

    fn liquidate(&mut self, user: &str) -> Result<LiquidationOutcome, ProtocolError> {
        let hf = self.health_factor(user);
        let position = self.get(user)?;
        if hf >= LIQUIDATION_HF {
            return Err(ProtocolError::NotLiquidatable {
                user: user.to_string(),
                health_factor: hf,
            });
        }

        let value = self.collateral_value(position).floor() as i64;
        let repaid = position.debt.min(value.max(0));
        let bad_debt = position.debt - repaid;

        self.positions.remove(user);
        self.liquidity += repaid;
        self.bad_debt += bad_debt;
        Ok(LiquidationOutcome { repaid, bad_debt })
    }

    fn underwater_borrowers(&self) -> Vec<String> {
        self.positions
            .iter()
            .filter(|(_, p)| health_factor(self.collateral_value(p), p.debt as f64) < LIQUIDATION_HF)
            .map(|(user, _)| user.clone())
            .collect()
    }

    fn position(&self, user: &str) -> Option<PositionView> {
        self.positions.get(user).map(|p| PositionView {
            user: user.to_string(),
            collateral_value: self.collateral_value(p),
            debt: p.debt,
            rarity: p.rarity.clone(),
        })
    }

    fn oracle(&self) -> &dyn PriceOracle {
        &self.oracle
    }

    fn oracle_mut(&mut self) -> &mut dyn PriceOracle {
        &mut self.oracle
    }
}
