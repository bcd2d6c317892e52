//! LTV Calculator
//!
//! ```text
//! ltv = clamp(base + rarity_bonus − volatility·0.20 − zone_risk·0.15, 0.10, max_ltv)
//! ```
//!
//! Unknown rarity keys earn no bonus; they never fail.

use serde::{Deserialize, Serialize};

/// Rarity tier of a collateral NFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Case-insensitive lookup; `None` for unknown keys
    pub fn parse(key: &str) -> Option<Self> {
        match key.trim().to_ascii_uppercase().as_str() {
            "COMMON" => Some(Rarity::Common),
            "RARE" => Some(Rarity::Rare),
            "EPIC" => Some(Rarity::Epic),
            "LEGENDARY" => Some(Rarity::Legendary),
            _ => None,
        }
    }
}

/// Tunable LTV parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LtvParams {
    pub base_ltv: f64,
    pub max_ltv: f64,
    pub min_ltv: f64,
    /// Fraction of the price at which a position becomes liquidatable
    pub liquidation_threshold: f64,
    pub volatility_weight: f64,
    pub zone_risk_weight: f64,
    pub common_bonus: f64,
    pub rare_bonus: f64,
    pub epic_bonus: f64,
    pub legendary_bonus: f64,
}

impl Default for LtvParams {
    fn default() -> Self {
        Self {
            base_ltv: 0.50,
            max_ltv: 0.65,
            min_ltv: 0.10,
            liquidation_threshold: 0.75,
            volatility_weight: 0.20,
            zone_risk_weight: 0.15,
            common_bonus: 0.00,
            rare_bonus: 0.05,
            epic_bonus: 0.10,
            legendary_bonus: 0.15,
        }
    }
}

impl LtvParams {
    /// Bonus for a rarity key, zero when the key is unknown
    pub fn rarity_bonus(&self, rarity: &str) -> f64 {
        match Rarity::parse(rarity) {
            Some(Rarity::Common) => self.common_bonus,
            Some(Rarity::Rare) => self.rare_bonus,
            Some(Rarity::Epic) => self.epic_bonus,
            Some(Rarity::Legendary) => self.legendary_bonus,
            None => 0.0,
        }
    }
}

/// Output of [`compute_ltv`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LtvResult {
    /// Clamped loan-to-value ratio
    pub ltv: f64,
    /// `floor(price · ltv)`
    pub borrow_limit: i64,
    /// `floor(price · liquidation_threshold)`
    pub liquidation_threshold: i64,
}

/// Compute LTV with the default parameters
///
/// `volatility` and `zone_risk` are expected in `[0, 1]`; values outside
/// that range are clamped.
///
/// # Example
/// ```
/// use nft_lending_stress_core_rs::risk::compute_ltv;
///
/// let result = compute_ltv(100_000, "RARE", 0.0, 0.0);
/// assert!((result.ltv - 0.55).abs() < 1e-12);
/// assert_eq!(result.borrow_limit, 55_000);
/// assert_eq!(result.liquidation_threshold, 75_000);
/// ```
pub fn compute_ltv(price: i64, rarity: &str, volatility: f64, zone_risk: f64) -> LtvResult {
    compute_ltv_with(&LtvParams::default(), price, rarity, volatility, zone_risk)
}

/// Compute LTV with explicit parameters
pub fn compute_ltv_with(
    params: &LtvParams,
    price: i64,
    rarity: &str,
    volatility: f64,
    zone_risk: f64,
) -> LtvResult {
    let volatility = unit_interval(volatility);
    let zone_risk = unit_interval(zone_risk);

    let raw = params.base_ltv + params.rarity_bonus(rarity)
        - volatility * params.volatility_weight
        - zone_risk * params.zone_risk_weight;
    let ltv = raw.max(params.min_ltv).min(params.max_ltv);

    let price = price.max(0) as f64;
    LtvResult {
        ltv,
        borrow_limit: (price * ltv).floor() as i64,
        liquidation_threshold: (price * params.liquidation_threshold).floor() as i64,
    }
}

fn unit_interval(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
