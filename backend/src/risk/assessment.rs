//! Position assessment
//!
//! Classification thresholds are evaluated high-to-low, first match wins,
//! and every boundary is inclusive on the lower class:
//!
//! | health factor | status       | action              |
//! |---------------|--------------|---------------------|
//! | ≥ 1.5         | SAFE         | NONE                |
//! | ≥ 1.1         | WARNING      | NOTIFY              |
//! | ≥ 1.0         | DANGER       | PREPARE_LIQUIDATION |
//! | < 1.0         | LIQUIDATABLE | LIQUIDATE           |

use super::ltv::{compute_ltv_with, LtvParams};
use serde::{Deserialize, Serialize};

pub const SAFE_HF: f64 = 1.5;
pub const WARNING_HF: f64 = 1.1;
pub const LIQUIDATION_HF: f64 = 1.0;

/// Floor applied to the health factor before dividing in [`risk_score`]
const MIN_SCORE_DIVISOR: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskStatus {
    Safe,
    Warning,
    Danger,
    Liquidatable,
}

impl RiskStatus {
    /// Classify a health factor
    pub fn from_health_factor(health_factor: f64) -> Self {
        if health_factor >= SAFE_HF {
            RiskStatus::Safe
        } else if health_factor >= WARNING_HF {
            RiskStatus::Warning
        } else if health_factor >= LIQUIDATION_HF {
            RiskStatus::Danger
        } else {
            RiskStatus::Liquidatable
        }
    }

    pub fn recommended_action(self) -> RecommendedAction {
        match self {
            RiskStatus::Safe => RecommendedAction::None,
            RiskStatus::Warning => RecommendedAction::Notify,
            RiskStatus::Danger => RecommendedAction::PrepareLiquidation,
            RiskStatus::Liquidatable => RecommendedAction::Liquidate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    None,
    Notify,
    PrepareLiquidation,
    Liquidate,
}

/// Risk classification of one position, recomputed on every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionAssessment {
    pub price: i64,
    pub debt: i64,
    pub health_factor: f64,
    pub risk_score: u32,
    pub status: RiskStatus,
    pub recommended_action: RecommendedAction,
    pub ltv: f64,
    pub borrow_limit: i64,
    pub liquidation_threshold: i64,
}

/// `price / debt`, or `+∞` for a position without debt
pub fn health_factor(price: f64, debt: f64) -> f64 {
    if debt <= 0.0 {
        f64::INFINITY
    } else {
        price / debt
    }
}

/// `min(100, round(50 / max(hf, 0.01)))`
///
/// Monotonically non-increasing in the health factor; 0 for debt-free
/// positions.
pub fn risk_score(health_factor: f64) -> u32 {
    let divisor = if health_factor.is_nan() {
        MIN_SCORE_DIVISOR
    } else {
        health_factor.max(MIN_SCORE_DIVISOR)
    };
    (50.0 / divisor).round().min(100.0) as u32
}

/// Assess a position with the default LTV parameters
///
/// # Example
/// ```
/// use nft_lending_stress_core_rs::risk::{assess_position, RiskStatus, RecommendedAction};
///
/// let assessment = assess_position(110, 100, "COMMON", 0.0, 0.0);
/// assert_eq!(assessment.status, RiskStatus::Warning);
/// assert_eq!(assessment.recommended_action, RecommendedAction::Notify);
/// assert_eq!(assessment.risk_score, 45);
/// ```
pub fn assess_position(
    price: i64,
    debt: i64,
    rarity: &str,
    volatility: f64,
    zone_risk: f64,
) -> PositionAssessment {
    assess_position_with(&LtvParams::default(), price, debt, rarity, volatility, zone_risk)
}

/// Assess a position with explicit LTV parameters
pub fn assess_position_with(
    params: &LtvParams,
    price: i64,
    debt: i64,
    rarity: &str,
    volatility: f64,
    zone_risk: f64,
) -> PositionAssessment {
    let ltv = compute_ltv_with(params, price, rarity, volatility, zone_risk);
    let hf = health_factor(price as f64, debt as f64);
    let status = RiskStatus::from_health_factor(hf);

    PositionAssessment {
        price,
        debt,
        health_factor: hf,
        risk_score: risk_score(hf),
        status,
        recommended_action: status.recommended_action(),
        ltv: ltv.ltv,
        borrow_limit: ltv.borrow_limit,
        liquidation_threshold: ltv.liquidation_threshold,
    }
}
