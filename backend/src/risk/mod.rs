//! Risk Engine
//!
//! Pure functions that turn position state into a risk classification:
//! - [`compute_ltv`]: loan-to-value, borrow limit and liquidation threshold
//! - [`assess_position`]: health factor, status, recommended action, score
//!
//! Health factors use the unscaled ratio convention: `collateral / debt`,
//! `+∞` for debt-free positions, below 1.0 means liquidatable.

pub mod assessment;
pub mod ltv;

pub use assessment::{
    assess_position, assess_position_with, health_factor, risk_score, PositionAssessment,
    RecommendedAction, RiskStatus, LIQUIDATION_HF, SAFE_HF, WARNING_HF,
};
pub use ltv::{compute_ltv, compute_ltv_with, LtvParams, LtvResult, Rarity};
