//! Simulation metrics
//!
//! Counters, gauges, time series and metadata written by the engine and the
//! agents during a run, plus the read-only [`MetricsSnapshot`] consumed by
//! the report generator.

pub mod registry;
pub mod snapshot;

pub use registry::MetricsRegistry;
pub use snapshot::{MetricValue, MetricsSnapshot, SeriesPoint};

/// Well-known metric names shared by the engine, the agents and the reports
pub mod names {
    pub const EVENTS_EXECUTED: &str = "events_executed";
    pub const EVENTS_FAILED: &str = "events_failed";
    pub const TICKS: &str = "ticks";
    pub const LIQUIDATIONS: &str = "liquidations";
    pub const BAD_DEBT_EVENTS: &str = "bad_debt_events";
    pub const BORROW_EVENTS: &str = "borrow_events";
    pub const BORROW_REJECTIONS: &str = "borrow_rejections";
    pub const LIQUIDATION_REJECTIONS: &str = "liquidation_rejections";
    pub const MARKET_CRASHES: &str = "market_crashes";
    pub const GOVERNANCE_PROPOSALS: &str = "governance_proposals";
    pub const GOVERNANCE_EXECUTIONS: &str = "governance_executions";
    pub const HEALTH_FACTOR_BELOW_ONE: &str = "health_factor_below_one";

    pub const POOL_LIQUIDITY: &str = "pool_liquidity";
    pub const CURRENT_LIQUIDITY: &str = "current_liquidity";
    pub const INITIAL_LIQUIDITY: &str = "initial_liquidity";
    pub const FINAL_LIQUIDITY: &str = "final_liquidity";
    pub const PROTOCOL_SOLVENCY: &str = "protocol_solvency";
    pub const POSITIONS_AT_RISK: &str = "positions_at_risk";

    pub const NFT_PRICE: &str = "nft_price";
    pub const HEALTH_FACTOR: &str = "health_factor";
    pub const LIQUIDATIONS_PER_TICK: &str = "liquidations_per_tick";

    pub const ATTACK_TYPE: &str = "attack_type";
}
