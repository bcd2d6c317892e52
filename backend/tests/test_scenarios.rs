//! Scenario Runner Tests
//!
//! End-to-end runs of the four ready-made stress scenarios with their
//! default configurations.
//!
//! Critical invariants tested:
//! - Mass liquidation drains every position under the liquidators' capacity
//! - Governance capture replaces the parameter with the attacker's value
//! - A drained pool books bad debt and reports insolvency
//! - Invalid configurations are rejected before the engine starts

use nft_lending_stress_core_rs::metrics::{names, MetricValue};
use nft_lending_stress_core_rs::scenarios::{
    run_governance_attack, run_liquidity_drain, run_mass_liquidation, run_price_volatility,
    GovernanceAttackConfig, LiquidityDrainConfig, MassLiquidationConfig, PriceVolatilityConfig,
    ScenarioConfig,
};
use nft_lending_stress_core_rs::SimulationError;

// ============================================================================
// Mass liquidation
// ============================================================================

#[test]
fn test_mass_liquidation_defaults() {
    let report = run_mass_liquidation(&MassLiquidationConfig::default()).unwrap();
    let raw = &report.raw_metrics;

    // 30 × 45,000 borrowed, each NFT later worth 40,000
    assert_eq!(raw.counter(names::BORROW_EVENTS), 30);
    assert_eq!(raw.counter(names::MARKET_CRASHES), 1);
    assert_eq!(report.summary.events_executed, 2);
    assert_eq!(report.summary.liquidations, 30);
    assert_eq!(report.summary.bad_debt_events, 30);
    assert_eq!(
        raw.series_values(names::LIQUIDATIONS_PER_TICK),
        vec![10.0, 10.0, 10.0]
    );
    assert_eq!(report.risk_metrics.max_liquidations_in_block, Some(10.0));

    assert_eq!(report.summary.final_pool_liquidity, Some(1_850_000));
    assert_eq!(report.summary.protocol_solvency, Some(false));
    assert_eq!(
        raw.gauge(names::INITIAL_LIQUIDITY),
        Some(&MetricValue::Int(2_000_000))
    );
}

#[test]
fn test_mild_crash_keeps_positions_safe() {
    let config = MassLiquidationConfig {
        crash_factor: 0.95,
        ..MassLiquidationConfig::default()
    };
    let report = run_mass_liquidation(&config).unwrap();
    assert_eq!(report.summary.liquidations, 0);
    assert_eq!(report.summary.protocol_solvency, Some(true));
    assert_eq!(report.risk_metrics.max_liquidations_in_block, None);
}

#[test]
fn test_mass_liquidation_rejects_bad_fraction() {
    let config = MassLiquidationConfig {
        borrow_fraction: 1.5,
        ..MassLiquidationConfig::default()
    };
    assert!(matches!(
        run_mass_liquidation(&config),
        Err(SimulationError::InvalidConfig(_))
    ));
}

// ============================================================================
// Price volatility
// ============================================================================

#[test]
fn test_price_volatility_defaults() {
    let report = run_price_volatility(&PriceVolatilityConfig::default()).unwrap();
    let raw = &report.raw_metrics;

    assert_eq!(report.summary.events_executed, 1);
    assert_eq!(raw.counter(names::BORROW_EVENTS), 10);
    assert!(report.summary.liquidations <= 10);
    assert_eq!(raw.counter(names::TICKS), 300);

    let prices = raw.series_values(names::NFT_PRICE);
    assert_eq!(prices.len(), 300);
    assert!(prices.iter().all(|p| *p >= 0.0));

    let drawdown = report.risk_metrics.price_drawdown.unwrap();
    assert!((0.0..=1.0).contains(&drawdown));
    assert!(report.risk_metrics.worst_health_factor.is_some());
}

#[test]
fn test_price_volatility_rejects_negative_volatility() {
    let config = PriceVolatilityConfig {
        volatility_pct: -0.1,
        ..PriceVolatilityConfig::default()
    };
    assert!(run_price_volatility(&config).is_err());
}

// ============================================================================
// Governance attack
// ============================================================================

#[test]
fn test_governance_attack_defaults() {
    let report = run_governance_attack(&GovernanceAttackConfig::default()).unwrap();
    let raw = &report.raw_metrics;

    assert_eq!(report.summary.events_executed, 2);
    assert_eq!(raw.counter(names::GOVERNANCE_PROPOSALS), 1);
    assert_eq!(raw.counter(names::GOVERNANCE_EXECUTIONS), 1);
    assert_eq!(
        raw.gauge("initial_liquidation_bonus"),
        Some(&MetricValue::Int(10_500))
    );
    assert_eq!(
        raw.gauge("final_liquidation_bonus"),
        Some(&MetricValue::Int(14_000))
    );
    assert_eq!(
        raw.metadata.get(names::ATTACK_TYPE),
        Some(&MetricValue::Text("governance_capture".to_string()))
    );
    assert_eq!(report.summary.protocol_solvency, Some(true));
}

#[test]
fn test_governance_attack_not_executed_before_deadline() {
    let config = GovernanceAttackConfig {
        duration: 50,
        ..GovernanceAttackConfig::default()
    };
    let report = run_governance_attack(&config).unwrap();
    assert_eq!(report.summary.events_executed, 1);
    assert_eq!(
        report.raw_metrics.gauge("final_liquidation_bonus"),
        Some(&MetricValue::Int(10_500))
    );
}

#[test]
fn test_governance_attack_gauges_follow_parameter() {
    let config = GovernanceAttackConfig {
        parameter: "reserve_factor".to_string(),
        initial_value: 1_000,
        malicious_value: 9_000,
        ..GovernanceAttackConfig::default()
    };
    assert_eq!(config.initial_gauge(), "initial_reserve_factor");

    let report = run_governance_attack(&config).unwrap();
    let raw = &report.raw_metrics;
    assert_eq!(
        raw.gauge("initial_reserve_factor"),
        Some(&MetricValue::Int(1_000))
    );
    assert_eq!(
        raw.gauge("final_reserve_factor"),
        Some(&MetricValue::Int(9_000))
    );
    assert_eq!(raw.gauge("final_liquidation_bonus"), None);
}

#[test]
fn test_governance_attack_rejects_inverted_timing() {
    let config = GovernanceAttackConfig {
        propose_delay: 100,
        execute_delay: 10,
        ..GovernanceAttackConfig::default()
    };
    assert!(matches!(
        run_governance_attack(&config),
        Err(SimulationError::InvalidConfig(_))
    ));
}

// ============================================================================
// Liquidity drain
// ============================================================================

#[test]
fn test_liquidity_drain_defaults() {
    let report = run_liquidity_drain(&LiquidityDrainConfig::default()).unwrap();
    let raw = &report.raw_metrics;

    // 400,000 borrowed against 800,000; collapse to 320,000 leaves 80,000 bad debt
    assert_eq!(report.summary.events_executed, 3);
    assert_eq!(report.summary.liquidations, 1);
    assert_eq!(report.summary.bad_debt_events, 1);
    assert_eq!(report.summary.final_pool_liquidity, Some(920_000));
    assert_eq!(report.summary.protocol_solvency, Some(false));
    assert_eq!(
        raw.metadata.get(names::ATTACK_TYPE),
        Some(&MetricValue::Text("liquidity_drain".to_string()))
    );
}

#[test]
fn test_liquidity_drain_without_crash_stays_solvent() {
    let config = LiquidityDrainConfig {
        crash_delay: None,
        ..LiquidityDrainConfig::default()
    };
    let report = run_liquidity_drain(&config).unwrap();
    assert_eq!(report.summary.events_executed, 2);
    assert_eq!(report.summary.liquidations, 0);
    assert_eq!(report.summary.final_pool_liquidity, Some(600_000));
    assert_eq!(report.summary.protocol_solvency, Some(true));
}

#[test]
fn test_liquidity_drain_rejected_borrow_keeps_running() {
    let config = LiquidityDrainConfig {
        initial_liquidity: 100_000,
        ..LiquidityDrainConfig::default()
    };
    let report = run_liquidity_drain(&config).unwrap();

    assert_eq!(report.raw_metrics.counter(names::BORROW_REJECTIONS), 1);
    assert_eq!(report.summary.events_executed, 3);
    assert_eq!(report.summary.liquidations, 0);
    assert_eq!(report.summary.final_pool_liquidity, Some(100_000));
    assert_eq!(report.summary.protocol_solvency, Some(true));
}

#[test]
fn test_liquidity_drain_rejects_negative_inputs() {
    for config in [
        LiquidityDrainConfig {
            crash_factor: -0.4,
            ..LiquidityDrainConfig::default()
        },
        LiquidityDrainConfig {
            attacker_collateral_weight: -8.0,
            ..LiquidityDrainConfig::default()
        },
    ] {
        assert!(matches!(
            run_liquidity_drain(&config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }
}

// ============================================================================
// JSON configuration
// ============================================================================

#[test]
fn test_from_json_overrides() {
    let config = ScenarioConfig::from_json(
        r#"{
            "scenario": "mass_liquidation",
            "borrowers": 5,
            "liquidator_capacity": 2,
            "engine": {"rng_seed": 7}
        }"#,
    )
    .unwrap();
    assert_eq!(config.name(), "mass_liquidation");
    assert_eq!(config.engine_config().rng_seed, 7);
    assert_eq!(config.engine_config().tick_interval, 1);

    let report = config.run().unwrap();
    assert_eq!(report.summary.liquidations, 5);
    assert_eq!(
        report.raw_metrics.series_values(names::LIQUIDATIONS_PER_TICK),
        vec![2.0, 2.0, 1.0]
    );
}

#[test]
fn test_from_json_rejects_zero_tick_interval() {
    let config = ScenarioConfig::from_json(
        r#"{"scenario": "liquidity_drain", "engine": {"tick_interval": 0}}"#,
    )
    .unwrap();
    assert!(matches!(config.run(), Err(SimulationError::InvalidConfig(_))));
}

#[test]
fn test_from_json_rejects_malformed_input() {
    assert!(ScenarioConfig::from_json("{not json").is_err());
    assert!(ScenarioConfig::from_json(r#"{"borrowers": 3}"#).is_err());
}
