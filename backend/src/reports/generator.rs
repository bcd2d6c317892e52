//! Report generator

use crate::metrics::{names, MetricValue, MetricsSnapshot};
use serde::{Deserialize, Serialize};

/// Headline numbers of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub events_executed: u64,
    pub liquidations: u64,
    pub bad_debt_events: u64,
    /// Last value of the `pool_liquidity` gauge
    pub final_pool_liquidity: Option<i64>,
    pub protocol_solvency: Option<bool>,
}

/// Values derived from the recorded time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Largest value of `liquidations_per_tick`
    pub max_liquidations_in_block: Option<f64>,
    /// Smallest value of `health_factor`
    pub worst_health_factor: Option<f64>,
    /// `(peak − trough) / peak` over `nft_price`
    pub price_drawdown: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub summary: ExecutiveSummary,
    pub risk_metrics: RiskMetrics,
    pub raw_metrics: MetricsSnapshot,
}

impl SimulationReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Builds a [`SimulationReport`] from a metrics snapshot
///
/// # Example
/// ```
/// use nft_lending_stress_core_rs::MetricsRegistry;
/// use nft_lending_stress_core_rs::reports::ReportGenerator;
///
/// let mut metrics = MetricsRegistry::new();
/// metrics.record("nft_price", 0, 100.0);
/// metrics.record("nft_price", 1, 60.0);
/// metrics.record("nft_price", 2, 80.0);
///
/// let report = ReportGenerator::new(metrics.snapshot()).generate();
/// assert_eq!(report.risk_metrics.price_drawdown, Some(0.4));
/// assert_eq!(report.summary.liquidations, 0);
/// ```
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    metrics: MetricsSnapshot,
}

impl ReportGenerator {
    pub fn new(metrics: MetricsSnapshot) -> Self {
        Self { metrics }
    }

    pub fn executive_summary(&self) -> ExecutiveSummary {
        ExecutiveSummary {
            events_executed: self.metrics.counter(names::EVENTS_EXECUTED),
            liquidations: self.metrics.counter(names::LIQUIDATIONS),
            bad_debt_events: self.metrics.counter(names::BAD_DEBT_EVENTS),
            final_pool_liquidity: self
                .metrics
                .gauge(names::POOL_LIQUIDITY)
                .and_then(as_amount),
            protocol_solvency: self
                .metrics
                .gauge(names::PROTOCOL_SOLVENCY)
                .and_then(MetricValue::as_bool),
        }
    }

    pub fn risk_metrics(&self) -> RiskMetrics {
        RiskMetrics {
            max_liquidations_in_block: self.max_in_series(names::LIQUIDATIONS_PER_TICK),
            worst_health_factor: self.min_in_series(names::HEALTH_FACTOR),
            price_drawdown: self.price_drawdown(),
        }
    }

    pub fn generate(self) -> SimulationReport {
        SimulationReport {
            summary: self.executive_summary(),
            risk_metrics: self.risk_metrics(),
            raw_metrics: self.metrics,
        }
    }

    fn max_in_series(&self, name: &str) -> Option<f64> {
        self.metrics
            .series(name)
            .iter()
            .map(|point| point.value)
            .reduce(f64::max)
    }

    fn min_in_series(&self, name: &str) -> Option<f64> {
        self.metrics
            .series(name)
            .iter()
            .map(|point| point.value)
            .reduce(f64::min)
    }

    fn price_drawdown(&self) -> Option<f64> {
        let peak = self.max_in_series(names::NFT_PRICE)?;
        let trough = self.min_in_series(names::NFT_PRICE)?;
        if peak > 0.0 {
            Some((peak - trough) / peak)
        } else {
            None
        }
    }
}

fn as_amount(value: &MetricValue) -> Option<i64> {
    match value {
        MetricValue::Int(v) => Some(*v),
        MetricValue::Float(v) if v.is_finite() => Some(v.floor() as i64),
        _ => None,
    }
}
