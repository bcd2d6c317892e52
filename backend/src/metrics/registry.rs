//! Metrics Registry
//!
//! Write side of the simulation metrics. Counters only grow, gauges keep the
//! last written value, time series and metadata are append/overwrite maps.
//!
//! The registry is not synchronized. Batch runs aggregate per-batch
//! snapshots through [`MetricsRegistry::merge`] from a single writer.

use super::snapshot::{MetricValue, MetricsSnapshot, SeriesPoint};
use std::collections::BTreeMap;

/// Counters, gauges, time series and metadata for one simulation run
///
/// # Example
/// ```
/// use nft_lending_stress_core_rs::MetricsRegistry;
///
/// let mut metrics = MetricsRegistry::new();
/// metrics.inc("liquidations");
/// metrics.set_gauge("protocol_solvency", true);
/// metrics.record("nft_price", 1, 98_500.0);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.counter("liquidations"), 1);
/// assert_eq!(snapshot.series_values("nft_price"), vec![98_500.0]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsRegistry {
    counters: BTreeMap<String, u64>,
    gauges: BTreeMap<String, MetricValue>,
    time_series: BTreeMap<String, Vec<SeriesPoint>>,
    metadata: BTreeMap<String, MetricValue>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Counters
    // ========================================================================

    /// Increment a counter by one
    pub fn inc(&mut self, name: &str) {
        self.inc_by(name, 1);
    }

    /// Increment a counter by `value`
    pub fn inc_by(&mut self, name: &str, value: u64) {
        let counter = self.counters.entry(name.to_string()).or_insert(0);
        *counter = counter.saturating_add(value);
    }

    pub fn get_counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    // ========================================================================
    // Gauges
    // ========================================================================

    /// Overwrite a gauge with its latest value
    pub fn set_gauge(&mut self, name: &str, value: impl Into<MetricValue>) {
        self.gauges.insert(name.to_string(), value.into());
    }

    pub fn get_gauge(&self, name: &str) -> Option<&MetricValue> {
        self.gauges.get(name)
    }

    // ========================================================================
    // Time series
    // ========================================================================

    /// Append an observation to a named series
    pub fn record(&mut self, name: &str, time: u64, value: f64) {
        self.time_series
            .entry(name.to_string())
            .or_default()
            .push(SeriesPoint { time, value });
    }

    pub fn get_series(&self, name: &str) -> &[SeriesPoint] {
        self.time_series
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    pub fn set_metadata(&mut self, key: &str, value: impl Into<MetricValue>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    pub fn get_metadata(&self, key: &str) -> Option<&MetricValue> {
        self.metadata.get(key)
    }

    // ========================================================================
    // Export / aggregation
    // ========================================================================

    /// Read-only copy of everything recorded so far
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.clone(),
            gauges: self.gauges.clone(),
            time_series: self.time_series.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Fold another run's snapshot into this registry
    ///
    /// Counters are summed, gauges and metadata take the incoming value,
    /// series points are appended after the existing ones.
    pub fn merge(&mut self, other: &MetricsSnapshot) {
        for (name, value) in &other.counters {
            self.inc_by(name, *value);
        }
        for (name, value) in &other.gauges {
            self.gauges.insert(name.clone(), value.clone());
        }
        for (name, points) in &other.time_series {
            self.time_series
                .entry(name.clone())
                .or_default()
                .extend_from_slice(points);
        }
        for (key, value) in &other.metadata {
            self.metadata.insert(key.clone(), value.clone());
        }
    }
}

impl From<MetricsSnapshot> for MetricsRegistry {
    fn from(snapshot: MetricsSnapshot) -> Self {
        Self {
            counters: snapshot.counters,
            gauges: snapshot.gauges,
            time_series: snapshot.time_series,
            metadata: snapshot.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let mut metrics = MetricsRegistry::new();
        metrics.inc("liquidations");
        metrics.inc_by("liquidations", 4);
        assert_eq!(metrics.get_counter("liquidations"), 5);
        assert_eq!(metrics.get_counter("unknown"), 0);
    }

    #[test]
    fn test_gauge_last_write_wins() {
        let mut metrics = MetricsRegistry::new();
        metrics.set_gauge("pool_liquidity", 100i64);
        metrics.set_gauge("pool_liquidity", 40i64);
        assert_eq!(metrics.get_gauge("pool_liquidity"), Some(&MetricValue::Int(40)));
    }

    #[test]
    fn test_series_preserve_order() {
        let mut metrics = MetricsRegistry::new();
        metrics.record("nft_price", 2, 10.0);
        metrics.record("nft_price", 1, 20.0);
        let values: Vec<f64> = metrics.get_series("nft_price").iter().map(|p| p.value).collect();
        assert_eq!(values, vec![10.0, 20.0]);
    }

    #[test]
    fn test_merge_sums_counters_and_appends_series() {
        let mut total = MetricsRegistry::new();
        total.inc_by("liquidations", 2);
        total.record("liquidations_per_tick", 0, 2.0);

        let mut batch = MetricsRegistry::new();
        batch.inc_by("liquidations", 3);
        batch.record("liquidations_per_tick", 0, 3.0);
        batch.set_gauge("protocol_solvency", false);

        total.merge(&batch.snapshot());

        assert_eq!(total.get_counter("liquidations"), 5);
        assert_eq!(total.get_series("liquidations_per_tick").len(), 2);
        assert_eq!(
            total.get_gauge("protocol_solvency"),
            Some(&MetricValue::Bool(false))
        );
    }

    #[test]
    fn test_snapshot_round_trips_into_registry() {
        let mut metrics = MetricsRegistry::new();
        metrics.inc("ticks");
        metrics.set_metadata("attack_type", "governance_capture");
        let restored = MetricsRegistry::from(metrics.snapshot());
        assert_eq!(restored, metrics);
    }
}
