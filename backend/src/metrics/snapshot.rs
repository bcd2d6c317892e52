//! Metrics snapshot - read-only export of a [`MetricsRegistry`](super::MetricsRegistry)
//!
//! Every map is a `BTreeMap`, so serializing the same snapshot twice (or the
//! snapshots of two identical runs) yields byte-identical JSON.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Value of a gauge or metadata entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl MetricValue {
    /// Numeric view of the value (`None` for text)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Int(v) => Some(*v as f64),
            MetricValue::Float(v) => Some(*v),
            MetricValue::Bool(_) | MetricValue::Text(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetricValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for MetricValue {
    fn from(value: bool) -> Self {
        MetricValue::Bool(value)
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Int(value)
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Float(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::Text(value)
    }
}

/// One observation of a time series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time: u64,
    pub value: f64,
}

/// Complete, immutable export of the metrics registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, u64>,
    pub gauges: BTreeMap<String, MetricValue>,
    pub time_series: BTreeMap<String, Vec<SeriesPoint>>,
    pub metadata: BTreeMap<String, MetricValue>,
}

impl MetricsSnapshot {
    /// Counter value, 0 when never incremented
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn gauge(&self, name: &str) -> Option<&MetricValue> {
        self.gauges.get(name)
    }

    /// Series points, empty when the series was never recorded
    pub fn series(&self, name: &str) -> &[SeriesPoint] {
        self.time_series
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Values of a series without their timestamps
    pub fn series_values(&self, name: &str) -> Vec<f64> {
        self.series(name).iter().map(|point| point.value).collect()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// SHA-256 of the canonical JSON form of this snapshot
    ///
    /// Two runs with the same seed and agents produce the same fingerprint.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        use serde_json::Value;

        fn canonicalize(value: Value) -> Value {
            match value {
                Value::Object(map) => {
                    let sorted: BTreeMap<String, Value> =
                        map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                    Value::Object(sorted.into_iter().collect())
                }
                Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
                other => other,
            }
        }

        let canonical = canonicalize(serde_json::to_value(self)?);
        let json = serde_json::to_string(&canonical)?;

        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}
