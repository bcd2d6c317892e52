//! Simulation reports
//!
//! Pure transform from a [`MetricsSnapshot`](crate::metrics::MetricsSnapshot)
//! into an executive summary and derived risk metrics. Reporting is best
//! effort: missing counters read as zero, missing gauges and series as
//! `None`, and nothing here can fail.

pub mod generator;

pub use generator::{ExecutiveSummary, ReportGenerator, RiskMetrics, SimulationReport};
