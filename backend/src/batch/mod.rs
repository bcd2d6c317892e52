//! Batch runner
//!
//! Runs independent scenarios on a `rayon` worker pool. Each batch keeps its
//! own single-threaded, deterministic timeline; only whole runs execute in
//! parallel.
//!
//! # Critical Invariants
//!
//! 1. **Ordered results**: reports come back in input order, whatever the
//!    completion order on the pool
//! 2. **Single writer**: per-batch snapshots are merged into the aggregate
//!    registry one at a time, on the calling thread, in input order
//!
//! There is no cancellation; callers bound batch sizes and durations.

use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use crate::orchestrator::SimulationError;
use crate::reports::SimulationReport;
use crate::scenarios::ScenarioConfig;
use rayon::prelude::*;
use tracing::info;

/// Reports of every batch plus their merged metrics
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub reports: Vec<SimulationReport>,
    pub aggregate: MetricsRegistry,
}

impl BatchOutcome {
    pub fn aggregate_snapshot(&self) -> MetricsSnapshot {
        self.aggregate.snapshot()
    }

    /// Metrics fingerprint of each batch, in input order
    pub fn fingerprints(&self) -> Result<Vec<String>, serde_json::Error> {
        self.reports
            .iter()
            .map(|report| report.raw_metrics.fingerprint())
            .collect()
    }
}

/// One copy of `base` per seed
pub fn seeded_batches(base: &ScenarioConfig, seeds: &[u64]) -> Vec<ScenarioConfig> {
    seeds
        .iter()
        .map(|seed| base.clone().with_seed(*seed))
        .collect()
}

/// Run every scenario on a worker pool and merge the results
///
/// `threads` sizes a dedicated pool; `None` uses rayon's global pool. The
/// first failing batch, in input order, fails the whole call.
pub fn run_batches(
    configs: &[ScenarioConfig],
    threads: Option<usize>,
) -> Result<BatchOutcome, SimulationError> {
    info!(batches = configs.len(), threads = ?threads, "batch run started");

    let results: Vec<Result<SimulationReport, SimulationError>> = match threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads.max(1))
                .build()
                .map_err(|e| SimulationError::WorkerPool(e.to_string()))?;
            pool.install(|| configs.par_iter().map(ScenarioConfig::run).collect())
        }
        None => configs.par_iter().map(ScenarioConfig::run).collect(),
    };

    let mut aggregate = MetricsRegistry::new();
    let mut reports = Vec::with_capacity(results.len());
    for result in results {
        let report = result?;
        aggregate.merge(&report.raw_metrics);
        reports.push(report);
    }

    info!(batches = reports.len(), "batch run finished");
    Ok(BatchOutcome { reports, aggregate })
}
