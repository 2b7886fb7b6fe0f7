//! Per-experiment processing.

use crate::model::{ExperimentKey, ReportConfig};
use crate::plots;
use crate::reader;
use crate::stats::LatencyStats;
use anyhow::{Context, Result};
use tracing::debug;

/// Outcome of one experiment whose log was found.
pub(crate) struct ProcessedExperiment {
    pub samples: usize,
    pub stats: LatencyStats,
}

/// Load the log for `key`, compute its statistics and render its plots.
///
/// Returns `Ok(None)` when the log does not exist.
pub(crate) fn process_experiment(
    cfg: &ReportConfig,
    key: &ExperimentKey,
) -> Result<Option<ProcessedExperiment>> {
    let csv_path = key.csv_path(&cfg.results_dir);
    let Some(series) = reader::load_series(&csv_path)? else {
        return Ok(None);
    };

    let stats = LatencyStats::from_latencies(&series.latencies())
        .with_context(|| format!("no latency samples in {}", csv_path.display()))?;

    if let (Some(first), Some(last)) = (series.samples.first(), series.samples.last()) {
        debug!(
            "{} samples from {} spanning {:.1}s",
            series.len(),
            csv_path.display(),
            (last.timestamp - first.client_created_at).as_seconds_f64()
        );
    }

    plots::create_plots(key, &series, &cfg.plots_dir)?;

    Ok(Some(ProcessedExperiment {
        samples: series.len(),
        stats,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config(root: &Path) -> ReportConfig {
        ReportConfig {
            results_name: "run1".into(),
            client_counts: vec![1000],
            batch_sizes: vec![1],
            waits_ms: vec![1000],
            n_batches: 100,
            results_dir: root.join("results"),
            plots_dir: root.join("plots"),
            markdown_dir: root.join("markdown"),
            export_json: None,
        }
    }

    fn key() -> ExperimentKey {
        ExperimentKey {
            client_count: 1000,
            batch_size: 1,
            n_batches: 100,
            wait_ms: 1000,
        }
    }

    #[test]
    fn missing_log_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(process_experiment(&config(dir.path()), &key()).unwrap().is_none());
    }

    #[test]
    fn empty_log_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        std::fs::create_dir_all(&cfg.results_dir).unwrap();
        std::fs::write(
            key().csv_path(&cfg.results_dir),
            "timestamp,client_created_at,server_latency\n",
        )
        .unwrap();

        let err = process_experiment(&cfg, &key()).err().unwrap();
        assert!(format!("{err:#}").contains("no latency samples"));
    }
}
