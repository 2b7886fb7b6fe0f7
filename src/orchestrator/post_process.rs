//! Post-group processing.
//!
//! Builds the composite images and writes the markdown summary once every
//! experiment of a (batch size, wait) group has been processed.

use crate::aggregate;
use crate::model::{ExperimentKey, ReportConfig};
use crate::report::{self, GroupReport};
use crate::stats::StatsTable;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

/// Result of post-group processing, ready for presentation layers.
pub(crate) struct ProcessedGroup {
    pub report: GroupReport,
    pub composites: Vec<PathBuf>,
    pub markdown_path: PathBuf,
}

/// Aggregate the group's plots across client counts and write its summary.
pub(crate) fn process_group_completion(
    cfg: &ReportConfig,
    keys: &[ExperimentKey],
    table: StatsTable,
) -> Result<ProcessedGroup> {
    let first = keys.first().context("no client counts configured")?;

    info!("Aggregating results...");
    let composites = aggregate::concat_plots(keys, &cfg.plots_dir, &cfg.aggregate_dir())?;

    info!(
        "Generating latency summary statistics for nclients : {:?}",
        cfg.client_counts
    );
    let markdown_path = first.markdown_path(&cfg.markdown_dir);
    report::write_markdown(&markdown_path, &table)?;

    Ok(ProcessedGroup {
        report: GroupReport::new(first, table),
        composites,
        markdown_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChartKind;
    use crate::stats::LatencyStats;
    use image::{Rgb, RgbImage};

    #[test]
    fn writes_composites_and_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ReportConfig {
            results_name: "run1".into(),
            client_counts: vec![1000, 3000],
            batch_sizes: vec![1],
            waits_ms: vec![1000],
            n_batches: 100,
            results_dir: dir.path().join("results"),
            plots_dir: dir.path().join("plots"),
            markdown_dir: dir.path().join("markdown"),
            export_json: None,
        };
        std::fs::create_dir_all(cfg.aggregate_dir()).unwrap();
        std::fs::create_dir_all(&cfg.markdown_dir).unwrap();

        let keys: Vec<ExperimentKey> = cfg
            .client_counts
            .iter()
            .map(|&client_count| ExperimentKey {
                client_count,
                batch_size: 1,
                n_batches: 100,
                wait_ms: 1000,
            })
            .collect();
        // only the first client count produced plots
        for kind in ChartKind::ALL {
            RgbImage::from_pixel(5, 4, Rgb([1, 2, 3]))
                .save(keys[0].plot_path(&cfg.plots_dir, kind))
                .unwrap();
        }

        let mut table = StatsTable::new();
        table.insert(
            keys[0].label(),
            LatencyStats::from_latencies(&[10.0, 20.0]).unwrap(),
        );

        let processed = process_group_completion(&cfg, &keys, table.clone()).unwrap();
        assert_eq!(processed.composites.len(), 4);
        assert!(processed.composites.iter().all(|p| p.exists()));
        assert_eq!(
            processed.markdown_path,
            cfg.markdown_dir.join("latency_nclients_b1_n100_w1000.md")
        );

        let written = std::fs::read_to_string(&processed.markdown_path).unwrap();
        assert_eq!(report::parse_markdown(&written).unwrap(), table);
        assert_eq!(processed.report.stats, table);
    }
}
