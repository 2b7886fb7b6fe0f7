use crate::model::{ExperimentKey, ReportConfig};
use crate::orchestrator::{process_experiment, process_group_completion};
use crate::stats::StatsTable;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "latency-report",
    version,
    about = "Statistics, plots and markdown summaries for latency experiment logs"
)]
pub struct Cli {
    /// Results volume; only its last path component names the results directory
    #[arg(long, env = "RESULTS_VOLUME")]
    pub results_volume: String,

    /// Directory containing one subdirectory of CSV logs per results volume
    #[arg(long, default_value = "../results")]
    pub results_root: PathBuf,

    /// Output root for per-experiment and composite plots
    #[arg(long, default_value = "plots")]
    pub plots_root: PathBuf,

    /// Output root for markdown summaries
    #[arg(long, default_value = "markdown")]
    pub markdown_root: PathBuf,

    /// Client counts (comma-separated)
    #[arg(long, value_delimiter = ',', default_values_t = [1000, 3000, 5000, 10000])]
    pub clients: Vec<u32>,

    /// Batch sizes (comma-separated)
    #[arg(long, value_delimiter = ',', default_values_t = [1])]
    pub batch_sizes: Vec<u32>,

    /// Wait between batches in milliseconds (comma-separated)
    #[arg(long, value_delimiter = ',', default_values_t = [1000])]
    pub waits: Vec<u64>,

    /// Number of batches sent by each client
    #[arg(long, default_value_t = 100)]
    pub n_batches: u32,

    /// Also export every statistics table as JSON
    #[arg(long)]
    pub export_json: Option<PathBuf>,
}

/// Last path component of the results volume.
fn results_name(volume: &str) -> Result<String> {
    Path::new(volume)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("cannot derive a results directory name from '{volume}'"))
}

/// Build a `ReportConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> Result<ReportConfig> {
    anyhow::ensure!(!args.clients.is_empty(), "at least one client count is required");
    anyhow::ensure!(!args.batch_sizes.is_empty(), "at least one batch size is required");
    anyhow::ensure!(!args.waits.is_empty(), "at least one wait is required");

    let results_name = results_name(&args.results_volume)?;
    Ok(ReportConfig {
        results_dir: args.results_root.join(&results_name),
        plots_dir: args.plots_root.join(&results_name),
        markdown_dir: args.markdown_root.join(&results_name),
        results_name,
        client_counts: args.clients.clone(),
        batch_sizes: args.batch_sizes.clone(),
        waits_ms: args.waits.clone(),
        n_batches: args.n_batches,
        export_json: args.export_json.clone(),
    })
}

/// Create the plot, composite and markdown directories.
fn prepare_output_dirs(cfg: &ReportConfig) -> Result<()> {
    info!("Creating {}...", cfg.plots_dir.display());
    std::fs::create_dir_all(cfg.aggregate_dir())
        .with_context(|| format!("failed to create {}", cfg.aggregate_dir().display()))?;
    info!("Creating {}...", cfg.markdown_dir.display());
    std::fs::create_dir_all(&cfg.markdown_dir)
        .with_context(|| format!("failed to create {}", cfg.markdown_dir.display()))?;
    Ok(())
}

pub fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args)?;
    debug!(?cfg, "resolved configuration");
    prepare_output_dirs(&cfg)?;

    let mut reports = Vec::new();
    for (group_idx, (batch_size, wait_ms)) in cfg.groups().into_iter().enumerate() {
        let keys: Vec<ExperimentKey> = cfg
            .client_counts
            .iter()
            .map(|&client_count| ExperimentKey {
                client_count,
                batch_size,
                n_batches: cfg.n_batches,
                wait_ms,
            })
            .collect();

        let mut table = StatsTable::new();
        for key in &keys {
            info!(
                "Plotting : {}clients {}batch_size {}wait",
                key.client_count, key.batch_size, key.wait_ms
            );
            if let Some(processed) = process_experiment(&cfg, key)? {
                println!(
                    "{}",
                    crate::text_summary::experiment_line(key, processed.samples, &processed.stats)
                );
                table.insert(key.label(), processed.stats);
            }
        }

        // The first group must produce composites; later groups may be absent.
        if group_idx > 0 && table.is_empty() {
            warn!(
                "No logs for {}batch_size {}wait, skipping aggregation",
                batch_size, wait_ms
            );
            continue;
        }

        let processed = process_group_completion(&cfg, &keys, table)?;
        for path in &processed.composites {
            info!("Saved {}", path.display());
        }
        info!("Saved {}", processed.markdown_path.display());

        let summary = crate::text_summary::build_text_summary(&keys[0], &processed.report.stats);
        for line in summary.lines {
            println!("{line}");
        }
        reports.push(processed.report);
    }

    if let Some(path) = cfg.export_json.as_deref() {
        crate::report::export_json(path, &reports)?;
        info!("Exported JSON: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Cli {
        let mut argv = vec!["latency-report", "--results-volume", "/mnt/volumes/run-42/"];
        argv.extend_from_slice(extra);
        Cli::parse_from(argv)
    }

    /// Arguments rooting every input and output directory under `root`.
    fn parse_in(root: &Path, extra: &[&str]) -> Cli {
        let root = root.to_string_lossy().into_owned();
        let results = format!("{root}/results");
        let plots = format!("{root}/plots");
        let markdown = format!("{root}/markdown");
        let mut argv = vec![
            "--results-root",
            results.as_str(),
            "--plots-root",
            plots.as_str(),
            "--markdown-root",
            markdown.as_str(),
        ];
        argv.extend_from_slice(extra);
        parse(&argv)
    }

    fn write_log(root: &Path, key: &ExperimentKey, rows: usize) {
        let dir = root.join("results/run-42");
        std::fs::create_dir_all(&dir).unwrap();
        let mut csv = String::from(
            "timestamp,client_id,msg_id,server_created_at,client_created_at,client_latency,server_latency\n",
        );
        let start = 1_700_000_000_000i64;
        for i in 0..rows as i64 {
            let created = start + i * 20;
            let latency = 5 + (i * 7) % 40;
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                created + latency,
                i % 10,
                i,
                created + latency,
                created,
                latency + 1,
                latency
            ));
        }
        std::fs::write(key.csv_path(&dir), csv).unwrap();
    }

    fn key(client_count: u32, batch_size: u32) -> ExperimentKey {
        ExperimentKey {
            client_count,
            batch_size,
            n_batches: 100,
            wait_ms: 1000,
        }
    }

    #[test]
    fn defaults_match_experiment_matrix() {
        let args = parse(&[]);
        assert_eq!(args.clients, vec![1000, 3000, 5000, 10000]);
        assert_eq!(args.batch_sizes, vec![1]);
        assert_eq!(args.waits, vec![1000]);
        assert_eq!(args.n_batches, 100);
        assert!(args.export_json.is_none());
    }

    #[test]
    fn config_uses_volume_basename() {
        let cfg = build_config(&parse(&[])).unwrap();
        assert_eq!(cfg.results_name, "run-42");
        assert_eq!(cfg.results_dir, PathBuf::from("../results/run-42"));
        assert_eq!(cfg.plots_dir, PathBuf::from("plots/run-42"));
        assert_eq!(cfg.aggregate_dir(), PathBuf::from("plots/run-42/results_agg"));
        assert_eq!(cfg.markdown_dir, PathBuf::from("markdown/run-42"));
    }

    #[test]
    fn lists_are_comma_delimited() {
        let cfg = build_config(&parse(&["--clients", "10,20", "--batch-sizes", "1,5", "--waits", "0"]))
            .unwrap();
        assert_eq!(cfg.client_counts, vec![10, 20]);
        assert_eq!(cfg.groups(), vec![(1, 0), (5, 0)]);
    }

    #[test]
    fn empty_client_list_is_rejected() {
        let mut args = parse(&[]);
        args.clients.clear();
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn run_without_any_log_fails_at_aggregation() {
        let dir = tempfile::tempdir().unwrap();
        let args = parse_in(dir.path(), &["--clients", "1000,3000"]);

        let err = run(args).unwrap_err();
        assert!(format!("{err:#}").contains("failed to aggregate server_latency plots"));
        assert!(dir.path().join("plots/run-42/results_agg").is_dir());
        assert!(dir.path().join("markdown/run-42").is_dir());
    }

    #[test]
    fn run_reports_present_client_counts() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), &key(1000, 1), 300);
        let json = dir.path().join("stats.json");
        let json_arg = json.to_string_lossy().into_owned();
        let args = parse_in(
            dir.path(),
            &["--clients", "1000,3000", "--export-json", json_arg.as_str()],
        );

        run(args).unwrap();

        let plots = dir.path().join("plots/run-42");
        for kind in crate::model::ChartKind::ALL {
            assert!(key(1000, 1).plot_path(&plots, kind).exists());
            assert!(!key(3000, 1).plot_path(&plots, kind).exists());
            let composite = key(1000, 1).aggregate_path(&plots.join("results_agg"), kind);
            let (w, h) = image::image_dimensions(&composite).unwrap();
            assert_eq!((w, h), (1000, 600));
        }

        let md_path = key(1000, 1).markdown_path(&dir.path().join("markdown/run-42"));
        let table = crate::report::parse_markdown(&std::fs::read_to_string(md_path).unwrap())
            .unwrap();
        assert_eq!(table.labels().collect::<Vec<_>>(), vec!["1000 clients"]);
        let stats = table.get("1000 clients").unwrap();
        assert_eq!(stats.min_latency, 5.0);
        assert_eq!(stats.max_latency, 44.0);

        let exported = std::fs::read_to_string(json).unwrap();
        assert!(exported.contains("1000 clients"));
    }

    #[test]
    fn later_group_without_logs_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), &key(1000, 1), 150);
        let args = parse_in(dir.path(), &["--clients", "1000", "--batch-sizes", "1,5"]);

        run(args).unwrap();

        let agg = dir.path().join("plots/run-42/results_agg");
        let markdown = dir.path().join("markdown/run-42");
        assert!(key(1000, 1).aggregate_path(&agg, crate::model::ChartKind::P90).exists());
        assert!(key(1000, 1).markdown_path(&markdown).exists());
        assert!(!key(1000, 5).aggregate_path(&agg, crate::model::ChartKind::P90).exists());
        assert!(!key(1000, 5).markdown_path(&markdown).exists());
    }
}
