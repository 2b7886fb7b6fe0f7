use std::fmt;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// Resolved configuration for a report run.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Name of the results directory (last component of `RESULTS_VOLUME`).
    pub results_name: String,
    pub client_counts: Vec<u32>,
    pub batch_sizes: Vec<u32>,
    pub waits_ms: Vec<u64>,
    pub n_batches: u32,
    /// Directory holding the experiment CSVs (`<results_root>/<results_name>`).
    pub results_dir: PathBuf,
    /// Directory receiving the per-experiment PNGs.
    pub plots_dir: PathBuf,
    /// Directory receiving the markdown summaries.
    pub markdown_dir: PathBuf,
    pub export_json: Option<PathBuf>,
}

impl ReportConfig {
    /// Directory receiving the composite images.
    pub fn aggregate_dir(&self) -> PathBuf {
        self.plots_dir.join("results_agg")
    }

    /// All (batch size, wait) pairs, in configuration order.
    pub fn groups(&self) -> Vec<(u32, u64)> {
        self.batch_sizes
            .iter()
            .flat_map(|&b| self.waits_ms.iter().map(move |&w| (b, w)))
            .collect()
    }
}

/// Identifies one latency CSV and everything derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExperimentKey {
    pub client_count: u32,
    pub batch_size: u32,
    pub n_batches: u32,
    pub wait_ms: u64,
}

impl ExperimentKey {
    /// `c<N>_b<B>_n<T>_w<W>` suffix shared by inputs and plots.
    fn suffix(&self) -> String {
        format!("c{}_{}", self.client_count, self.group_suffix())
    }

    /// `b<B>_n<T>_w<W>`, identical for every client count of a group.
    fn group_suffix(&self) -> String {
        format!("b{}_n{}_w{}", self.batch_size, self.n_batches, self.wait_ms)
    }

    /// Label used as the statistics column name.
    pub fn label(&self) -> String {
        format!("{} clients", self.client_count)
    }

    pub fn csv_path(&self, results_dir: &Path) -> PathBuf {
        results_dir.join(format!("result_{}.csv", self.suffix()))
    }

    pub fn plot_path(&self, plots_dir: &Path, kind: ChartKind) -> PathBuf {
        plots_dir.join(format!("{}_{}.png", kind.prefix(), self.suffix()))
    }

    /// Composite of `kind` across client counts for this key's group.
    pub fn aggregate_path(&self, agg_dir: &Path, kind: ChartKind) -> PathBuf {
        agg_dir.join(format!("{}_nclients_{}.jpg", kind.prefix(), self.group_suffix()))
    }

    /// Path of the markdown summary for this key's (batch size, wait) group.
    pub fn markdown_path(&self, markdown_dir: &Path) -> PathBuf {
        markdown_dir.join(format!("latency_nclients_{}.md", self.group_suffix()))
    }
}

impl fmt::Display for ExperimentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} client, {} batch_size, {} batches, {}ms wait",
            self.client_count, self.batch_size, self.n_batches, self.wait_ms
        )
    }
}

/// The four charts rendered per experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    ServerLatency,
    P99,
    P90,
    ServerLatencyDist,
}

impl ChartKind {
    /// Aggregation order.
    pub const ALL: [ChartKind; 4] = [
        ChartKind::ServerLatency,
        ChartKind::P99,
        ChartKind::P90,
        ChartKind::ServerLatencyDist,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            ChartKind::ServerLatency => "server_latency",
            ChartKind::P99 => "p99",
            ChartKind::P90 => "p90",
            ChartKind::ServerLatencyDist => "server_latency_dist",
        }
    }
}

/// One row of a latency log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySample {
    pub timestamp: OffsetDateTime,
    pub client_created_at: OffsetDateTime,
    /// Server latency in milliseconds.
    pub latency: f64,
}

/// Latency samples of one experiment, in file order.
#[derive(Debug, Clone, Default)]
pub struct LatencySeries {
    pub samples: Vec<LatencySample>,
}

impl LatencySeries {
    pub fn new(samples: Vec<LatencySample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latencies(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.latency).collect()
    }

    pub fn timestamps(&self) -> Vec<OffsetDateTime> {
        self.samples.iter().map(|s| s.timestamp).collect()
    }
}
