//! Text summary builder for console output.
//!
//! Formats human-readable lines from computed statistics.

use crate::model::ExperimentKey;
use crate::stats::{LatencyStats, StatsTable};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

fn stats_line(stats: &LatencyStats) -> String {
    format!(
        "avg {} med {:.1} p90 {:.1} p99 {:.1} min {:.1} max {:.1} ms",
        stats.mean_latency,
        stats.p50_latency,
        stats.p90_latency,
        stats.p99_latency,
        stats.min_latency,
        stats.max_latency
    )
}

/// Summary of a single experiment.
pub(crate) fn experiment_line(key: &ExperimentKey, samples: usize, stats: &LatencyStats) -> String {
    format!("{key} ({samples} samples): {}", stats_line(stats))
}

/// Summary of a whole (batch size, wait) group.
pub(crate) fn build_text_summary(key: &ExperimentKey, table: &StatsTable) -> TextSummary {
    let mut lines = vec![format!(
        "== batch_size {} / {} batches / {}ms wait ==",
        key.batch_size, key.n_batches, key.wait_ms
    )];
    if table.is_empty() {
        lines.push("No experiments found".to_string());
    }
    for (label, stats) in table.iter() {
        lines.push(format!("{label:>14}: {}", stats_line(stats)));
    }
    TextSummary { lines }
}
