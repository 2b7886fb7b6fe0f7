//! PNG charts rendered per experiment.

mod histogram;
mod time_series;

use crate::model::{ChartKind, ExperimentKey, LatencySeries};
use anyhow::{Context, Result};
use plotters::style::RGBColor;
use std::path::Path;

pub use histogram::{plot_distribution, plot_tail};
pub use time_series::plot_latency;

/// 10x6 inches at 100 dpi.
const SIZE: (u32, u32) = (1000, 600);
const FONT: &str = "sans-serif";
const CAPTION_SIZE: u32 = 18;

const DARK_BLUE: RGBColor = RGBColor(31, 120, 180);

/// Samples averaged per point of the time series.
pub const ROLLING_WINDOW: usize = 100;

impl ChartKind {
    /// Percentile cut of a tail chart.
    pub fn tail_percentile(self) -> Option<u8> {
        match self {
            ChartKind::P90 => Some(90),
            ChartKind::P99 => Some(99),
            ChartKind::ServerLatency | ChartKind::ServerLatencyDist => None,
        }
    }
}

/// Render all four charts for one experiment into `plots_dir`.
pub fn create_plots(key: &ExperimentKey, series: &LatencySeries, plots_dir: &Path) -> Result<()> {
    let latencies = series.latencies();

    for kind in ChartKind::ALL {
        let path = key.plot_path(plots_dir, kind);
        let rendered = match kind {
            ChartKind::ServerLatency => plot_latency(series, key, &path),
            ChartKind::ServerLatencyDist => plot_distribution(&latencies, key, &path),
            ChartKind::P90 | ChartKind::P99 => {
                let percentile = kind.tail_percentile().unwrap_or(90);
                plot_tail(&latencies, percentile, key, &path)
            }
        };
        rendered.with_context(|| format!("failed to render {}", path.display()))?;
    }

    Ok(())
}
