use super::{CAPTION_SIZE, DARK_BLUE, FONT, ROLLING_WINDOW, SIZE};
use crate::metrics::rolling_mean;
use crate::model::{ExperimentKey, LatencySeries};
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

/// Rolling-average latency over wall-clock time.
pub fn plot_latency(series: &LatencySeries, key: &ExperimentKey, out: &Path) -> Result<()> {
    let latencies = series.latencies();
    let timestamps = series.timestamps();
    let start = timestamps.first().copied();

    // (seconds since first sample, rolling mean)
    let points: Vec<(f64, f64)> = match start {
        Some(start) => timestamps
            .iter()
            .zip(rolling_mean(&latencies, ROLLING_WINDOW))
            .filter_map(|(ts, avg)| avg.map(|avg| ((*ts - start).as_seconds_f64(), avg)))
            .collect(),
        None => Vec::new(),
    };

    let (x_min, x_max) = span(points.iter().map(|(x, _)| *x));
    let (y_min, y_max) = span(points.iter().map(|(_, y)| *y));

    let root = BitMapBackend::new(out, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let title = format!(
        "Server Latency Over Time ({ROLLING_WINDOW}-rolling avg). {key}"
    );
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, CAPTION_SIZE))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    let label_time = |x: &f64| match start {
        Some(start) => (start + time::Duration::seconds_f64(*x))
            .format(TIME_FORMAT)
            .unwrap_or_default(),
        None => String::new(),
    };
    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Latency")
        .x_labels(8)
        .x_label_formatter(&label_time)
        .draw()?;

    chart.draw_series(LineSeries::new(points, DARK_BLUE.stroke_width(2)))?;

    root.present()?;
    Ok(())
}

/// Axis range covering `values`, widened when empty or degenerate.
fn span(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if hi - lo <= f64::EPSILON {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}
