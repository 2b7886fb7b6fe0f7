use super::{CAPTION_SIZE, DARK_BLUE, FONT, SIZE};
use crate::metrics::{self, histogram};
use crate::model::ExperimentKey;
use crate::stats::Description;
use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

const OVERLAY_FONT: &str = "monospace";
const OVERLAY_SIZE: f64 = 14.0;

/// Histogram of all latencies with a `describe()` overlay.
pub fn plot_distribution(latencies: &[f64], key: &ExperimentKey, out: &Path) -> Result<()> {
    let description =
        Description::from_latencies(latencies).context("cannot describe an empty series")?;
    let title = format!("Server Latency distribution for {key}");
    draw_histogram(latencies, &title, &description.lines(), out)
}

/// Histogram of the latencies strictly above the nearest-rank `percentile`.
pub fn plot_tail(latencies: &[f64], percentile: u8, key: &ExperimentKey, out: &Path) -> Result<()> {
    let sorted = metrics::sorted(latencies);
    let threshold = metrics::nearest_rank(&sorted, f64::from(percentile) / 100.0)
        .context("cannot compute a percentile of an empty series")?;
    let tail: Vec<f64> = latencies.iter().copied().filter(|l| *l > threshold).collect();

    let title = format!("Distribution of Latencies above p{percentile}: {threshold}ms. {key}");
    draw_histogram(&tail, &title, &[], out)
}

fn draw_histogram(values: &[f64], title: &str, overlay: &[String], out: &Path) -> Result<()> {
    let bins = histogram(&metrics::sorted(values));

    let (x_min, x_max) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.0, last.1),
        _ => (0.0, 1.0),
    };
    let max_count = bins.iter().map(|(_, _, c)| *c).max().unwrap_or(0).max(1);
    // leave room for the overlay above the tallest bar
    let headroom = if overlay.is_empty() { 1.1 } else { 1.6 };

    let root = BitMapBackend::new(out, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, CAPTION_SIZE))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0f64..max_count as f64 * headroom)?;

    chart
        .configure_mesh()
        .x_desc("Latency")
        .y_desc("Frequency")
        .disable_x_mesh()
        .draw()?;

    chart.draw_series(bins.iter().map(|&(lo, hi, count)| {
        Rectangle::new([(lo, 0.0), (hi, count as f64)], DARK_BLUE.mix(0.7).filled())
    }))?;

    if !overlay.is_empty() {
        let style = TextStyle::from((OVERLAY_FONT, OVERLAY_SIZE).into_font())
            .pos(Pos::new(HPos::Center, VPos::Top));
        let x = SIZE.0 as i32 / 2;
        let line_height = OVERLAY_SIZE as i32 + 2;
        for (i, line) in overlay.iter().enumerate() {
            root.draw(&Text::new(
                line.as_str(),
                (x, 60 + i as i32 * line_height),
                style.clone(),
            ))?;
        }
    }

    root.present()?;
    Ok(())
}
