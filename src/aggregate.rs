//! Side-by-side composites of the same chart across client counts.

use crate::model::{ChartKind, ExperimentKey};
use anyhow::{Context, Result};
use image::{imageops, RgbImage};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Existing plot paths for `kind`, one per client count, in the given order.
/// Missing plots are skipped without notice.
pub fn collect_plots(keys: &[ExperimentKey], kind: ChartKind, plots_dir: &Path) -> Vec<PathBuf> {
    keys.iter()
        .map(|key| key.plot_path(plots_dir, kind))
        .filter(|path| {
            let found = path.exists();
            if found {
                debug!("Found {}", path.display());
            }
            found
        })
        .collect()
}

/// Paste images left to right onto a black canvas of total width x max height.
pub fn concat_horizontal(paths: &[PathBuf]) -> Result<RgbImage> {
    let images = paths
        .iter()
        .map(|p| {
            image::open(p)
                .map(|img| img.to_rgb8())
                .with_context(|| format!("failed to open {}", p.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    anyhow::ensure!(!images.is_empty(), "no images to concatenate");

    let total_width: u32 = images.iter().map(|i| i.width()).sum();
    let max_height = images.iter().map(|i| i.height()).max().unwrap_or(0);

    let mut canvas = RgbImage::new(total_width, max_height);
    let mut x_offset = 0i64;
    for img in &images {
        imageops::replace(&mut canvas, img, x_offset, 0);
        x_offset += i64::from(img.width());
    }
    Ok(canvas)
}

/// Build one composite per chart kind under `agg_dir`, named after the
/// (batch size, wait) group the keys share.
pub fn concat_plots(keys: &[ExperimentKey], plots_dir: &Path, agg_dir: &Path) -> Result<Vec<PathBuf>> {
    let group = keys.first().context("no experiments to aggregate")?;
    let mut written = Vec::with_capacity(ChartKind::ALL.len());
    for kind in ChartKind::ALL {
        let paths = collect_plots(keys, kind, plots_dir);
        let composite = concat_horizontal(&paths)
            .with_context(|| format!("failed to aggregate {} plots", kind.prefix()))?;

        let out = group.aggregate_path(agg_dir, kind);
        composite
            .save(&out)
            .with_context(|| format!("failed to save {}", out.display()))?;
        written.push(out);
    }
    Ok(written)
}
