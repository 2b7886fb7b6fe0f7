//! Markdown and JSON serialization of statistics tables.

use crate::model::ExperimentKey;
use crate::stats::{LatencyStats, StatsTable};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// One (batch size, wait) group of experiments and its statistics.
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub batch_size: u32,
    pub n_batches: u32,
    pub wait_ms: u64,
    pub stats: StatsTable,
}

impl GroupReport {
    pub fn new(key: &ExperimentKey, stats: StatsTable) -> Self {
        Self {
            batch_size: key.batch_size,
            n_batches: key.n_batches,
            wait_ms: key.wait_ms,
            stats,
        }
    }
}

/// Integral values print without a fractional part.
fn format_value(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Render a pipe table: one column per experiment label, one row per
/// statistic. The first column is left aligned, the rest right aligned.
pub fn render_markdown(table: &StatsTable) -> String {
    let mut header = vec![String::new()];
    header.extend(table.labels().map(str::to_string));

    let rows: Vec<Vec<String>> = LatencyStats::FIELDS
        .iter()
        .map(|field| {
            let mut row = vec![field.to_string()];
            row.extend(
                table
                    .iter()
                    .map(|(_, s)| s.get(field).map(format_value).unwrap_or_default()),
            );
            row
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            rows.iter()
                .map(|r| r[col].len())
                .chain(std::iter::once(header[col].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render_row = |cells: &[String]| {
        let cells: Vec<String> = cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(col, (cell, &w))| {
                if col == 0 {
                    format!(" {cell:<w$} ")
                } else {
                    format!(" {cell:>w$} ")
                }
            })
            .collect();
        format!("|{}|", cells.join("|"))
    };

    let separator: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(col, &w)| {
            if col == 0 {
                format!(":{}", "-".repeat(w + 1))
            } else {
                format!("{}:", "-".repeat(w + 1))
            }
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render_row(&header));
    lines.push(format!("|{}|", separator.join("|")));
    lines.extend(rows.iter().map(|r| render_row(r)));
    lines.join("\n")
}

fn split_row(line: &str) -> Vec<&str> {
    let inner = line.trim().trim_start_matches('|').trim_end_matches('|');
    inner.split('|').map(str::trim).collect()
}

/// Parse a table produced by [`render_markdown`].
pub fn parse_markdown(text: &str) -> Result<StatsTable> {
    let mut lines = text.lines().map(str::trim).filter(|l| l.starts_with('|'));

    let header = lines.next().context("missing table header")?;
    let labels: Vec<&str> = split_row(header).into_iter().skip(1).collect();
    lines.next().context("missing table separator")?;

    let mut columns: Vec<Vec<(&str, f64)>> = vec![Vec::new(); labels.len()];
    for line in lines {
        let cells = split_row(line);
        let (&field, values) = cells.split_first().context("empty table row")?;
        anyhow::ensure!(
            values.len() == labels.len(),
            "row '{field}' has {} values, expected {}",
            values.len(),
            labels.len()
        );
        for (column, value) in columns.iter_mut().zip(values) {
            let value: f64 = value
                .parse()
                .with_context(|| format!("invalid value '{value}' for {field}"))?;
            column.push((field, value));
        }
    }

    let mut table = StatsTable::new();
    for (label, fields) in labels.into_iter().zip(columns) {
        let stats = LatencyStats::from_fields(fields)
            .with_context(|| format!("incomplete statistics for '{label}'"))?;
        table.insert(label, stats);
    }
    Ok(table)
}

pub fn write_markdown(path: &Path, table: &StatsTable) -> Result<()> {
    std::fs::write(path, render_markdown(table))
        .with_context(|| format!("failed to write {}", path.display()))
}

pub fn export_json(path: &Path, reports: &[GroupReport]) -> Result<()> {
    let json = serde_json::to_string_pretty(reports).context("serialize statistics")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
