//! Per-experiment latency statistics and the table they accumulate into.

use crate::metrics;
use anyhow::{Context, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Summary values reported for one experiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    pub mean_latency: i64,
    pub max_latency: f64,
    pub min_latency: f64,
    pub p50_latency: f64,
    pub p90_latency: f64,
    pub p99_latency: f64,
}

impl LatencyStats {
    /// Row names, in report order.
    pub const FIELDS: [&'static str; 6] = [
        "mean_latency",
        "max_latency",
        "min_latency",
        "p50_latency",
        "p90_latency",
        "p99_latency",
    ];

    pub fn from_latencies(latencies: &[f64]) -> Result<Self> {
        let sorted = metrics::sorted(latencies);
        let mean = metrics::mean(&sorted).context("cannot compute statistics of an empty series")?;
        let p50 = metrics::median(&sorted).context("cannot compute median")?;
        let p90 = metrics::nearest_rank(&sorted, 0.90).context("cannot compute p90")?;
        let p99 = metrics::nearest_rank(&sorted, 0.99).context("cannot compute p99")?;

        Ok(Self {
            mean_latency: mean.trunc() as i64,
            max_latency: sorted[sorted.len() - 1],
            min_latency: sorted[0],
            p50_latency: p50,
            p90_latency: p90,
            p99_latency: p99,
        })
    }

    /// Value of the named field; `None` for unknown names.
    pub fn get(&self, field: &str) -> Option<f64> {
        match field {
            "mean_latency" => Some(self.mean_latency as f64),
            "max_latency" => Some(self.max_latency),
            "min_latency" => Some(self.min_latency),
            "p50_latency" => Some(self.p50_latency),
            "p90_latency" => Some(self.p90_latency),
            "p99_latency" => Some(self.p99_latency),
            _ => None,
        }
    }

    /// Rebuild from `(field, value)` pairs; every field must be present.
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, f64)>) -> Result<Self> {
        let mut values = [None; 6];
        for (name, value) in fields {
            let idx = Self::FIELDS
                .iter()
                .position(|f| *f == name)
                .with_context(|| format!("unknown statistic '{name}'"))?;
            values[idx] = Some(value);
        }
        let value = |idx: usize| {
            values[idx].with_context(|| format!("missing statistic '{}'", Self::FIELDS[idx]))
        };
        Ok(Self {
            mean_latency: value(0)?.trunc() as i64,
            max_latency: value(1)?,
            min_latency: value(2)?,
            p50_latency: value(3)?,
            p90_latency: value(4)?,
            p99_latency: value(5)?,
        })
    }
}

/// Statistics keyed by experiment label, kept in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsTable {
    entries: Vec<(String, LatencyStats)>,
}

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the stats for `label`.
    pub fn insert(&mut self, label: impl Into<String>, stats: LatencyStats) {
        let label = label.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = stats,
            None => self.entries.push((label, stats)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&LatencyStats> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, s)| s)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LatencyStats)> {
        self.entries.iter().map(|(l, s)| (l.as_str(), s))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Serialized as a JSON object in insertion order.
impl Serialize for StatsTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, stats) in &self.entries {
            map.serialize_entry(label, stats)?;
        }
        map.end()
    }
}

/// pandas-style `describe()` of a latency series, used as a plot overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Description {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl Description {
    pub fn from_latencies(latencies: &[f64]) -> Option<Self> {
        let sorted = metrics::sorted(latencies);
        Some(Self {
            count: sorted.len(),
            mean: metrics::mean(&sorted)?,
            std: metrics::sample_std(&sorted).unwrap_or(f64::NAN),
            min: *sorted.first()?,
            q25: metrics::linear_quantile(&sorted, 0.25)?,
            q50: metrics::linear_quantile(&sorted, 0.50)?,
            q75: metrics::linear_quantile(&sorted, 0.75)?,
            max: *sorted.last()?,
        })
    }

    pub fn lines(&self) -> Vec<String> {
        let rows = [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.q50),
            ("75%", self.q75),
            ("max", self.max),
        ];
        let values: Vec<String> = rows.iter().map(|(_, v)| format!("{v:.6}")).collect();
        let width = values.iter().map(String::len).max().unwrap_or(0);
        rows.iter()
            .zip(values)
            .map(|((name, _), value)| format!("{name:<5}    {value:>width$}"))
            .collect()
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}
