//! Latency log loading.

use crate::model::{LatencySample, LatencySeries};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use time::OffsetDateTime;
use tracing::warn;

/// Columns we use from a latency log. Other columns are ignored.
#[derive(Debug, Deserialize)]
struct LatencyRow {
    timestamp: i64,
    client_created_at: i64,
    server_latency: f64,
}

/// Convert epoch milliseconds to a UTC datetime.
pub fn datetime_from_millis(ms: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000)
        .with_context(|| format!("timestamp {ms}ms is out of range"))
}

/// Load a latency log.
///
/// Returns `Ok(None)` when the file does not exist; the caller skips the
/// experiment.
pub fn load_series(path: &Path) -> Result<Option<LatencySeries>> {
    if !path.exists() {
        warn!("{} experiment doesnt exist", path.display());
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut samples = Vec::new();
    for (idx, row) in reader.deserialize::<LatencyRow>().enumerate() {
        let row = row.with_context(|| format!("malformed row {} in {}", idx + 1, path.display()))?;
        samples.push(LatencySample {
            timestamp: datetime_from_millis(row.timestamp)?,
            client_created_at: datetime_from_millis(row.client_created_at)?,
            latency: row.server_latency,
        });
    }

    Ok(Some(LatencySeries::new(samples)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "timestamp,client_id,msg_id,server_created_at,client_created_at,client_latency,server_latency\n";

    fn write_csv(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("result_c1000_b1_n100_w1000.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let series = load_series(&dir.path().join("nope.csv")).unwrap();
        assert!(series.is_none());
    }

    #[test]
    fn loads_rows_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "1700000000500,1,0,1700000000400,1700000000300,200,20\n\
             1700000000100,2,0,1700000000050,1700000000000,100,10\n",
        );

        let series = load_series(&path).unwrap().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.latencies(), vec![20.0, 10.0]);

        let first = series.samples[0];
        assert_eq!(first.timestamp.unix_timestamp(), 1_700_000_000);
        assert_eq!(first.timestamp.millisecond(), 500);
        assert_eq!(first.client_created_at.millisecond(), 300);
    }

    #[test]
    fn header_only_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "");
        assert!(load_series(&path).unwrap().unwrap().is_empty());
    }

    #[test]
    fn malformed_row_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "1700000000500,1,0,1,2,3,not-a-number\n");
        let err = load_series(&path).unwrap_err();
        assert!(format!("{err:#}").contains("malformed row 1"));
    }
}
