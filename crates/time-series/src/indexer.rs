//! Timestamp Indexing

use crate::table::TimeSeriesTable;
use chrono::{DateTime, NaiveDateTime};
use tracing::{debug, info, warn};

/// Re-keys a table by its timestamp column.
///
/// If the table carries no timestamp column, or any entry fails to parse,
/// the table falls back to a positional index (row number at 1000 ms
/// spacing). Downstream "w seconds" windows then degrade to "w rows";
/// lookback semantics are lost but nothing fails.
#[derive(Debug, Clone, Default)]
pub struct TimeIndexer;

impl TimeIndexer {
    pub fn new() -> Self {
        Self
    }

    /// Parse, sort, and install the table's millisecond index
    pub fn index(&self, table: &mut TimeSeriesTable) {
        let parsed = match table.time_column() {
            Some(raw) => parse_all(raw),
            None => {
                warn!("no timestamp column; falling back to positional index");
                None
            }
        };
        let Some(parsed) = parsed else {
            self.install_positional(table);
            return;
        };

        // Stable sort keeps duplicate timestamps in arrival order.
        let mut perm: Vec<usize> = (0..parsed.len()).collect();
        perm.sort_by_key(|&i| parsed[i]);
        let sorted: Vec<i64> = perm.iter().map(|&i| parsed[i]).collect();

        let already_ordered = perm.iter().enumerate().all(|(k, &i)| k == i);
        if !already_ordered {
            debug!("reordering {} rows by timestamp", perm.len());
            table.reorder_rows(&perm);
        }
        table.set_index(sorted, true);
        info!(rows = table.len(), "table re-keyed by timestamp");
    }

    fn install_positional(&self, table: &mut TimeSeriesTable) {
        let index: Vec<i64> = (0..table.len() as i64).map(|i| i * 1000).collect();
        table.set_index(index, false);
    }
}

/// Parse every entry, or `None` if any entry is unusable
fn parse_all(raw: &[String]) -> Option<Vec<i64>> {
    let mut parsed = Vec::with_capacity(raw.len());
    for entry in raw {
        match parse_timestamp_ms(entry) {
            Some(ms) => parsed.push(ms),
            None => {
                warn!(entry = %entry, "unparseable timestamp; falling back to positional index");
                return None;
            }
        }
    }
    Some(parsed)
}

/// Parse one timestamp entry to epoch milliseconds.
///
/// Accepts RFC 3339 (the gateway's native format) and a bare
/// `YYYY-MM-DD HH:MM:SS[.fff]` form treated as UTC.
fn parse_timestamp_ms(entry: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(entry) {
        return Some(dt.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(entry, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}
