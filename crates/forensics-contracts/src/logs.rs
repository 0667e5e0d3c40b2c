//! Log-store events and the parsed-summary artifact derived from them.
//!
//! `LogEvent` is ephemeral: events are aggregated into a `ParsedSummary` and
//! never persisted one by one. `LogArtifact` is what the collector writes to
//! the blob store; artifacts accumulate per function and are never mutated.

use serde::{Deserialize, Serialize};

/// One event returned by the log store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Event time in epoch milliseconds.
    pub timestamp: i64,
    /// The raw log line.
    pub message: String,
}

impl LogEvent {
    pub fn new(timestamp: i64, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }
}

/// A single page of a paginated log-store query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogPage {
    /// Events on this page, in store order.
    pub events: Vec<LogEvent>,
    /// Opaque continuation token. `None` means this was the last page.
    pub next_token: Option<String>,
}

/// Basic metrics extracted from one batch of log events.
///
/// Missing fields decode to their zero value so artifacts written by older
/// collectors remain readable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedSummary {
    /// Events containing at least one error marker.
    #[serde(default)]
    pub error_count: u64,
    /// Mean of the parsed durations, rounded to 2 decimal places.
    /// `None` when no duration could be parsed.
    #[serde(default)]
    pub avg_duration_ms: Option<f64>,
    /// Number of events in the queried window.
    #[serde(default)]
    pub total_invocations: u64,
}

/// The persisted output of one collector run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogArtifact {
    /// The target function the events were queried for.
    pub function_name: String,
    /// Creation time in epoch seconds.
    pub timestamp: i64,
    /// Metrics extracted from the batch.
    #[serde(default)]
    pub parsed_summary: ParsedSummary,
    /// Number of raw events fetched across all pages.
    #[serde(default)]
    pub raw_event_count: u64,
}
