//! The log collector stage.
//!
//! `collect` queries the log store for a look-back window, drains every
//! page, reduces the events to a `ParsedSummary`, and writes one
//! `LogArtifact`. Any failure before the write leaves the blob store
//! untouched, so re-invoking the stage is always safe.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use forensics_contracts::{
    error::{ForensicsError, ForensicsResult},
    logs::{LogArtifact, LogEvent},
    store::PutOptions,
};
use forensics_core::{
    select::{unique_key, write_json},
    traits::{BlobStore, Clock, LogStore},
    PipelineConfig,
};

use crate::{batch::BatchOutcome, metrics::summarize};

/// Collects runtime logs and persists parsed summaries.
pub struct LogCollector {
    logs: Arc<dyn LogStore>,
    store: Arc<dyn BlobStore>,
    config: Arc<PipelineConfig>,
    clock: Arc<dyn Clock>,
}

impl LogCollector {
    pub fn new(
        logs: Arc<dyn LogStore>,
        store: Arc<dyn BlobStore>,
        config: Arc<PipelineConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            logs,
            store,
            config,
            clock,
        }
    }

    /// Collect the last `window_minutes` of logs for `function_name` and
    /// return the key of the written artifact.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a zero window; `UpstreamUnavailable` if any page
    /// query or the final write fails. Nothing is written on error.
    pub fn collect(&self, function_name: &str, window_minutes: u32) -> ForensicsResult<String> {
        let result = self.try_collect(function_name, window_minutes);
        if let Err(e) = &result {
            warn!(function = %function_name, error = %e, "log collection failed");
        }
        result
    }

    /// Run `collect` for each target with the configured default window.
    pub fn collect_all(&self, functions: &[String]) -> BatchOutcome {
        self.collect_all_with_window(functions, self.config.window_minutes)
    }

    pub fn collect_all_with_window(&self, functions: &[String], window_minutes: u32) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for function_name in functions {
            outcome.record(function_name, self.collect(function_name, window_minutes));
        }
        outcome
    }

    fn try_collect(&self, function_name: &str, window_minutes: u32) -> ForensicsResult<String> {
        if window_minutes == 0 {
            return Err(ForensicsError::InvalidInput {
                reason: "window_minutes must be greater than zero".to_string(),
            });
        }

        let now = self.clock.now();
        let end_ms = now.timestamp_millis();
        let start_ms = (now - Duration::minutes(i64::from(window_minutes))).timestamp_millis();
        let log_group = self.config.log_group(function_name);

        info!(
            function = %function_name,
            log_group = %log_group,
            window_minutes,
            "collecting logs"
        );

        let events = self.fetch_all(&log_group, start_ms, end_ms)?;
        let summary = summarize(&events);

        let artifact = LogArtifact {
            function_name: function_name.to_string(),
            timestamp: now.timestamp(),
            parsed_summary: summary,
            raw_event_count: events.len() as u64,
        };

        let key = unique_key(
            self.store.as_ref(),
            &self.config.namespaces.log_key(function_name, artifact.timestamp),
        )?;
        write_json(self.store.as_ref(), &key, &artifact, PutOptions::default())?;

        info!(
            function = %function_name,
            key = %key,
            bucket = %self.config.bucket,
            event_count = artifact.raw_event_count,
            error_count = artifact.parsed_summary.error_count,
            "log artifact saved"
        );
        Ok(key)
    }

    /// Drain every page of the query.
    fn fetch_all(&self, log_group: &str, start_ms: i64, end_ms: i64) -> ForensicsResult<Vec<LogEvent>> {
        let mut events = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.logs.query(log_group, start_ms, end_ms, token.as_deref())?;
            pages += 1;
            events.extend(page.events);
            match page.next_token {
                Some(next) if token.as_deref() == Some(next.as_str()) => {
                    return Err(ForensicsError::upstream(
                        "log store",
                        format!("pagination token '{}' repeated", next),
                    ));
                }
                Some(next) => token = Some(next),
                None => break,
            }
        }

        debug!(log_group = %log_group, pages, event_count = events.len(), "log query drained");
        Ok(events)
    }
}
