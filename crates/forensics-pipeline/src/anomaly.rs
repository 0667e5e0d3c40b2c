//! The anomaly evaluator stage.
//!
//! Evaluation is a pure function of a `ParsedSummary` and the configured
//! thresholds. Each rule fires when its metric is strictly greater than the
//! threshold, and rules are checked in a fixed order:
//!
//! | Metric              | Default | Reason                                |
//! |---------------------|---------|---------------------------------------|
//! | `error_count`       | 0       | Error count exceeded threshold        |
//! | `avg_duration_ms`   | 12      | Execution duration spike detected     |
//! | `total_invocations` | 50      | High invocation frequency detected    |
//!
//! An absent average duration is treated as 0.

use chrono::{DateTime, Utc};
use tracing::info;

use forensics_contracts::{
    anomaly::{AnomalyReason, AnomalyVerdict},
    error::ForensicsResult,
    logs::{LogArtifact, ParsedSummary},
    store::SelectionScope,
};
use forensics_core::{keys::scoped_prefix, select::read_latest, traits::BlobStore, Thresholds};

/// Applies threshold rules to log summaries.
#[derive(Debug, Clone)]
pub struct AnomalyEvaluator {
    thresholds: Thresholds,
}

impl AnomalyEvaluator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// The rules `summary` trips, in evaluation order.
    pub fn evaluate(&self, summary: &ParsedSummary) -> Vec<AnomalyReason> {
        let mut reasons = Vec::new();

        if summary.error_count > self.thresholds.error_count {
            reasons.push(AnomalyReason::ErrorCount);
        }
        if summary.avg_duration_ms.unwrap_or(0.0) > self.thresholds.avg_duration_ms {
            reasons.push(AnomalyReason::DurationSpike);
        }
        if summary.total_invocations > self.thresholds.total_invocations {
            reasons.push(AnomalyReason::InvocationFrequency);
        }

        reasons
    }

    /// Build the verdict for one log summary.
    pub fn detect(
        &self,
        function_name: &str,
        summary: &ParsedSummary,
        timestamp: DateTime<Utc>,
    ) -> AnomalyVerdict {
        AnomalyVerdict::new(function_name, self.evaluate(summary), timestamp)
    }

    /// Evaluate the most recently modified log artifact under `scope`.
    ///
    /// Returns the artifact's key with the verdict. Fails with `NotFound` if
    /// the scope holds no log artifacts.
    pub fn detect_latest(
        &self,
        store: &dyn BlobStore,
        logs_namespace: &str,
        scope: &SelectionScope,
        timestamp: DateTime<Utc>,
    ) -> ForensicsResult<(String, AnomalyVerdict)> {
        let prefix = scoped_prefix(logs_namespace, scope);
        let (key, artifact): (String, LogArtifact) = read_latest(store, &prefix)?;
        let verdict = self.detect(&artifact.function_name, &artifact.parsed_summary, timestamp);

        info!(
            function = %verdict.function_name,
            source = %key,
            anomaly_detected = verdict.anomaly_detected,
            reasons = %verdict.reason_summary(),
            "anomaly evaluation complete"
        );
        Ok((key, verdict))
    }
}

impl Default for AnomalyEvaluator {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}
