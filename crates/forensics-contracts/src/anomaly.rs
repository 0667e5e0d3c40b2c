//! Anomaly verdict types.
//!
//! A verdict is derived from exactly one `ParsedSummary`. Its `reasons` are
//! non-empty if and only if `anomaly_detected` is true; `AnomalyVerdict::new`
//! is the only constructor that sets the flag, and `is_consistent` checks the
//! rule on verdicts decoded from storage.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A threshold rule that fired. Serialized as its human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyReason {
    #[serde(rename = "Error count exceeded threshold")]
    ErrorCount,
    #[serde(rename = "Execution duration spike detected")]
    DurationSpike,
    #[serde(rename = "High invocation frequency detected")]
    InvocationFrequency,
}

impl AnomalyReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::ErrorCount => "Error count exceeded threshold",
            Self::DurationSpike => "Execution duration spike detected",
            Self::InvocationFrequency => "High invocation frequency detected",
        }
    }
}

impl fmt::Display for AnomalyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The evaluator's decision for one log summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    pub function_name: String,
    pub anomaly_detected: bool,
    /// Fired rules in evaluation order: error, duration, invocation.
    pub reasons: Vec<AnomalyReason>,
    /// Evaluation time (UTC).
    pub timestamp: DateTime<Utc>,
}

impl AnomalyVerdict {
    /// Build a verdict whose flag is derived from `reasons`.
    pub fn new(
        function_name: impl Into<String>,
        reasons: Vec<AnomalyReason>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            function_name: function_name.into(),
            anomaly_detected: !reasons.is_empty(),
            reasons,
            timestamp,
        }
    }

    /// True when the flag agrees with the reason list.
    pub fn is_consistent(&self) -> bool {
        self.anomaly_detected == !self.reasons.is_empty()
    }

    /// Reasons joined with `", "`, as used in bundle overviews.
    pub fn reason_summary(&self) -> String {
        self.reasons
            .iter()
            .map(AnomalyReason::message)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
