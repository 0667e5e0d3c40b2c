//! Pipeline configuration.
//!
//! `PipelineConfig` is deserialized from TOML and injected into each stage at
//! construction. Every field has a default, so an empty document is a valid
//! configuration:
//!
//! ```toml
//! bucket = "faas-forensics"
//! window_minutes = 30
//! selection = "per-function"
//!
//! [namespaces]
//! logs = "logs/"
//! snapshots = "snapshots/"
//! evidence = "evidence/"
//! anomalies = "anomalies/"
//!
//! [thresholds]
//! error_count = 0
//! avg_duration_ms = 12.0
//! total_invocations = 50
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use forensics_contracts::{
    error::{ForensicsError, ForensicsResult},
    store::SelectionScope,
};

pub const DEFAULT_ERROR_THRESHOLD: u64 = 0;
pub const DEFAULT_DURATION_THRESHOLD_MS: f64 = 12.0;
pub const DEFAULT_INVOCATION_THRESHOLD: u64 = 50;
pub const DEFAULT_WINDOW_MINUTES: u32 = 30;

/// Anomaly thresholds. A metric strictly greater than its threshold fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub error_count: u64,
    pub avg_duration_ms: f64,
    pub total_invocations: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            error_count: DEFAULT_ERROR_THRESHOLD,
            avg_duration_ms: DEFAULT_DURATION_THRESHOLD_MS,
            total_invocations: DEFAULT_INVOCATION_THRESHOLD,
        }
    }
}

/// Blob-store key prefixes, one per artifact kind. Each ends in `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Namespaces {
    pub logs: String,
    pub snapshots: String,
    pub evidence: String,
    pub anomalies: String,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            logs: "logs/".to_string(),
            snapshots: "snapshots/".to_string(),
            evidence: "evidence/".to_string(),
            anomalies: "anomalies/".to_string(),
        }
    }
}

/// How "latest artifact" selection is scoped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// Select within the target function's partition.
    #[default]
    PerFunction,
    /// Select across the whole namespace, whatever function wrote it.
    Global,
}

/// The complete, immutable configuration shared by every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Bucket name, used only in diagnostics.
    pub bucket: String,
    /// Prepended to a function name to form its log group.
    pub log_group_prefix: String,
    /// Default collector look-back window.
    pub window_minutes: u32,
    /// Prefix of every case id.
    pub case_prefix: String,
    pub selection: SelectionMode,
    pub namespaces: Namespaces,
    pub thresholds: Thresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bucket: "faas-forensics".to_string(),
            log_group_prefix: "/aws/lambda/".to_string(),
            window_minutes: DEFAULT_WINDOW_MINUTES,
            case_prefix: "case-".to_string(),
            selection: SelectionMode::default(),
            namespaces: Namespaces::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `ForensicsError::ConfigError` if the TOML is malformed or a
    /// value fails validation.
    pub fn from_toml_str(s: &str) -> ForensicsResult<Self> {
        let config: PipelineConfig = toml::from_str(s).map_err(|e| ForensicsError::ConfigError {
            reason: format!("failed to parse pipeline TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn from_file(path: &Path) -> ForensicsResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ForensicsError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> ForensicsResult<()> {
        if self.window_minutes == 0 {
            return Err(ForensicsError::ConfigError {
                reason: "window_minutes must be greater than zero".to_string(),
            });
        }
        let namespaces = [
            ("logs", &self.namespaces.logs),
            ("snapshots", &self.namespaces.snapshots),
            ("evidence", &self.namespaces.evidence),
            ("anomalies", &self.namespaces.anomalies),
        ];
        for (name, prefix) in namespaces {
            if prefix.len() < 2 || !prefix.ends_with('/') {
                return Err(ForensicsError::ConfigError {
                    reason: format!(
                        "namespace '{}' must be a non-empty prefix ending in '/', got '{}'",
                        name, prefix
                    ),
                });
            }
        }
        if !self.thresholds.avg_duration_ms.is_finite() {
            return Err(ForensicsError::ConfigError {
                reason: "thresholds.avg_duration_ms must be finite".to_string(),
            });
        }
        Ok(())
    }

    /// Log group queried for `function_name`.
    pub fn log_group(&self, function_name: &str) -> String {
        format!("{}{}", self.log_group_prefix, function_name)
    }

    /// Resolve the selection scope for a stage run.
    ///
    /// In per-function mode a target function is required.
    pub fn scope(&self, function_name: Option<&str>) -> ForensicsResult<SelectionScope> {
        match (self.selection, function_name) {
            (SelectionMode::Global, _) => Ok(SelectionScope::Global),
            (SelectionMode::PerFunction, Some(name)) => Ok(SelectionScope::function(name)),
            (SelectionMode::PerFunction, None) => Err(ForensicsError::InvalidInput {
                reason: "per-function selection requires a target function".to_string(),
            }),
        }
    }

    /// The selection scopes a batch over `functions` evaluates and packages.
    ///
    /// One per function in per-function mode; a single global scope
    /// otherwise, however many functions are targeted.
    pub fn scopes(&self, functions: &[String]) -> Vec<SelectionScope> {
        match self.selection {
            SelectionMode::Global => vec![SelectionScope::Global],
            SelectionMode::PerFunction => functions
                .iter()
                .map(|f| SelectionScope::function(f.as_str()))
                .collect(),
        }
    }
}
