//! Verdict hand-off between separately invoked stages.
//!
//! - `LocalFileHandoff` keeps a single JSON document on local disk,
//!   overwritten by every evaluator run. It ignores the selection scope.
//! - `BlobHandoff` appends verdicts to the blob store's anomaly namespace
//!   and loads the latest one for the scope, like every other artifact.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, info};

use forensics_contracts::{
    anomaly::AnomalyVerdict,
    error::{ForensicsError, ForensicsResult},
    store::{PutOptions, SelectionScope},
};
use forensics_core::{
    keys::scoped_prefix,
    select::{read_latest, unique_key, write_json},
    traits::{BlobStore, VerdictHandoff},
    Namespaces,
};

/// Default local hand-off document.
pub const DEFAULT_HANDOFF_FILE: &str = "anomaly_report.json";

/// A single local JSON document holding the latest verdict.
#[derive(Debug, Clone)]
pub struct LocalFileHandoff {
    path: PathBuf,
}

impl LocalFileHandoff {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn failed(&self, action: &str, e: impl std::fmt::Display) -> ForensicsError {
        ForensicsError::HandoffFailed {
            reason: format!("cannot {} '{}': {}", action, self.path.display(), e),
        }
    }
}

impl VerdictHandoff for LocalFileHandoff {
    fn store(&self, verdict: &AnomalyVerdict) -> ForensicsResult<String> {
        let body = serde_json::to_vec_pretty(verdict).map_err(|e| self.failed("encode", e))?;
        fs::write(&self.path, body).map_err(|e| self.failed("write", e))?;
        info!(path = %self.path.display(), "verdict written to local hand-off file");
        Ok(self.path.display().to_string())
    }

    fn load(&self, scope: &SelectionScope) -> ForensicsResult<AnomalyVerdict> {
        let body = fs::read(&self.path).map_err(|e| self.failed("read", e))?;
        let verdict: AnomalyVerdict =
            serde_json::from_slice(&body).map_err(|e| self.failed("decode", e))?;
        debug!(
            path = %self.path.display(),
            scope = ?scope,
            function = %verdict.function_name,
            "verdict loaded from local hand-off file"
        );
        Ok(verdict)
    }
}

/// Verdicts stored as artifacts in the blob store.
pub struct BlobHandoff {
    store: Arc<dyn BlobStore>,
    namespaces: Namespaces,
}

impl BlobHandoff {
    pub fn new(store: Arc<dyn BlobStore>, namespaces: Namespaces) -> Self {
        Self { store, namespaces }
    }
}

impl VerdictHandoff for BlobHandoff {
    fn store(&self, verdict: &AnomalyVerdict) -> ForensicsResult<String> {
        let key = unique_key(
            self.store.as_ref(),
            &self
                .namespaces
                .verdict_key(&verdict.function_name, verdict.timestamp.timestamp()),
        )?;
        write_json(self.store.as_ref(), &key, verdict, PutOptions::default())
            .map_err(|e| ForensicsError::HandoffFailed { reason: e.to_string() })?;
        info!(key = %key, function = %verdict.function_name, "verdict stored");
        Ok(key)
    }

    fn load(&self, scope: &SelectionScope) -> ForensicsResult<AnomalyVerdict> {
        let prefix = scoped_prefix(&self.namespaces.anomalies, scope);
        let (key, verdict): (String, AnomalyVerdict) = read_latest(self.store.as_ref(), &prefix)?;
        debug!(key = %key, "verdict loaded");
        Ok(verdict)
    }
}
