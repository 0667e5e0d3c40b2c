//! Collaborator traits for the forensics pipeline.
//!
//! The pipeline depends on four external services and a clock:
//!
//! - `LogStore`         - append-only event log, queried by time range
//! - `BlobStore`        - key-addressed object storage with prefix listing
//! - `FunctionMetadata` - compute-function configuration records
//! - `IdentityService`  - execution-role records
//! - `Clock`            - wall-clock time, injectable for deterministic runs
//!
//! `VerdictHandoff` is the seam between the anomaly evaluator and the
//! packager when they run as separate invocations.
//!
//! Every call is a single blocking attempt. Implementations map their own
//! failures to `ForensicsError::UpstreamUnavailable`.

use chrono::{DateTime, Utc};
use serde_json::Value;

use forensics_contracts::{
    anomaly::AnomalyVerdict,
    error::ForensicsResult,
    logs::LogPage,
    snapshot::{FunctionConfiguration, RoleRecord},
    store::{ObjectSummary, PutOptions, SelectionScope},
};

/// An append-only log store queried by time range.
pub trait LogStore: Send + Sync {
    /// Return one page of events in `log_group` with timestamps in
    /// `[start_ms, end_ms]`.
    ///
    /// Pass the previous page's `next_token` to continue; `None` starts from
    /// the first page.
    fn query(
        &self,
        log_group: &str,
        start_ms: i64,
        end_ms: i64,
        next_token: Option<&str>,
    ) -> ForensicsResult<LogPage>;
}

/// Key-addressed object storage.
pub trait BlobStore: Send + Sync {
    /// List every object whose key starts with `prefix`.
    fn list(&self, prefix: &str) -> ForensicsResult<Vec<ObjectSummary>>;

    /// Fetch the body stored under `key`.
    fn get(&self, key: &str) -> ForensicsResult<Vec<u8>>;

    /// Store `body` under `key`, replacing any previous object.
    fn put(&self, key: &str, body: &[u8], options: PutOptions) -> ForensicsResult<()>;
}

/// The compute-function metadata service.
pub trait FunctionMetadata: Send + Sync {
    fn get_configuration(&self, function_name: &str) -> ForensicsResult<FunctionConfiguration>;

    /// The code reference record (repository type, location, ...), returned
    /// as an opaque document.
    fn get_code_reference(&self, function_name: &str) -> ForensicsResult<Value>;
}

/// The identity / role metadata service.
pub trait IdentityService: Send + Sync {
    fn get_role(&self, role_name: &str) -> ForensicsResult<RoleRecord>;
}

/// A source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Carries an anomaly verdict from the evaluator to the packager.
pub trait VerdictHandoff: Send + Sync {
    /// Persist `verdict` and return a description of where it went.
    fn store(&self, verdict: &AnomalyVerdict) -> ForensicsResult<String>;

    /// Load the verdict the packager should use for `scope`.
    fn load(&self, scope: &SelectionScope) -> ForensicsResult<AnomalyVerdict>;
}
