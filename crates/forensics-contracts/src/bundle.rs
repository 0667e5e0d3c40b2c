//! Evidence bundle types.
//!
//! `BundleContents` is everything the packager assembles. `EvidenceBundle`
//! adds the SHA-256 digest of the contents' canonical serialization; the
//! digest is flattened in as the last field and never contributes to its own
//! input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{anomaly::AnomalyVerdict, logs::LogArtifact, snapshot::ConfigSnapshot};

/// Name of the digest field in a serialized bundle.
pub const DIGEST_FIELD: &str = "sha256_hash";

/// The hashed portion of an evidence bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleContents {
    /// Case prefix plus the packaging epoch, e.g. `case-1700000000`.
    pub case_id: String,
    /// Human-readable summary of what the bundle documents.
    pub overview: String,
    pub function_name: String,
    pub configuration_snapshot: ConfigSnapshot,
    pub runtime_logs: LogArtifact,
    pub anomaly_report: AnomalyVerdict,
    /// Packaging time (UTC).
    pub created_at: DateTime<Utc>,
}

/// A sealed evidence bundle. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    #[serde(flatten)]
    pub contents: BundleContents,
    /// Lowercase hex SHA-256 of the canonical serialization of `contents`.
    pub sha256_hash: String,
}
