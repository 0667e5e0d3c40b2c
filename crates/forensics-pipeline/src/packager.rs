//! The evidence packager stage.
//!
//! Packaging combines the latest snapshot, the latest log artifact, and an
//! anomaly verdict into one sealed `EvidenceBundle`:
//!
//! 1. Select the latest snapshot and log artifact under the scope
//! 2. Check that snapshot, log artifact and verdict describe one function
//! 3. Generate the overview and assign a case id
//! 4. Seal the contents with their SHA-256 digest
//! 5. Write the bundle under the evidence namespace with encryption at rest
//!
//! Any missing or inconsistent input aborts the run before step 5. No
//! partial bundle is ever written.

use std::sync::Arc;

use tracing::{info, warn};

use forensics_contracts::{
    anomaly::AnomalyVerdict,
    bundle::{BundleContents, EvidenceBundle},
    error::{ForensicsError, ForensicsResult},
    logs::LogArtifact,
    snapshot::ConfigSnapshot,
    store::{PutOptions, SelectionScope},
};
use forensics_core::{
    keys::scoped_prefix,
    select::{read_latest, unique_key, write_json},
    traits::{BlobStore, Clock, VerdictHandoff},
    PipelineConfig,
};
use forensics_seal::seal;

use crate::overview::generate_overview;

/// A bundle that has been written, and where.
#[derive(Debug, Clone)]
pub struct PackagedBundle {
    pub key: String,
    pub bundle: EvidenceBundle,
    pub snapshot_key: String,
    pub log_key: String,
}

/// Assembles, seals and persists evidence bundles.
pub struct EvidencePackager {
    store: Arc<dyn BlobStore>,
    config: Arc<PipelineConfig>,
    clock: Arc<dyn Clock>,
}

impl EvidencePackager {
    pub fn new(store: Arc<dyn BlobStore>, config: Arc<PipelineConfig>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    /// Package using the verdict the evaluator left in `handoff`.
    pub fn package(
        &self,
        scope: &SelectionScope,
        handoff: &dyn VerdictHandoff,
    ) -> ForensicsResult<PackagedBundle> {
        let verdict = handoff.load(scope)?;
        self.package_with_verdict(scope, verdict)
    }

    /// Package using a verdict passed in directly.
    pub fn package_with_verdict(
        &self,
        scope: &SelectionScope,
        verdict: AnomalyVerdict,
    ) -> ForensicsResult<PackagedBundle> {
        let result = self.try_package(scope, verdict);
        if let Err(e) = &result {
            warn!(scope = ?scope, error = %e, "evidence packaging aborted");
        }
        result
    }

    /// Build and seal a bundle from already-loaded artifacts.
    pub fn assemble(
        &self,
        case_id: String,
        snapshot: ConfigSnapshot,
        logs: LogArtifact,
        verdict: AnomalyVerdict,
    ) -> ForensicsResult<EvidenceBundle> {
        let function_name = logs.function_name.clone();
        let contents = BundleContents {
            case_id,
            overview: generate_overview(&function_name, &verdict),
            function_name,
            configuration_snapshot: snapshot,
            runtime_logs: logs,
            anomaly_report: verdict,
            created_at: self.clock.now(),
        };
        seal(contents)
    }

    fn try_package(
        &self,
        scope: &SelectionScope,
        verdict: AnomalyVerdict,
    ) -> ForensicsResult<PackagedBundle> {
        let namespaces = &self.config.namespaces;
        let (snapshot_key, snapshot): (String, ConfigSnapshot) =
            read_latest(self.store.as_ref(), &scoped_prefix(&namespaces.snapshots, scope))?;
        let (log_key, logs): (String, LogArtifact) =
            read_latest(self.store.as_ref(), &scoped_prefix(&namespaces.logs, scope))?;

        check_correlation(&snapshot_key, &snapshot, &log_key, &logs, &verdict)?;

        let requested = format!("{}{}", self.config.case_prefix, self.clock.now().timestamp());
        let key = unique_key(self.store.as_ref(), &namespaces.evidence_key(&requested))?;
        let case_id = key
            .strip_prefix(namespaces.evidence.as_str())
            .and_then(|k| k.strip_suffix(".json"))
            .unwrap_or(&requested)
            .to_string();

        let bundle = self.assemble(case_id, snapshot, logs, verdict)?;
        write_json(self.store.as_ref(), &key, &bundle, PutOptions::encrypted())?;

        info!(
            case_id = %bundle.contents.case_id,
            function = %bundle.contents.function_name,
            key = %key,
            bucket = %self.config.bucket,
            digest = %bundle.sha256_hash,
            anomaly_detected = bundle.contents.anomaly_report.anomaly_detected,
            "evidence bundle written"
        );

        Ok(PackagedBundle {
            key,
            bundle,
            snapshot_key,
            log_key,
        })
    }
}

/// Snapshot, log artifact and verdict must all describe the same function,
/// and the verdict must be internally consistent.
fn check_correlation(
    snapshot_key: &str,
    snapshot: &ConfigSnapshot,
    log_key: &str,
    logs: &LogArtifact,
    verdict: &AnomalyVerdict,
) -> ForensicsResult<()> {
    if !verdict.is_consistent() {
        return Err(ForensicsError::corrupt(
            &verdict.function_name,
            "verdict flag disagrees with its reasons",
        ));
    }
    if verdict.function_name != logs.function_name {
        return Err(ForensicsError::corrupt(
            log_key,
            format!(
                "log artifact is for '{}' but the verdict is for '{}'",
                logs.function_name, verdict.function_name
            ),
        ));
    }
    if let Some(name) = &snapshot.function_name {
        if *name != logs.function_name {
            return Err(ForensicsError::corrupt(
                snapshot_key,
                format!(
                    "snapshot is for '{}' but the log artifact is for '{}'",
                    name, logs.function_name
                ),
            ));
        }
    }
    Ok(())
}
