//! The configuration snapshot stage.
//!
//! A snapshot flattens the function's configuration record and code
//! reference into one `ConfigSnapshot`. Role resolution is best-effort: a
//! missing role identifier or a failed identity lookup yields
//! `RoleDetails::Unresolved` and the snapshot is written anyway.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use forensics_contracts::{
    error::ForensicsResult,
    snapshot::{ConfigSnapshot, FunctionConfiguration, RoleDetails},
    store::PutOptions,
};
use forensics_core::{
    select::{unique_key, write_json},
    traits::{BlobStore, Clock, FunctionMetadata, IdentityService},
    PipelineConfig,
};

use crate::batch::BatchOutcome;

/// The role name embedded in an ARN-like identifier: its last `/` segment.
pub fn role_name_from_arn(role_arn: &str) -> &str {
    role_arn.rsplit('/').next().unwrap_or(role_arn)
}

/// Captures point-in-time configuration snapshots.
pub struct ConfigSnapshotter {
    metadata: Arc<dyn FunctionMetadata>,
    identity: Arc<dyn IdentityService>,
    store: Arc<dyn BlobStore>,
    config: Arc<PipelineConfig>,
    clock: Arc<dyn Clock>,
}

impl ConfigSnapshotter {
    pub fn new(
        metadata: Arc<dyn FunctionMetadata>,
        identity: Arc<dyn IdentityService>,
        store: Arc<dyn BlobStore>,
        config: Arc<PipelineConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            metadata,
            identity,
            store,
            config,
            clock,
        }
    }

    /// Capture and persist a snapshot of `function_name`, returning its key.
    ///
    /// Failures are logged and returned; nothing is written for a function
    /// whose configuration or code reference cannot be fetched.
    pub fn snapshot(&self, function_name: &str) -> ForensicsResult<String> {
        let result = self.try_snapshot(function_name);
        if let Err(e) = &result {
            warn!(function = %function_name, error = %e, "configuration snapshot failed");
        }
        result
    }

    /// Snapshot every target. A failure for one function does not affect the
    /// others.
    pub fn snapshot_all(&self, functions: &[String]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for function_name in functions {
            outcome.record(function_name, self.snapshot(function_name));
        }
        outcome
    }

    /// Assemble a snapshot without writing it.
    pub fn capture(&self, function_name: &str) -> ForensicsResult<ConfigSnapshot> {
        info!(function = %function_name, "capturing configuration snapshot");
        let config = self.metadata.get_configuration(function_name)?;
        let code_info = self.metadata.get_code_reference(function_name)?;
        let role_details = self.resolve_role(config.role.as_deref());
        Ok(build_snapshot(config, code_info, role_details, self.clock.now()))
    }

    /// Look up the execution role, degrading instead of failing.
    pub fn resolve_role(&self, role_arn: Option<&str>) -> RoleDetails {
        let Some(role_arn) = role_arn else {
            return RoleDetails::Unresolved {
                role_arn: None,
                error: "function configuration has no execution role".to_string(),
            };
        };

        let role_name = role_name_from_arn(role_arn);
        match self.identity.get_role(role_name) {
            Ok(record) => RoleDetails::Resolved {
                role_name: role_name.to_string(),
                arn: record.arn,
                create_date: record.create_date,
                assume_role_policy_document: record.assume_role_policy_document,
            },
            Err(e) => {
                warn!(
                    role_arn = %role_arn,
                    error = %e,
                    "role lookup failed, recording degraded role details"
                );
                RoleDetails::Unresolved {
                    role_arn: Some(role_arn.to_string()),
                    error: e.to_string(),
                }
            }
        }
    }

    fn try_snapshot(&self, function_name: &str) -> ForensicsResult<String> {
        let snapshot = self.capture(function_name)?;
        let key = unique_key(
            self.store.as_ref(),
            &self
                .config
                .namespaces
                .snapshot_key(function_name, snapshot.snapshot_timestamp.timestamp()),
        )?;
        write_json(self.store.as_ref(), &key, &snapshot, PutOptions::default())?;

        info!(
            function = %function_name,
            key = %key,
            bucket = %self.config.bucket,
            role_resolved = snapshot.role_details.is_resolved(),
            "snapshot saved"
        );
        Ok(key)
    }
}

fn build_snapshot(
    config: FunctionConfiguration,
    code_info: Value,
    role_details: RoleDetails,
    captured_at: DateTime<Utc>,
) -> ConfigSnapshot {
    ConfigSnapshot {
        function_name: config.function_name,
        function_arn: config.function_arn,
        runtime: config.runtime,
        handler: config.handler,
        memory_size: config.memory_size,
        timeout: config.timeout,
        last_modified: config.last_modified,
        description: config.description,
        role_details,
        environment_variables: config.environment.map(|e| e.variables).unwrap_or_default(),
        tracing_config: config.tracing_config,
        vpc_config: config.vpc_config,
        code_info: (!code_info.is_null()).then_some(code_info),
        revision_id: config.revision_id,
        kms_key_arn: config.kms_key_arn,
        state: config.state,
        package_type: config.package_type,
        architectures: config.architectures,
        ephemeral_storage: config.ephemeral_storage.unwrap_or_default(),
        snapshot_timestamp: captured_at,
    }
}
