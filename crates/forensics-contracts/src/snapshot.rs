//! Configuration records from the metadata and identity services, and the
//! point-in-time `ConfigSnapshot` assembled from them.
//!
//! Upstream records use the PascalCase field names the compute-metadata
//! service emits. Every upstream field is optional: the snapshotter never
//! requires one to be present.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `Environment` block of a function configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

/// A function configuration record as returned by the compute-metadata
/// service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FunctionConfiguration {
    pub function_name: Option<String>,
    pub function_arn: Option<String>,
    pub runtime: Option<String>,
    pub handler: Option<String>,
    pub memory_size: Option<u64>,
    pub timeout: Option<u64>,
    pub last_modified: Option<String>,
    pub description: Option<String>,
    /// ARN-like identifier of the execution role.
    pub role: Option<String>,
    pub environment: Option<EnvironmentConfig>,
    pub tracing_config: Option<Value>,
    pub vpc_config: Option<Value>,
    pub revision_id: Option<String>,
    #[serde(rename = "KMSKeyArn")]
    pub kms_key_arn: Option<String>,
    pub state: Option<String>,
    pub package_type: Option<String>,
    pub architectures: Option<Vec<String>>,
    pub ephemeral_storage: Option<Map<String, Value>>,
}

/// A role record as returned by the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleRecord {
    pub arn: String,
    pub create_date: String,
    #[serde(default)]
    pub assume_role_policy_document: Value,
}

/// Execution-role details captured in a snapshot.
///
/// `Unresolved` is a degraded but valid value: the snapshot is still written
/// and the lookup failure travels with it as data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleDetails {
    Resolved {
        #[serde(rename = "RoleName")]
        role_name: String,
        #[serde(rename = "Arn")]
        arn: String,
        #[serde(rename = "CreateDate")]
        create_date: String,
        #[serde(rename = "AssumeRolePolicyDocument")]
        assume_role_policy_document: Value,
    },
    Unresolved {
        /// The identifier from the function configuration, if it had one.
        #[serde(rename = "RoleArn")]
        role_arn: Option<String>,
        #[serde(rename = "Error")]
        error: String,
    },
}

impl RoleDetails {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// A flattened, point-in-time record of one function's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigSnapshot {
    pub function_name: Option<String>,
    pub function_arn: Option<String>,
    pub runtime: Option<String>,
    pub handler: Option<String>,
    pub memory_size: Option<u64>,
    pub timeout: Option<u64>,
    pub last_modified: Option<String>,
    pub description: Option<String>,
    pub role_details: RoleDetails,
    #[serde(default)]
    pub environment_variables: BTreeMap<String, String>,
    pub tracing_config: Option<Value>,
    pub vpc_config: Option<Value>,
    /// The code reference record, kept as returned by the service.
    pub code_info: Option<Value>,
    pub revision_id: Option<String>,
    #[serde(rename = "KMSKeyArn")]
    pub kms_key_arn: Option<String>,
    pub state: Option<String>,
    pub package_type: Option<String>,
    pub architectures: Option<Vec<String>>,
    #[serde(default)]
    pub ephemeral_storage: Map<String, Value>,
    /// Capture time (UTC).
    pub snapshot_timestamp: DateTime<Utc>,
}
