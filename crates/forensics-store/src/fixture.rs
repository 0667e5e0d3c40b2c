//! JSON fixtures describing an upstream environment.
//!
//! A fixture stands in for the log store, metadata service and identity
//! service in one document:
//!
//! ```json
//! {
//!   "page_size": 25,
//!   "functions": {
//!     "orders-api": {
//!       "configuration": { "FunctionName": "orders-api", "Role": "arn:aws:iam::1:role/orders" },
//!       "code": { "RepositoryType": "S3", "Location": "https://..." },
//!       "events": [
//!         { "age_seconds": 120, "message": "START RequestId: 1" },
//!         { "timestamp": 1714564800000, "message": "REPORT Duration: 4.2 ms" }
//!       ]
//!     }
//!   },
//!   "roles": {
//!     "orders": { "Arn": "arn:aws:iam::1:role/orders", "CreateDate": "2024-01-01" }
//!   }
//! }
//! ```
//!
//! Events carry either an absolute `timestamp` (epoch ms) or an `age_seconds`
//! resolved against the time the environment is built.

use std::{collections::BTreeMap, path::Path, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use forensics_contracts::{
    error::{ForensicsError, ForensicsResult},
    logs::LogEvent,
    snapshot::{FunctionConfiguration, RoleRecord},
};

use crate::memory::{InMemoryFunctionMetadata, InMemoryIdentity, InMemoryLogStore};

/// One log line in a fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureEvent {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_seconds: Option<i64>,
}

impl FixtureEvent {
    /// An event `age_seconds` before the environment is built.
    pub fn aged(age_seconds: i64, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: None,
            age_seconds: Some(age_seconds),
        }
    }

    /// The event as the log store serves it, relative to `now`.
    ///
    /// Fails with `ConfigError` when `age_seconds` does not fit an epoch-ms
    /// timestamp.
    pub fn resolve(&self, now: DateTime<Utc>) -> ForensicsResult<LogEvent> {
        let timestamp = match (self.timestamp, self.age_seconds) {
            (Some(ts), _) => ts,
            (None, Some(age)) => age
                .checked_mul(1000)
                .and_then(|age_ms| now.timestamp_millis().checked_sub(age_ms))
                .ok_or_else(|| ForensicsError::ConfigError {
                    reason: format!("fixture event age_seconds {} is out of range", age),
                })?,
            (None, None) => now.timestamp_millis(),
        };
        Ok(LogEvent::new(timestamp, self.message.clone()))
    }
}

/// Everything the upstream services know about one function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionFixture {
    #[serde(default)]
    pub configuration: FunctionConfiguration,
    #[serde(default)]
    pub code: Value,
    #[serde(default)]
    pub events: Vec<FixtureEvent>,
}

/// A complete upstream environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionFixture>,
    #[serde(default)]
    pub roles: BTreeMap<String, RoleRecord>,
}

/// The upstream services built from a fixture.
#[derive(Clone)]
pub struct Environment {
    pub logs: Arc<InMemoryLogStore>,
    pub metadata: Arc<InMemoryFunctionMetadata>,
    pub identity: Arc<InMemoryIdentity>,
}

impl Fixture {
    pub fn from_json_str(s: &str) -> ForensicsResult<Self> {
        serde_json::from_str(s).map_err(|e| ForensicsError::ConfigError {
            reason: format!("failed to parse fixture JSON: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> ForensicsResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ForensicsError::ConfigError {
            reason: format!("failed to read fixture file '{}': {}", path.display(), e),
        })?;
        Self::from_json_str(&contents)
    }

    /// Names of the functions the fixture describes, in order.
    pub fn function_names(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }

    /// Build in-memory services from the fixture.
    ///
    /// Log groups are named `log_group_prefix` + function name.
    pub fn build(&self, log_group_prefix: &str, now: DateTime<Utc>) -> ForensicsResult<Environment> {
        let logs = Arc::new(InMemoryLogStore::with_page_size(
            self.page_size.unwrap_or(InMemoryLogStore::DEFAULT_PAGE_SIZE),
        ));
        let metadata = Arc::new(InMemoryFunctionMetadata::new());
        let identity = Arc::new(InMemoryIdentity::new());

        for (name, function) in &self.functions {
            metadata.register(name.clone(), function.configuration.clone(), function.code.clone())?;
            let events = function
                .events
                .iter()
                .map(|e| e.resolve(now))
                .collect::<ForensicsResult<Vec<_>>>()?;
            logs.append(format!("{}{}", log_group_prefix, name), events)?;
        }
        for (name, role) in &self.roles {
            identity.register(name.clone(), role.clone())?;
        }

        Ok(Environment {
            logs,
            metadata,
            identity,
        })
    }
}
