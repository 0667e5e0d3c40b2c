//! Blob-store listing and write options shared by every store backend.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry returned by a prefix listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

/// Server-side encryption requested for a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encryption {
    #[serde(rename = "AES256")]
    Aes256,
}

/// Options attached to a single `put`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOptions {
    pub encryption: Option<Encryption>,
}

impl PutOptions {
    /// Request AES-256 encryption at rest.
    pub fn encrypted() -> Self {
        Self {
            encryption: Some(Encryption::Aes256),
        }
    }
}

/// Which artifacts a "latest" selection considers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionScope {
    /// Every artifact under the namespace, regardless of function.
    Global,
    /// Only artifacts written for the named function.
    Function(String),
}

impl SelectionScope {
    pub fn function(name: impl Into<String>) -> Self {
        Self::Function(name.into())
    }

    /// The function this scope is pinned to, if any.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Function(name) => Some(name),
        }
    }
}

impl fmt::Display for SelectionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("(global)"),
            Self::Function(name) => f.write_str(name),
        }
    }
}
