//! Blob-store key layout.
//!
//! ```text
//! logs/{function}/{function}_{epoch}.json
//! snapshots/{function}/{function}_{epoch}.json
//! anomalies/{function}/{function}_{epoch}.json
//! evidence/{case_id}.json
//! ```
//!
//! Function partitions end in `/` so that `logs/demo/` never matches
//! `logs/demo-2/...`.

use forensics_contracts::store::SelectionScope;

use crate::config::Namespaces;

impl Namespaces {
    pub fn log_key(&self, function_name: &str, epoch: i64) -> String {
        partitioned_key(&self.logs, function_name, epoch)
    }

    pub fn snapshot_key(&self, function_name: &str, epoch: i64) -> String {
        partitioned_key(&self.snapshots, function_name, epoch)
    }

    pub fn verdict_key(&self, function_name: &str, epoch: i64) -> String {
        partitioned_key(&self.anomalies, function_name, epoch)
    }

    pub fn evidence_key(&self, case_id: &str) -> String {
        format!("{}{}.json", self.evidence, case_id)
    }
}

/// The listing prefix for `namespace` under `scope`.
pub fn scoped_prefix(namespace: &str, scope: &SelectionScope) -> String {
    match scope {
        SelectionScope::Global => namespace.to_string(),
        SelectionScope::Function(name) => format!("{}{}/", namespace, name),
    }
}

fn partitioned_key(namespace: &str, function_name: &str, epoch: i64) -> String {
    format!("{}{}/{}_{}.json", namespace, function_name, function_name, epoch)
}
