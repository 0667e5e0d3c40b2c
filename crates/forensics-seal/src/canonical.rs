//! Canonical JSON serialization.
//!
//! Output is compact JSON with object keys sorted by byte order at every
//! depth. Arrays keep their order. Scalars are written by `serde_json`, so
//! strings are escaped and numbers formatted exactly as `serde_json` would.
//!
//! Key order is established here rather than inherited from
//! `serde_json::Map`, whose iteration order depends on the `preserve_order`
//! feature being enabled anywhere in the dependency graph.

use serde::Serialize;
use serde_json::Value;

use forensics_contracts::error::{ForensicsError, ForensicsResult};

/// Canonical text of an already-parsed JSON value.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

/// Canonical bytes of any serializable value.
pub fn canonical_bytes<T: Serialize>(value: &T) -> ForensicsResult<Vec<u8>> {
    let value = serde_json::to_value(value).map_err(|e| ForensicsError::InvalidInput {
        reason: format!("value is not representable as JSON: {}", e),
    })?;
    Ok(canonical_json(&value).into_bytes())
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (idx, (key, item)) in entries.into_iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_scalar(&Value::String(key.clone()), out);
                out.push(':');
                write_value(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        scalar => write_scalar(scalar, out),
    }
}

fn write_scalar(value: &Value, out: &mut String) {
    // Display on a scalar Value is serde_json's compact encoding.
    out.push_str(&value.to_string());
}
