//! Sealing and verification of evidence bundles.
//!
//! Digest input: the canonical JSON of `BundleContents`, i.e. the bundle
//! with its `sha256_hash` field absent. The digest is lowercase hex SHA-256.
//!
//! A stored bundle can be checked two ways: as a typed `EvidenceBundle`
//! (`verify_bundle`) or as the raw document read back from storage
//! (`verify_document`), which does not depend on the document decoding into
//! the current types.

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use forensics_contracts::{
    bundle::{BundleContents, EvidenceBundle, DIGEST_FIELD},
    error::{ForensicsError, ForensicsResult},
};

use crate::canonical::{canonical_bytes, canonical_json};

/// SHA-256 of `bytes` as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Digest of the bundle contents under the canonical serialization.
pub fn digest_contents(contents: &BundleContents) -> ForensicsResult<String> {
    Ok(sha256_hex(&canonical_bytes(contents)?))
}

/// Compute the digest of `contents` and attach it.
pub fn seal(contents: BundleContents) -> ForensicsResult<EvidenceBundle> {
    let sha256_hash = digest_contents(&contents)?;
    debug!(case_id = %contents.case_id, digest = %sha256_hash, "bundle sealed");
    Ok(EvidenceBundle {
        contents,
        sha256_hash,
    })
}

/// Recompute the digest of a typed bundle and compare it to the stored one.
///
/// Returns `ForensicsError::IntegrityMismatch` when they differ.
pub fn verify_bundle(bundle: &EvidenceBundle) -> ForensicsResult<()> {
    let actual = digest_contents(&bundle.contents)?;
    compare(&bundle.sha256_hash, actual)
}

/// `true` when the typed bundle's digest matches its contents.
pub fn is_intact(bundle: &EvidenceBundle) -> bool {
    verify_bundle(bundle).is_ok()
}

/// Verify a stored bundle document and return its digest.
///
/// The document must be a JSON object carrying a string `sha256_hash`. That
/// field is removed and the remainder re-hashed.
pub fn verify_document(bytes: &[u8]) -> ForensicsResult<String> {
    let mut value: Value = serde_json::from_slice(bytes).map_err(|e| ForensicsError::InvalidInput {
        reason: format!("bundle is not valid JSON: {}", e),
    })?;

    let object = value.as_object_mut().ok_or_else(|| ForensicsError::InvalidInput {
        reason: "bundle is not a JSON object".to_string(),
    })?;
    let stored = match object.remove(DIGEST_FIELD) {
        Some(Value::String(digest)) => digest,
        _ => {
            return Err(ForensicsError::InvalidInput {
                reason: format!("bundle has no string '{}' field", DIGEST_FIELD),
            })
        }
    };

    let actual = sha256_hex(canonical_json(&value).as_bytes());
    compare(&stored, actual)?;
    Ok(stored)
}

fn compare(stored: &str, actual: String) -> ForensicsResult<()> {
    if stored == actual {
        Ok(())
    } else {
        warn!(stored = %stored, recomputed = %actual, "bundle digest mismatch");
        Err(ForensicsError::IntegrityMismatch {
            expected: stored.to_string(),
            actual,
        })
    }
}
