//! # forensics-seal
//!
//! Canonical serialization and SHA-256 sealing of evidence bundles.
//!
//! ## Overview
//!
//! A bundle's digest commits to every field except itself. Changing any
//! byte of the contents (the overview, a snapshot field, a log metric, the
//! verdict) changes the recomputed digest, which `verify_bundle` and
//! `verify_document` detect.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use forensics_seal::{seal, verify_document};
//!
//! let bundle = seal(contents)?;
//! let stored = serde_json::to_vec_pretty(&bundle)?;
//! assert_eq!(verify_document(&stored)?, bundle.sha256_hash);
//! ```

pub mod canonical;
pub mod seal;

pub use canonical::{canonical_bytes, canonical_json};
pub use seal::{digest_contents, is_intact, seal, sha256_hex, verify_bundle, verify_document};

// ── Tests ─────────────────────────────────────────────────────────────────────
