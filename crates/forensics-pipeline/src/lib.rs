//! # forensics-pipeline
//!
//! The four stages of the FaaS forensics pipeline and their composition.
//!
//! ```text
//! LogCollector ──► logs/{fn}/…        ─┐
//! ConfigSnapshotter ──► snapshots/{fn}/… ─┼─► EvidencePackager ──► evidence/case-….json
//! AnomalyEvaluator (latest log) ──► verdict ─┘
//! ```
//!
//! Each stage can run as its own invocation, handing off through the blob
//! store (and a [`VerdictHandoff`](forensics_core::traits::VerdictHandoff)
//! for the verdict), or all four can run in one process via [`Pipeline`].

pub mod anomaly;
pub mod batch;
pub mod collector;
pub mod handoff;
pub mod metrics;
pub mod overview;
pub mod packager;
pub mod pipeline;
pub mod snapshot;

pub use anomaly::AnomalyEvaluator;
pub use batch::{BatchOutcome, StageFailure};
pub use collector::LogCollector;
pub use handoff::{BlobHandoff, LocalFileHandoff, DEFAULT_HANDOFF_FILE};
pub use packager::{EvidencePackager, PackagedBundle};
pub use pipeline::{Pipeline, PipelineReport, Services};
pub use snapshot::ConfigSnapshotter;

// ── Tests ─────────────────────────────────────────────────────────────────────
