//! In-process composition of all four stages.
//!
//! Stages hand off through the blob store exactly as separate invocations
//! would, except for the anomaly verdict, which is passed straight to the
//! packager. A `VerdictHandoff` may still be attached to keep a durable copy.

use std::sync::Arc;

use tracing::{info, info_span, warn};
use uuid::Uuid;

use forensics_contracts::{error::ForensicsResult, store::SelectionScope};
use forensics_core::{
    traits::{BlobStore, Clock, FunctionMetadata, IdentityService, LogStore, VerdictHandoff},
    PipelineConfig,
};

use crate::{
    anomaly::AnomalyEvaluator,
    batch::{BatchOutcome, StageFailure},
    collector::LogCollector,
    packager::{EvidencePackager, PackagedBundle},
    snapshot::ConfigSnapshotter,
};

/// The external services the pipeline runs against.
#[derive(Clone)]
pub struct Services {
    pub logs: Arc<dyn LogStore>,
    pub store: Arc<dyn BlobStore>,
    pub metadata: Arc<dyn FunctionMetadata>,
    pub identity: Arc<dyn IdentityService>,
}

/// Everything one pipeline run produced.
#[derive(Debug)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub collection: BatchOutcome,
    pub snapshots: BatchOutcome,
    /// One bundle per selection scope that made it through every stage.
    pub bundles: Vec<PackagedBundle>,
    /// Scopes that failed detection or packaging, named by function or
    /// `(global)`.
    pub failed: Vec<StageFailure>,
}

impl PipelineReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.bundles.is_empty()
    }
}

/// Collect → snapshot → detect → package for a batch of functions.
pub struct Pipeline {
    collector: LogCollector,
    snapshotter: ConfigSnapshotter,
    evaluator: AnomalyEvaluator,
    packager: EvidencePackager,
    handoff: Option<Arc<dyn VerdictHandoff>>,
    store: Arc<dyn BlobStore>,
    config: Arc<PipelineConfig>,
    clock: Arc<dyn Clock>,
}

impl Pipeline {
    pub fn new(services: Services, config: Arc<PipelineConfig>, clock: Arc<dyn Clock>) -> Self {
        Self {
            collector: LogCollector::new(
                services.logs,
                services.store.clone(),
                config.clone(),
                clock.clone(),
            ),
            snapshotter: ConfigSnapshotter::new(
                services.metadata,
                services.identity,
                services.store.clone(),
                config.clone(),
                clock.clone(),
            ),
            evaluator: AnomalyEvaluator::new(config.thresholds.clone()),
            packager: EvidencePackager::new(services.store.clone(), config.clone(), clock.clone()),
            handoff: None,
            store: services.store,
            config,
            clock,
        }
    }

    /// Also record each verdict through `handoff`.
    pub fn with_handoff(mut self, handoff: Arc<dyn VerdictHandoff>) -> Self {
        self.handoff = Some(handoff);
        self
    }

    /// Run every stage for `functions` with a `window_minutes` look-back.
    pub fn run(&self, functions: &[String], window_minutes: u32) -> PipelineReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", run_id = %run_id);
        let _guard = span.enter();

        info!(targets = functions.len(), window_minutes, "pipeline run starting");

        let collection = self.collector.collect_all_with_window(functions, window_minutes);
        let snapshots = self.snapshotter.snapshot_all(functions);

        // Global selection sees one latest artifact set, so it packages once.
        let mut bundles = Vec::new();
        let mut failed = Vec::new();
        for scope in self.config.scopes(functions) {
            match self.detect_and_package(&scope) {
                Ok(packaged) => bundles.push(packaged),
                Err(error) => {
                    warn!(scope = %scope, error = %error, "scope not packaged");
                    failed.push(StageFailure {
                        function_name: scope.to_string(),
                        error,
                    });
                }
            }
        }

        info!(
            bundles = bundles.len(),
            failures = failed.len(),
            "pipeline run finished"
        );

        PipelineReport {
            run_id,
            collection,
            snapshots,
            bundles,
            failed,
        }
    }

    fn detect_and_package(&self, scope: &SelectionScope) -> ForensicsResult<PackagedBundle> {
        let (_, verdict) = self.evaluator.detect_latest(
            self.store.as_ref(),
            &self.config.namespaces.logs,
            scope,
            self.clock.now(),
        )?;
        if let Some(handoff) = &self.handoff {
            handoff.store(&verdict)?;
        }
        self.packager.package_with_verdict(scope, verdict)
    }
}
