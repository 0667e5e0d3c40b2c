//! FaaS forensics - command-line driver.
//!
//! Each stage runs as its own invocation; durable state lives in a blob
//! store rooted at `--store`:
//!
//!   faas-forensics collect            # logs/{function}/...
//!   faas-forensics snapshot           # snapshots/{function}/...
//!   faas-forensics detect             # anomalies/{function}/... (or --handoff-file)
//!   faas-forensics package            # evidence/case-{epoch}.json
//!   faas-forensics run                # all four stages in-process
//!   faas-forensics verify evidence/case-1767225600.json
//!
//! Without `--fixtures` the upstream services are the built-in demo
//! environment (`demo-func-anom`, `demo-func-normal`).
//!
//! Artifact keys, verdicts and per-function failures are printed to
//! standard output. A run-ending error goes to standard error before the
//! process exits with status 1, and tracing diagnostics go to the
//! subscriber's writer.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use forensics_contracts::{
    bundle::EvidenceBundle,
    error::{ForensicsError, ForensicsResult},
};
use forensics_core::{
    traits::{BlobStore, Clock, SystemClock, VerdictHandoff},
    PipelineConfig,
};
use forensics_pipeline::{
    AnomalyEvaluator, BatchOutcome, BlobHandoff, ConfigSnapshotter, EvidencePackager,
    LocalFileHandoff, LogCollector, Pipeline, Services, StageFailure, DEFAULT_HANDOFF_FILE,
};
use forensics_seal::verify_document;
use forensics_store::{mock_data, Fixture, FsBlobStore};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Forensic evidence collection for serverless functions.
///
/// Collects runtime logs and configuration for each target function,
/// evaluates the logs for anomalies, and packages everything into a
/// SHA-256 sealed evidence bundle.
#[derive(Parser)]
#[command(
    name = "faas-forensics",
    about = "Forensic evidence pipeline for FaaS workloads",
    long_about = "Collects logs and configuration snapshots for serverless functions,\n\
                  flags anomalous behavior, and writes tamper-evident evidence bundles."
)]
struct Cli {
    /// Pipeline configuration (TOML). Defaults apply when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root directory of the evidence blob store.
    #[arg(long, global = true, default_value = "./forensics-store")]
    store: PathBuf,

    /// Upstream environment fixture (JSON). Defaults to the demo environment.
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,

    /// Hand verdicts over through this local file instead of the blob store.
    /// Given without a value, uses `anomaly_report.json`.
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        default_missing_value = DEFAULT_HANDOFF_FILE
    )]
    handoff_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect and summarize runtime logs.
    Collect {
        /// Target functions. Defaults to every function in the environment.
        functions: Vec<String>,
        /// Look-back window in minutes.
        #[arg(long)]
        window: Option<u32>,
    },
    /// Capture configuration snapshots.
    Snapshot {
        functions: Vec<String>,
    },
    /// Evaluate the latest log artifacts and hand over the verdicts.
    Detect {
        functions: Vec<String>,
    },
    /// Package the latest artifacts and verdicts into evidence bundles.
    Package {
        functions: Vec<String>,
    },
    /// Run every stage in-process.
    Run {
        functions: Vec<String>,
        #[arg(long)]
        window: Option<u32>,
    },
    /// Check the integrity of a stored evidence bundle.
    Verify {
        /// Blob store key, e.g. evidence/case-1767225600.json
        key: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = App::from_cli(&cli).and_then(|app| app.dispatch(cli.command));

    match result {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("Every target function failed.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

struct App {
    config: Arc<PipelineConfig>,
    services: Services,
    clock: Arc<dyn Clock>,
    handoff: Arc<dyn VerdictHandoff>,
    default_targets: Vec<String>,
}

impl App {
    fn from_cli(cli: &Cli) -> ForensicsResult<Self> {
        let config = match &cli.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };
        let config = Arc::new(config);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let fixture = match &cli.fixtures {
            Some(path) => Fixture::from_file(path)?,
            None => mock_data::demo_fixture(),
        };
        let env = fixture.build(&config.log_group_prefix, clock.now())?;
        let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::open(&cli.store)?);

        let handoff: Arc<dyn VerdictHandoff> = match &cli.handoff_file {
            Some(path) => Arc::new(LocalFileHandoff::new(path)),
            None => Arc::new(BlobHandoff::new(store.clone(), config.namespaces.clone())),
        };

        info!(
            store = %cli.store.display(),
            bucket = %config.bucket,
            functions = fixture.functions.len(),
            "environment ready"
        );

        Ok(Self {
            services: Services {
                logs: env.logs,
                store,
                metadata: env.metadata,
                identity: env.identity,
            },
            config,
            clock,
            handoff,
            default_targets: fixture.function_names(),
        })
    }

    fn dispatch(&self, command: Command) -> ForensicsResult<bool> {
        match command {
            Command::Collect { functions, window } => self.collect(&self.targets(functions), window),
            Command::Snapshot { functions } => self.snapshot(&self.targets(functions)),
            Command::Detect { functions } => self.detect(&self.targets(functions)),
            Command::Package { functions } => self.package(&self.targets(functions)),
            Command::Run { functions, window } => self.run(&self.targets(functions), window),
            Command::Verify { key } => self.verify(&key),
        }
    }

    fn targets(&self, functions: Vec<String>) -> Vec<String> {
        if functions.is_empty() {
            self.default_targets.clone()
        } else {
            functions
        }
    }

    // ── Stages ────────────────────────────────────────────────────────────────

    fn collect(&self, functions: &[String], window: Option<u32>) -> ForensicsResult<bool> {
        let collector = LogCollector::new(
            self.services.logs.clone(),
            self.services.store.clone(),
            self.config.clone(),
            self.clock.clone(),
        );
        let window = window.unwrap_or(self.config.window_minutes);
        let outcome = collector.collect_all_with_window(functions, window);
        print_outcome("Log artifacts", &outcome);
        Ok(!outcome.all_failed())
    }

    fn snapshot(&self, functions: &[String]) -> ForensicsResult<bool> {
        let snapshotter = ConfigSnapshotter::new(
            self.services.metadata.clone(),
            self.services.identity.clone(),
            self.services.store.clone(),
            self.config.clone(),
            self.clock.clone(),
        );
        let outcome = snapshotter.snapshot_all(functions);
        print_outcome("Configuration snapshots", &outcome);
        Ok(!outcome.all_failed())
    }

    fn detect(&self, functions: &[String]) -> ForensicsResult<bool> {
        let evaluator = AnomalyEvaluator::new(self.config.thresholds.clone());
        let mut outcome = BatchOutcome::default();

        println!("Anomaly verdicts:");
        for scope in self.config.scopes(functions) {
            let result = evaluator
                .detect_latest(
                    self.services.store.as_ref(),
                    &self.config.namespaces.logs,
                    &scope,
                    self.clock.now(),
                )
                .and_then(|(_, verdict)| {
                    if verdict.anomaly_detected {
                        println!("  {}: ANOMALY ({})", verdict.function_name, verdict.reason_summary());
                    } else {
                        println!("  {}: normal", verdict.function_name);
                    }
                    self.handoff.store(&verdict)
                });
            outcome.record(&scope.to_string(), result);
        }

        print_outcome("Verdicts handed over", &outcome);
        Ok(!outcome.all_failed())
    }

    fn package(&self, functions: &[String]) -> ForensicsResult<bool> {
        let packager = EvidencePackager::new(
            self.services.store.clone(),
            self.config.clone(),
            self.clock.clone(),
        );
        let mut outcome = BatchOutcome::default();
        for scope in self.config.scopes(functions) {
            let result = packager
                .package(&scope, self.handoff.as_ref())
                .map(|packaged| packaged.key);
            outcome.record(&scope.to_string(), result);
        }
        print_outcome("Evidence bundles", &outcome);
        Ok(!outcome.all_failed())
    }

    fn run(&self, functions: &[String], window: Option<u32>) -> ForensicsResult<bool> {
        let pipeline = Pipeline::new(self.services.clone(), self.config.clone(), self.clock.clone())
            .with_handoff(self.handoff.clone());
        let report = pipeline.run(functions, window.unwrap_or(self.config.window_minutes));

        print_outcome("Log artifacts", &report.collection);
        print_outcome("Configuration snapshots", &report.snapshots);

        println!("Evidence bundles (run {}):", report.run_id);
        for packaged in &report.bundles {
            let contents = &packaged.bundle.contents;
            let verdict = if contents.anomaly_report.anomaly_detected {
                format!("ANOMALY ({})", contents.anomaly_report.reason_summary())
            } else {
                "normal".to_string()
            };
            println!("  {}: {} -> {}", contents.function_name, verdict, packaged.key);
        }
        print_failures(&report.failed);

        Ok(!report.bundles.is_empty())
    }

    fn verify(&self, key: &str) -> ForensicsResult<bool> {
        let bytes = self.services.store.get(key)?;
        let digest = verify_document(&bytes)?;
        let bundle: EvidenceBundle =
            serde_json::from_slice(&bytes).map_err(|e| ForensicsError::corrupt(key, e))?;

        println!("Bundle {} is intact.", key);
        println!("  case:     {}", bundle.contents.case_id);
        println!("  function: {}", bundle.contents.function_name);
        println!("  sha256:   {}", digest);
        Ok(true)
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_outcome(title: &str, outcome: &BatchOutcome) {
    println!("{}:", title);
    for (function_name, key) in &outcome.written {
        println!("  {}: {}", function_name, key);
    }
    print_failures(&outcome.failed);
}

fn print_failures(failed: &[StageFailure]) {
    for failure in failed {
        println!("  {}: FAILED - {}", failure.function_name, failure.error);
    }
}
