//! # forensics-core
//!
//! Collaborator traits, configuration, and artifact key layout for the FaaS
//! forensics pipeline.
//!
//! The stages never talk to a cloud SDK directly. They see the log store,
//! blob store, metadata and identity services only through the traits in
//! [`traits`], and locate each other's output through the key layout in
//! [`keys`] and the selection rules in [`select`].

pub mod config;
pub mod keys;
pub mod select;
pub mod traits;

pub use config::{Namespaces, PipelineConfig, SelectionMode, Thresholds};
pub use select::{latest, latest_key, read_json, read_latest, unique_key, write_json};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{DateTime, TimeZone, Utc};

    use forensics_contracts::{
        error::{ForensicsError, ForensicsResult},
        store::{ObjectSummary, PutOptions, SelectionScope},
    };

    use super::*;
    use crate::{keys::scoped_prefix, traits::BlobStore};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn object(key: &str, secs: i64) -> ObjectSummary {
        ObjectSummary {
            key: key.to_string(),
            last_modified: at(secs),
        }
    }

    /// A store that lists a fixed set of objects and records puts.
    struct ListingStore {
        objects: Vec<ObjectSummary>,
        puts: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl BlobStore for ListingStore {
        fn list(&self, prefix: &str) -> ForensicsResult<Vec<ObjectSummary>> {
            Ok(self
                .objects
                .iter()
                .filter(|o| o.key.starts_with(prefix))
                .cloned()
                .collect())
        }

        fn get(&self, key: &str) -> ForensicsResult<Vec<u8>> {
            self.puts
                .lock()
                .unwrap()
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, body)| body.clone())
                .ok_or_else(|| ForensicsError::upstream("blob store", format!("no such key {key}")))
        }

        fn put(&self, key: &str, body: &[u8], _options: PutOptions) -> ForensicsResult<()> {
            self.puts.lock().unwrap().push((key.to_string(), body.to_vec()));
            Ok(())
        }
    }

    // ── Latest selection ──────────────────────────────────────────────────────

    #[test]
    fn latest_picks_max_last_modified() {
        let objects = vec![object("a", 10), object("b", 30), object("c", 20)];
        assert_eq!(latest(&objects).unwrap().key, "b");
    }

    #[test]
    fn latest_tie_goes_to_first_supplied() {
        let objects = vec![object("a", 10), object("b", 30), object("c", 30)];
        assert_eq!(latest(&objects).unwrap().key, "b");

        let reversed = vec![object("c", 30), object("b", 30), object("a", 10)];
        assert_eq!(latest(&reversed).unwrap().key, "c");
    }

    #[test]
    fn latest_of_empty_is_none() {
        assert!(latest(&[]).is_none());
    }

    #[test]
    fn latest_key_reports_missing_prefix() {
        let store = ListingStore {
            objects: vec![object("logs/f/f_1.json", 1)],
            puts: Mutex::new(vec![]),
        };
        assert_eq!(latest_key(&store, "logs/").unwrap(), "logs/f/f_1.json");

        match latest_key(&store, "snapshots/") {
            Err(ForensicsError::NotFound { prefix }) => assert_eq!(prefix, "snapshots/"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn read_json_flags_undecodable_artifact() {
        let store = ListingStore {
            objects: vec![],
            puts: Mutex::new(vec![]),
        };
        store.put("logs/f/f_1.json", b"not json", PutOptions::default()).unwrap();

        let result: ForensicsResult<serde_json::Value> = read_json(&store, "logs/f/f_1.json");
        assert!(matches!(result, Err(ForensicsError::CorruptArtifact { .. })));
    }

    #[test]
    fn unique_key_suffixes_taken_keys() {
        let store = ListingStore {
            objects: vec![
                object("evidence/case-100.json", 1),
                object("evidence/case-100-2.json", 1),
            ],
            puts: Mutex::new(vec![]),
        };
        assert_eq!(unique_key(&store, "evidence/case-101.json").unwrap(), "evidence/case-101.json");
        assert_eq!(unique_key(&store, "evidence/case-100.json").unwrap(), "evidence/case-100-3.json");
    }

    // ── Key layout ────────────────────────────────────────────────────────────

    #[test]
    fn key_layout_matches_namespaces() {
        let ns = Namespaces::default();
        assert_eq!(ns.log_key("demo", 1700000000), "logs/demo/demo_1700000000.json");
        assert_eq!(
            ns.snapshot_key("demo", 1700000000),
            "snapshots/demo/demo_1700000000.json"
        );
        assert_eq!(
            ns.verdict_key("demo", 1700000000),
            "anomalies/demo/demo_1700000000.json"
        );
        assert_eq!(ns.evidence_key("case-1700000000"), "evidence/case-1700000000.json");
    }

    #[test]
    fn scoped_prefix_partitions_by_function() {
        assert_eq!(scoped_prefix("logs/", &SelectionScope::Global), "logs/");
        assert_eq!(
            scoped_prefix("logs/", &SelectionScope::function("demo")),
            "logs/demo/"
        );
        // A function whose name extends another's must not share its partition.
        assert!(!"logs/demo-2/demo-2_1.json".starts_with(&scoped_prefix(
            "logs/",
            &SelectionScope::function("demo")
        )));
    }

    // ── Configuration ─────────────────────────────────────────────────────────

    #[test]
    fn empty_toml_yields_defaults() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.thresholds.error_count, 0);
        assert_eq!(config.thresholds.avg_duration_ms, 12.0);
        assert_eq!(config.thresholds.total_invocations, 50);
        assert_eq!(config.window_minutes, 30);
        assert_eq!(config.selection, SelectionMode::PerFunction);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let toml = r#"
            selection = "global"

            [thresholds]
            total_invocations = 500
        "#;
        let config = PipelineConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.selection, SelectionMode::Global);
        assert_eq!(config.thresholds.total_invocations, 500);
        assert_eq!(config.thresholds.avg_duration_ms, 12.0);
        assert_eq!(config.namespaces.logs, "logs/");
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = PipelineConfig::from_toml_str("window_minutes = [").unwrap_err();
        assert!(matches!(err, ForensicsError::ConfigError { .. }));
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = PipelineConfig::from_toml_str("window_minutes = 0").unwrap_err();
        assert!(err.to_string().contains("window_minutes"));
    }

    #[test]
    fn namespace_without_trailing_slash_is_rejected() {
        let toml = r#"
            [namespaces]
            logs = "logs"
        "#;
        let err = PipelineConfig::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("logs"));
    }

    #[test]
    fn scope_resolution_follows_selection_mode() {
        let mut config = PipelineConfig::default();
        assert_eq!(
            config.scope(Some("demo")).unwrap(),
            SelectionScope::function("demo")
        );
        assert!(matches!(
            config.scope(None),
            Err(ForensicsError::InvalidInput { .. })
        ));

        config.selection = SelectionMode::Global;
        assert_eq!(config.scope(Some("demo")).unwrap(), SelectionScope::Global);
        assert_eq!(config.scope(None).unwrap(), SelectionScope::Global);
    }

    #[test]
    fn global_mode_yields_a_single_scope_for_any_batch() {
        let targets = vec!["a".to_string(), "b".to_string()];
        let mut config = PipelineConfig::default();
        assert_eq!(
            config.scopes(&targets),
            vec![SelectionScope::function("a"), SelectionScope::function("b")]
        );

        config.selection = SelectionMode::Global;
        assert_eq!(config.scopes(&targets), vec![SelectionScope::Global]);
        assert_eq!(SelectionScope::Global.to_string(), "(global)");
        assert_eq!(SelectionScope::function("a").to_string(), "a");
    }

    #[test]
    fn log_group_uses_prefix() {
        assert_eq!(PipelineConfig::default().log_group("demo"), "/aws/lambda/demo");
    }
}
