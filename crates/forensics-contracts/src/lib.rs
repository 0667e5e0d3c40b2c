//! # forensics-contracts
//!
//! Shared artifact types and error contracts for the FaaS forensics pipeline.
//!
//! Every crate in the workspace imports from here. No business logic lives in
//! this crate, only the persisted data model and the error type.

pub mod anomaly;
pub mod bundle;
pub mod error;
pub mod logs;
pub mod snapshot;
pub mod store;

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use anomaly::{AnomalyReason, AnomalyVerdict};
    use bundle::{BundleContents, EvidenceBundle};
    use error::ForensicsError;
    use logs::{LogArtifact, ParsedSummary};
    use snapshot::{ConfigSnapshot, FunctionConfiguration, RoleDetails};
    use store::SelectionScope;

    fn snapshot(role_details: RoleDetails) -> ConfigSnapshot {
        ConfigSnapshot {
            function_name: Some("demo-func".to_string()),
            function_arn: None,
            runtime: Some("python3.12".to_string()),
            handler: None,
            memory_size: Some(128),
            timeout: Some(3),
            last_modified: None,
            description: None,
            role_details,
            environment_variables: Default::default(),
            tracing_config: None,
            vpc_config: None,
            code_info: None,
            revision_id: None,
            kms_key_arn: None,
            state: None,
            package_type: None,
            architectures: None,
            ephemeral_storage: Default::default(),
            snapshot_timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    // ── AnomalyVerdict ───────────────────────────────────────────────────────

    #[test]
    fn verdict_flag_follows_reasons() {
        let ts = Utc::now();
        let clean = AnomalyVerdict::new("f", vec![], ts);
        assert!(!clean.anomaly_detected);
        assert!(clean.is_consistent());

        let flagged = AnomalyVerdict::new("f", vec![AnomalyReason::ErrorCount], ts);
        assert!(flagged.anomaly_detected);
        assert!(flagged.is_consistent());
    }

    #[test]
    fn verdict_inconsistency_is_detectable() {
        let mut verdict = AnomalyVerdict::new("f", vec![], Utc::now());
        verdict.anomaly_detected = true;
        assert!(!verdict.is_consistent());
    }

    #[test]
    fn reasons_serialize_as_messages() {
        let verdict = AnomalyVerdict::new(
            "f",
            vec![AnomalyReason::ErrorCount, AnomalyReason::InvocationFrequency],
            Utc::now(),
        );
        let value = serde_json::to_value(&verdict).unwrap();
        assert_eq!(
            value["reasons"],
            json!(["Error count exceeded threshold", "High invocation frequency detected"])
        );
        assert_eq!(
            verdict.reason_summary(),
            "Error count exceeded threshold, High invocation frequency detected"
        );
    }

    // ── Artifacts ────────────────────────────────────────────────────────────

    #[test]
    fn log_artifact_tolerates_missing_summary_fields() {
        let artifact: LogArtifact = serde_json::from_value(json!({
            "function_name": "f",
            "timestamp": 1700000000,
            "parsed_summary": { "error_count": 2 }
        }))
        .unwrap();

        assert_eq!(artifact.parsed_summary.error_count, 2);
        assert_eq!(artifact.parsed_summary.avg_duration_ms, None);
        assert_eq!(artifact.parsed_summary.total_invocations, 0);
        assert_eq!(artifact.raw_event_count, 0);
    }

    #[test]
    fn empty_configuration_decodes_to_all_absent() {
        let config: FunctionConfiguration = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, FunctionConfiguration::default());
    }

    #[test]
    fn configuration_decodes_pascal_case_fields() {
        let config: FunctionConfiguration = serde_json::from_value(json!({
            "FunctionName": "f",
            "MemorySize": 256,
            "KMSKeyArn": "arn:kms:key/1",
            "Environment": { "Variables": { "STAGE": "prod" } }
        }))
        .unwrap();

        assert_eq!(config.function_name.as_deref(), Some("f"));
        assert_eq!(config.memory_size, Some(256));
        assert_eq!(config.kms_key_arn.as_deref(), Some("arn:kms:key/1"));
        assert_eq!(
            config.environment.unwrap().variables.get("STAGE").map(String::as_str),
            Some("prod")
        );
    }

    #[test]
    fn snapshot_uses_pascal_case_and_nulls() {
        let value = serde_json::to_value(snapshot(RoleDetails::Unresolved {
            role_arn: None,
            error: "no role".to_string(),
        }))
        .unwrap();

        assert_eq!(value["FunctionName"], "demo-func");
        assert_eq!(value["KMSKeyArn"], serde_json::Value::Null);
        assert_eq!(value["EnvironmentVariables"], json!({}));
        assert_eq!(value["EphemeralStorage"], json!({}));
        assert_eq!(value["RoleDetails"], json!({ "RoleArn": null, "Error": "no role" }));
    }

    #[test]
    fn role_details_decodes_both_shapes() {
        let resolved: RoleDetails = serde_json::from_value(json!({
            "RoleName": "exec-role",
            "Arn": "arn:aws:iam::1:role/exec-role",
            "CreateDate": "2024-01-01",
            "AssumeRolePolicyDocument": { "Version": "2012-10-17" }
        }))
        .unwrap();
        assert!(resolved.is_resolved());

        let degraded: RoleDetails = serde_json::from_value(json!({
            "RoleArn": "arn:aws:iam::1:role/gone",
            "Error": "NoSuchEntity"
        }))
        .unwrap();
        assert!(!degraded.is_resolved());
    }

    // ── EvidenceBundle ───────────────────────────────────────────────────────

    #[test]
    fn bundle_serializes_digest_flat_and_last() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let bundle = EvidenceBundle {
            contents: BundleContents {
                case_id: "case-1714564800".to_string(),
                overview: "baseline".to_string(),
                function_name: "demo-func".to_string(),
                configuration_snapshot: snapshot(RoleDetails::Unresolved {
                    role_arn: None,
                    error: "no role".to_string(),
                }),
                runtime_logs: LogArtifact {
                    function_name: "demo-func".to_string(),
                    timestamp: 1714564800,
                    parsed_summary: ParsedSummary::default(),
                    raw_event_count: 0,
                },
                anomaly_report: AnomalyVerdict::new("demo-func", vec![], ts),
                created_at: ts,
            },
            sha256_hash: "ab".repeat(32),
        };

        let text = serde_json::to_string(&bundle).unwrap();
        assert!(text.ends_with(&format!("\"sha256_hash\":\"{}\"}}", "ab".repeat(32))));

        let decoded: EvidenceBundle = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, bundle);
    }

    #[test]
    fn selection_scope_exposes_function() {
        assert_eq!(SelectionScope::Global.function_name(), None);
        assert_eq!(SelectionScope::function("f").function_name(), Some("f"));
    }

    // ── ForensicsError display messages ──────────────────────────────────────

    #[test]
    fn error_upstream_display() {
        let msg = ForensicsError::upstream("log store", "throttled").to_string();
        assert!(msg.contains("log store"));
        assert!(msg.contains("throttled"));
    }

    #[test]
    fn error_not_found_display() {
        let err = ForensicsError::NotFound {
            prefix: "snapshots/".to_string(),
        };
        assert!(err.to_string().contains("snapshots/"));
    }

    #[test]
    fn error_integrity_display() {
        let err = ForensicsError::IntegrityMismatch {
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("integrity mismatch"));
        assert!(msg.contains("aa"));
        assert!(msg.contains("bb"));
    }
}
