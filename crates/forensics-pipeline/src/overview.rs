//! Human-readable bundle overviews.

use forensics_contracts::anomaly::AnomalyVerdict;

/// The overview paragraph for a bundle about `function_name`.
///
/// Branches only on `verdict.anomaly_detected`.
pub fn generate_overview(function_name: &str, verdict: &AnomalyVerdict) -> String {
    if verdict.anomaly_detected {
        format!(
            "This forensic evidence bundle documents anomalous execution behavior \
             observed in the serverless function '{}'. The system detected abnormal \
             patterns including: {}. This evidence was collected automatically to \
             support post-incident forensic investigation in an ephemeral FaaS environment.",
            function_name,
            verdict.reason_summary()
        )
    } else {
        format!(
            "This forensic evidence bundle captures the configuration and runtime \
             behavior of the serverless function '{}' during normal execution. No \
             anomalous behavior was detected in the observed execution window. The \
             collected evidence establishes a forensic baseline for future analysis.",
            function_name
        )
    }
}
