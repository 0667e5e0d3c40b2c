//! Metric extraction over a batch of log events.
//!
//! Single pass, order-independent:
//!
//! - an event is an error if its message contains `ERROR`, `Exception`, or
//!   `Traceback` (case-sensitive), counted once however many match
//! - an event carries a duration if its message contains both `Duration:`
//!   and `ms`; the value is the first whitespace-delimited token after the
//!   first `Duration:`. Tokens that do not parse as a finite number are
//!   skipped
//! - every event counts as one invocation

use tracing::debug;

use forensics_contracts::logs::{LogEvent, ParsedSummary};

const ERROR_MARKERS: [&str; 3] = ["ERROR", "Exception", "Traceback"];
const DURATION_MARKER: &str = "Duration:";

pub fn is_error(message: &str) -> bool {
    ERROR_MARKERS.iter().any(|marker| message.contains(marker))
}

/// The duration a message reports, if it reports a parsable one.
pub fn parse_duration(message: &str) -> Option<f64> {
    if !(message.contains(DURATION_MARKER) && message.contains("ms")) {
        return None;
    }
    let (_, rest) = message.split_once(DURATION_MARKER)?;
    let token = rest.split_whitespace().next()?;
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            debug!(token = %token, "skipping unparsable duration");
            None
        }
    }
}

/// Round to 2 decimal places.
///
/// Rounds the exact binary value with ties to even, so `1.125` gives `1.12`
/// and `1.115` (stored just below) gives `1.11`.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Extract the summary metrics from `events`.
pub fn summarize(events: &[LogEvent]) -> ParsedSummary {
    let mut error_count = 0u64;
    let mut duration_sum = 0.0f64;
    let mut duration_count = 0u64;

    for event in events {
        if is_error(&event.message) {
            error_count += 1;
        }
        if let Some(duration) = parse_duration(&event.message) {
            duration_sum += duration;
            duration_count += 1;
        }
    }

    ParsedSummary {
        error_count,
        avg_duration_ms: (duration_count > 0)
            .then(|| round2(duration_sum / duration_count as f64)),
        total_invocations: events.len() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(messages: &[&str]) -> Vec<LogEvent> {
        messages
            .iter()
            .enumerate()
            .map(|(i, m)| LogEvent::new(i as i64, *m))
            .collect()
    }

    #[test]
    fn duration_is_first_token_after_marker() {
        assert_eq!(parse_duration("Duration: 45.67 ms Billed Duration: 46 ms"), Some(45.67));
        assert_eq!(
            parse_duration("REPORT RequestId: x\tDuration: 3.10 ms\tBilled Duration: 4 ms"),
            Some(3.1)
        );
    }

    #[test]
    fn malformed_duration_is_skipped() {
        assert_eq!(parse_duration("Duration: abc ms"), None);
        assert_eq!(parse_duration("Duration: NaN ms"), None);
        assert_eq!(parse_duration("Duration:"), None);
    }

    #[test]
    fn duration_requires_both_markers() {
        assert_eq!(parse_duration("Duration: 12.0 seconds"), None);
        assert_eq!(parse_duration("took 12 ms"), None);
    }

    #[test]
    fn errors_counted_once_per_event() {
        let summary = summarize(&batch(&[
            "ERROR Exception Traceback all at once",
            "Exception: boom",
            "error in lowercase is not an error",
            "fine",
        ]));
        assert_eq!(summary.error_count, 2);
    }

    #[test]
    fn invocations_equal_batch_size() {
        let messages: Vec<String> = (0..37).map(|i| format!("line {i}")).collect();
        let refs: Vec<&str> = messages.iter().map(String::as_str).collect();
        let summary = summarize(&batch(&refs));
        assert_eq!(summary.total_invocations, 37);
        assert_eq!(summary.error_count, 0);
        assert_eq!(summary.avg_duration_ms, None);
    }

    #[test]
    fn average_is_rounded_mean_of_parsed_durations() {
        let summary = summarize(&batch(&[
            "Duration: 10.0 ms",
            "Duration: 20.0 ms",
            "Duration: 15.0 ms",
            "Duration: abc ms",
        ]));
        assert_eq!(summary.avg_duration_ms, Some(15.0));
        assert_eq!(summary.total_invocations, 4);
        assert_eq!(summary.error_count, 0);

        let uneven = summarize(&batch(&["Duration: 1.0 ms", "Duration: 1.0 ms", "Duration: 2.0 ms"]));
        assert_eq!(uneven.avg_duration_ms, Some(1.33));
    }

    #[test]
    fn rounding_uses_exact_value_with_ties_to_even() {
        assert_eq!(round2(1.125), 1.12);
        assert_eq!(round2(1.115), 1.11);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(8.0 / 3.0), 2.67);
        assert_eq!(round2(64.078_947), 64.08);
    }

    #[test]
    fn average_of_two_decimal_durations_rounds_half_to_even() {
        let summary = summarize(&batch(&["Duration: 1.25 ms", "Duration: 1.00 ms"]));
        assert_eq!(summary.avg_duration_ms, Some(1.12));
    }

    #[test]
    fn empty_batch_has_no_average() {
        assert_eq!(summarize(&[]), ParsedSummary::default());
    }
}
