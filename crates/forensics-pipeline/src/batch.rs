//! Per-function results of a batch stage run.

use forensics_contracts::error::ForensicsError;

/// A function whose stage run failed, with the reason.
#[derive(Debug)]
pub struct StageFailure {
    pub function_name: String,
    pub error: ForensicsError,
}

/// What a batch stage produced for each target function.
///
/// One function's failure never stops its siblings; it is recorded here
/// instead.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// `(function, artifact key)` for each success, in target order.
    pub written: Vec<(String, String)>,
    pub failed: Vec<StageFailure>,
}

impl BatchOutcome {
    pub fn record(&mut self, function_name: &str, result: Result<String, ForensicsError>) {
        match result {
            Ok(key) => self.written.push((function_name.to_string(), key)),
            Err(error) => self.failed.push(StageFailure {
                function_name: function_name.to_string(),
                error,
            }),
        }
    }

    /// True when there were targets and none of them succeeded.
    pub fn all_failed(&self) -> bool {
        self.written.is_empty() && !self.failed.is_empty()
    }
}
