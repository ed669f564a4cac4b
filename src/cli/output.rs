use serde::Serialize;

use crate::tasks::TaskReport;

/// Report printed once the task queue has drained.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub tasks: Vec<TaskReport>,
}

impl RunReport {
    /// True if every task succeeded.
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.tasks.iter().all(|t| t.ok)
    }
}

/// Format a result as minified JSON.
pub fn format_json<T: Serialize>(result: &T) -> String {
    serde_json::to_string(result).unwrap_or_else(|e| format_error(&e))
}

/// Format an error as JSON.
pub fn format_error(err: &dyn std::fmt::Display) -> String {
    serde_json::json!({ "error": err.to_string() }).to_string()
}
