//! Tool invocation records capturing execution metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationStatus {
    /// The tool executed successfully.
    Success,
    /// The tool execution failed.
    Failed,
}

/// Record of a single tool invocation, capturing timing and status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Identifier of the tool that was invoked.
    pub tool_id: String,
    /// When the invocation started.
    pub started_at: DateTime<Utc>,
    /// When the invocation ended.
    pub ended_at: DateTime<Utc>,
    /// Duration of the invocation in milliseconds.
    pub duration_ms: u64,
    /// Outcome of the invocation.
    pub status: InvocationStatus,
    /// Error message if the invocation failed.
    pub error: Option<String>,
}

impl ToolInvocation {
    /// Create a new invocation record from start/end times.
    ///
    /// Computes `duration_ms` from the difference between `ended_at` and
    /// `started_at`, clamping a backwards clock to zero.
    pub fn new(
        tool_id: String,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        status: InvocationStatus,
    ) -> Self {
        let duration_ms = (ended_at - started_at).num_milliseconds().max(0) as u64;
        Self {
            tool_id,
            started_at,
            ended_at,
            duration_ms,
            status,
            error: None,
        }
    }
}
