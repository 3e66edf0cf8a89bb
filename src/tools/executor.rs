//! Tool execution pipeline.

use chrono::Utc;
use tracing::{info, warn};

use crate::error::{ScheduleError, ScheduleResult};

use super::invocation::{InvocationStatus, ToolInvocation};
use super::registry::ToolRegistry;
use super::schema::{validate_schema, ToolContext};

/// Result of a successful tool execution.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// The JSON value returned by the tool handler.
    pub result: serde_json::Value,
    /// The invocation record capturing timing and status.
    pub invocation: ToolInvocation,
}

/// Execute a tool through the full pipeline: lookup, validate, run, record.
pub async fn execute_tool(
    registry: &ToolRegistry,
    ctx: &ToolContext,
    tool_id: &str,
    args: serde_json::Value,
) -> ScheduleResult<ExecutionResult> {
    let tool = registry
        .lookup(tool_id)
        .ok_or_else(|| ScheduleError::InvalidInput(format!("unknown tool: '{tool_id}'")))?;

    validate_schema(&args, &tool.input_schema)?;

    let started_at = Utc::now();
    let handler_result = (tool.handler)(&args, ctx).await;
    let ended_at = Utc::now();

    match handler_result {
        Ok(result) => {
            let invocation = ToolInvocation::new(
                tool_id.to_string(),
                started_at,
                ended_at,
                InvocationStatus::Success,
            );
            info!(tool_id, duration_ms = invocation.duration_ms, "tool executed");
            Ok(ExecutionResult { result, invocation })
        }
        Err(e) => {
            let mut invocation = ToolInvocation::new(
                tool_id.to_string(),
                started_at,
                ended_at,
                InvocationStatus::Failed,
            );
            invocation.error = Some(e.to_string());
            warn!(tool_id, error = %e, "tool failed");
            Err(e)
        }
    }
}
