//! Tool schema types and JSON Schema validation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;

use crate::calendar::CalendarCapability;
use crate::error::{ScheduleError, ScheduleResult};
use crate::settings::SchedulerConfig;

/// Handler type: takes JSON args + execution context, resolves to a JSON result.
pub type ToolHandler = Box<
    dyn for<'a> Fn(&'a serde_json::Value, &'a ToolContext) -> BoxFuture<'a, ScheduleResult<serde_json::Value>>
        + Send
        + Sync,
>;

/// Context passed to tool handlers.
pub struct ToolContext {
    pub calendar: Arc<dyn CalendarCapability>,
    pub config: SchedulerConfig,
    /// Reference instant for relative date resolution. `None` means the wall
    /// clock; tests pin it for determinism.
    pub reference_now: Option<DateTime<Utc>>,
}

impl ToolContext {
    pub fn new(calendar: Arc<dyn CalendarCapability>, config: SchedulerConfig) -> Self {
        Self {
            calendar,
            config,
            reference_now: None,
        }
    }

    pub fn with_reference_now(mut self, now: DateTime<Utc>) -> Self {
        self.reference_now = Some(now);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.reference_now.unwrap_or_else(Utc::now)
    }
}

/// Complete tool definition: schema plus handler.
pub struct ToolDefinition {
    /// Unique identifier for this tool.
    pub tool_id: String,
    /// One-line description surfaced to the invoking agent.
    pub description: String,
    /// JSON Schema for validating input arguments.
    pub input_schema: serde_json::Value,
    /// The handler function to execute.
    pub handler: ToolHandler,
}

/// Validate a JSON value against a minimal JSON Schema subset.
///
/// Supports: `type`, `required`, `properties` (recursive), `minimum` for
/// integers. An empty schema `{}` passes anything.
pub fn validate_schema(value: &serde_json::Value, schema: &serde_json::Value) -> ScheduleResult<()> {
    let schema_obj = match schema.as_object() {
        Some(obj) => obj,
        None => return Ok(()),
    };

    if schema_obj.is_empty() {
        return Ok(());
    }

    if let Some(type_val) = schema_obj.get("type") {
        let type_str = type_val.as_str().ok_or_else(|| {
            ScheduleError::InvalidInput("schema 'type' must be a string".to_string())
        })?;

        let matches = match type_str {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "integer" => value.is_i64() || value.is_u64(),
            "boolean" => value.is_boolean(),
            "object" => value.is_object(),
            "array" => value.is_array(),
            "null" => value.is_null(),
            other => {
                return Err(ScheduleError::InvalidInput(format!(
                    "unknown schema type: {other}"
                )));
            }
        };

        if !matches {
            return Err(ScheduleError::InvalidInput(format!(
                "expected type '{type_str}', got {}",
                json_type_name(value)
            )));
        }
    }

    if let Some(minimum) = schema_obj.get("minimum").and_then(|m| m.as_i64()) {
        if let Some(actual) = value.as_i64() {
            if actual < minimum {
                return Err(ScheduleError::InvalidInput(format!(
                    "value {actual} is below the minimum of {minimum}"
                )));
            }
        }
    }

    // Required fields (only meaningful for objects)
    if let Some(required) = schema_obj.get("required") {
        if let Some(required_arr) = required.as_array() {
            if let Some(obj) = value.as_object() {
                for req in required_arr {
                    if let Some(key) = req.as_str() {
                        if !obj.contains_key(key) {
                            return Err(ScheduleError::InvalidInput(format!(
                                "missing required field: '{key}'"
                            )));
                        }
                    }
                }
            }
        }
    }

    // Recursively validate properties
    if let Some(properties) = schema_obj.get("properties") {
        if let (Some(props_obj), Some(val_obj)) = (properties.as_object(), value.as_object()) {
            for (key, prop_schema) in props_obj {
                if let Some(prop_value) = val_obj.get(key) {
                    validate_schema(prop_value, prop_schema)?;
                }
            }
        }
    }

    Ok(())
}

/// Returns a human-readable name for the JSON type of a value.
fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "number"
            }
        }
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
