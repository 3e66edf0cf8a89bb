//! The calendar tool surface: create, list, delete, auto-schedule.

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

use crate::error::{ScheduleError, ScheduleResult};
use crate::interval::TimeInterval;
use crate::orchestrator::{Orchestrator, ScheduleInput};
use crate::types::MeetingRequest;

use super::registry::ToolRegistry;
use super::schema::{ToolContext, ToolDefinition};

/// Register the four calendar tools into `registry`.
pub fn register_calendar_tools(registry: &mut ToolRegistry) {
    registry.register(create_meeting_tool());
    registry.register(list_meetings_tool());
    registry.register(delete_meeting_tool());
    registry.register(auto_schedule_meeting_tool());
}

fn create_meeting_tool() -> ToolDefinition {
    ToolDefinition {
        tool_id: "create_meeting".to_string(),
        description: "Create a calendar event at an explicit start and end time".to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["summary", "start_time", "end_time"],
            "properties": {
                "summary": {"type": "string"},
                "start_time": {"type": "string"},
                "end_time": {"type": "string"},
                "attendees": {"type": "array"}
            }
        }),
        handler: Box::new(|args, ctx| {
            Box::pin(async move {
                let summary = require_str(args, "summary")?;
                let start = require_instant(args, "start_time")?;
                let end = require_instant(args, "end_time")?;
                let interval = TimeInterval::new(start, end)?;
                let attendees = optional_string_list(args, "attendees")?;

                let orch = Orchestrator::new(ctx.calendar.as_ref(), &ctx.config);
                let meeting = orch.create_meeting(summary, &interval, &attendees).await?;
                to_json(&meeting)
            })
        }),
    }
}

fn list_meetings_tool() -> ToolDefinition {
    ToolDefinition {
        tool_id: "list_meetings".to_string(),
        description: "List calendar events in a time range, defaulting to the \
                      configured search horizon from now"
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "start_time": {"type": "string"},
                "end_time": {"type": "string"}
            }
        }),
        handler: Box::new(|args, ctx| {
            Box::pin(async move {
                let start = optional_instant(args, "start_time")?.unwrap_or_else(|| ctx.now());
                let end = match optional_instant(args, "end_time")? {
                    Some(end) => end,
                    None => horizon_end(start, ctx)?,
                };
                let window = TimeInterval::new(start, end)?;

                let orch = Orchestrator::new(ctx.calendar.as_ref(), &ctx.config);
                let meetings = orch.list_meetings(&window).await?;
                Ok(json!({
                    "count": meetings.len(),
                    "meetings": to_json(&meetings)?,
                }))
            })
        }),
    }
}

fn delete_meeting_tool() -> ToolDefinition {
    ToolDefinition {
        tool_id: "delete_meeting".to_string(),
        description: "Delete a calendar event by its event id".to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["event_id"],
            "properties": {
                "event_id": {"type": "string"}
            }
        }),
        handler: Box::new(|args, ctx| {
            Box::pin(async move {
                let event_id = require_str(args, "event_id")?;
                let orch = Orchestrator::new(ctx.calendar.as_ref(), &ctx.config);
                orch.delete_meeting(event_id).await?;
                Ok(json!({"deleted": true, "event_id": event_id}))
            })
        }),
    }
}

fn auto_schedule_meeting_tool() -> ToolDefinition {
    ToolDefinition {
        tool_id: "auto_schedule_meeting".to_string(),
        description: "Find a free slot for a meeting and create it. Accepts \
                      either a natural-language expression or explicit bounds"
            .to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["summary"],
            "properties": {
                "summary": {"type": "string"},
                "duration_minutes": {"type": "integer", "minimum": 1},
                "earliest": {"type": "string"},
                "latest": {"type": "string"},
                "expression": {"type": "string"},
                "attendees": {"type": "array"}
            }
        }),
        handler: Box::new(|args, ctx| {
            Box::pin(async move {
                let summary = require_str(args, "summary")?;
                let input = resolve_schedule_input(args, ctx, summary)?;

                let orch = Orchestrator::new(ctx.calendar.as_ref(), &ctx.config);
                let meeting = orch.auto_schedule(input).await?;
                to_json(&meeting)
            })
        }),
    }
}

/// Build the scheduling input from the tool arguments.
///
/// An expression and explicit bounds are mutually exclusive; mixing them would
/// leave the winning window unclear to the invoking agent.
fn resolve_schedule_input(
    args: &Value,
    ctx: &ToolContext,
    summary: &str,
) -> ScheduleResult<ScheduleInput> {
    let attendees = optional_string_list(args, "attendees")?;

    if let Some(expression) = args.get("expression").and_then(|v| v.as_str()) {
        for key in ["earliest", "latest", "duration_minutes"] {
            if args.get(key).is_some() {
                return Err(ScheduleError::InvalidInput(format!(
                    "'expression' cannot be combined with '{key}'"
                )));
            }
        }
        return Ok(ScheduleInput::Natural {
            summary: summary.to_string(),
            expression: expression.to_string(),
            reference_now: ctx.now(),
            attendees,
        });
    }

    let duration = match args.get("duration_minutes").and_then(|v| v.as_i64()) {
        Some(minutes) => Duration::try_minutes(minutes).ok_or_else(|| {
            ScheduleError::InvalidInput(format!("'duration_minutes' out of range: {minutes}"))
        })?,
        None => ctx.config.default_duration,
    };
    let earliest = optional_instant(args, "earliest")?.unwrap_or_else(|| ctx.now());
    let latest = match optional_instant(args, "latest")? {
        Some(latest) => latest,
        None => horizon_end(earliest, ctx)?,
    };
    let window = TimeInterval::new(earliest, latest)?;

    Ok(ScheduleInput::Explicit(
        MeetingRequest::new(summary, duration, window)?.with_attendees(attendees),
    ))
}

/// Default window end: the configured search horizon past `start`.
fn horizon_end(start: DateTime<Utc>, ctx: &ToolContext) -> ScheduleResult<DateTime<Utc>> {
    start
        .checked_add_signed(ctx.config.search_horizon)
        .ok_or_else(|| {
            ScheduleError::InvalidInput("search window end overflows the calendar".to_string())
        })
}

fn optional_string_list(args: &Value, key: &str) -> ScheduleResult<Vec<String>> {
    match args.get(key) {
        None => Ok(Vec::new()),
        Some(value) => value
            .as_array()
            .and_then(|items| {
                items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .ok_or_else(|| {
                ScheduleError::InvalidInput(format!("'{key}' must be an array of strings"))
            }),
    }
}

fn require_str<'a>(args: &'a Value, key: &str) -> ScheduleResult<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ScheduleError::InvalidInput(format!("missing string argument: '{key}'")))
}

fn require_instant(args: &Value, key: &str) -> ScheduleResult<DateTime<Utc>> {
    parse_instant(require_str(args, key)?, key)
}

fn optional_instant(args: &Value, key: &str) -> ScheduleResult<Option<DateTime<Utc>>> {
    match args.get(key).and_then(|v| v.as_str()) {
        Some(raw) => Ok(Some(parse_instant(raw, key)?)),
        None => Ok(None),
    }
}

fn parse_instant(raw: &str, key: &str) -> ScheduleResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ScheduleError::InvalidInput(format!("'{key}' is not RFC 3339: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> ScheduleResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| ScheduleError::InvalidInput(format!("result encoding failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::InMemoryCalendar;
    use crate::settings::{SchedulerConfig, SchedulerSettings};
    use crate::tools::executor::execute_tool;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        register_calendar_tools(&mut registry);
        registry
    }

    fn pinned_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn ctx_with(calendar: Arc<InMemoryCalendar>) -> ToolContext {
        ToolContext::new(calendar, SchedulerConfig::default()).with_reference_now(pinned_now())
    }

    #[test]
    fn all_four_tools_register() {
        assert_eq!(
            registry().tool_ids(),
            vec![
                "auto_schedule_meeting",
                "create_meeting",
                "delete_meeting",
                "list_meetings"
            ]
        );
    }

    #[tokio::test]
    async fn create_meeting_roundtrip() {
        let cal = Arc::new(InMemoryCalendar::new());
        let ctx = ctx_with(cal.clone());

        let result = execute_tool(
            &registry(),
            &ctx,
            "create_meeting",
            json!({
                "summary": "standup",
                "start_time": "2024-03-01T10:00:00Z",
                "end_time": "2024-03-01T10:30:00Z"
            }),
        )
        .await
        .unwrap();

        assert_eq!(result.result["summary"], "standup");
        assert!(result.result["event_id"].is_string());
        assert_eq!(cal.events().len(), 1);
    }

    #[tokio::test]
    async fn create_meeting_rejects_missing_end_time() {
        let ctx = ctx_with(Arc::new(InMemoryCalendar::new()));
        let err = execute_tool(
            &registry(),
            &ctx,
            "create_meeting",
            json!({"summary": "standup", "start_time": "2024-03-01T10:00:00Z"}),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn create_meeting_rejects_bad_timestamp() {
        let ctx = ctx_with(Arc::new(InMemoryCalendar::new()));
        let err = execute_tool(
            &registry(),
            &ctx,
            "create_meeting",
            json!({
                "summary": "standup",
                "start_time": "next tuesday",
                "end_time": "2024-03-01T10:30:00Z"
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn list_meetings_defaults_to_search_horizon() {
        let cal = Arc::new(InMemoryCalendar::new());
        let in_range = TimeInterval::new(
            pinned_now() + Duration::hours(1),
            pinned_now() + Duration::hours(2),
        )
        .unwrap();
        let out_of_range = TimeInterval::new(
            pinned_now() + Duration::days(30),
            pinned_now() + Duration::days(30) + Duration::hours(1),
        )
        .unwrap();
        cal.seed_event("soon", in_range);
        cal.seed_event("distant", out_of_range);

        let ctx = ctx_with(cal);
        let result = execute_tool(&registry(), &ctx, "list_meetings", json!({}))
            .await
            .unwrap();

        assert_eq!(result.result["count"], 1);
        assert_eq!(result.result["meetings"][0]["summary"], "soon");
    }

    #[tokio::test]
    async fn delete_meeting_by_id() {
        let cal = Arc::new(InMemoryCalendar::new());
        let interval = TimeInterval::new(
            pinned_now() + Duration::hours(1),
            pinned_now() + Duration::hours(2),
        )
        .unwrap();
        let id = cal.seed_event("standup", interval);

        let ctx = ctx_with(cal.clone());
        let result = execute_tool(&registry(), &ctx, "delete_meeting", json!({"event_id": id}))
            .await
            .unwrap();

        assert_eq!(result.result["deleted"], true);
        assert!(cal.events().is_empty());
    }

    #[tokio::test]
    async fn auto_schedule_with_explicit_bounds() {
        let cal = Arc::new(InMemoryCalendar::new());
        let ctx = ctx_with(cal.clone());

        let result = execute_tool(
            &registry(),
            &ctx,
            "auto_schedule_meeting",
            json!({
                "summary": "planning",
                "duration_minutes": 60,
                "earliest": "2024-03-01T09:00:00Z",
                "latest": "2024-03-01T17:00:00Z"
            }),
        )
        .await
        .unwrap();

        // Empty calendar: earliest working-hours fit wins.
        assert_eq!(result.result["interval"]["start"], "2024-03-01T09:00:00Z");
        assert_eq!(cal.events().len(), 1);
    }

    #[tokio::test]
    async fn auto_schedule_with_expression() {
        let cal = Arc::new(InMemoryCalendar::new());
        let ctx = ctx_with(cal.clone());

        let result = execute_tool(
            &registry(),
            &ctx,
            "auto_schedule_meeting",
            json!({"summary": "1:1", "expression": "tomorrow at 2pm"}),
        )
        .await
        .unwrap();

        assert_eq!(result.result["interval"]["start"], "2024-03-02T14:00:00Z");
        assert_eq!(cal.events().len(), 1);
    }

    #[tokio::test]
    async fn create_meeting_passes_attendees_to_the_provider() {
        let cal = Arc::new(InMemoryCalendar::new());
        let ctx = ctx_with(cal.clone());

        let result = execute_tool(
            &registry(),
            &ctx,
            "create_meeting",
            json!({
                "summary": "review",
                "start_time": "2024-03-01T10:00:00Z",
                "end_time": "2024-03-01T10:30:00Z",
                "attendees": ["ana@example.com", "bo@example.com"]
            }),
        )
        .await
        .unwrap();

        assert_eq!(result.result["attendees"][0], "ana@example.com");
        assert_eq!(
            cal.events()[0].attendees,
            vec!["ana@example.com".to_string(), "bo@example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn non_string_attendee_entries_are_rejected() {
        let ctx = ctx_with(Arc::new(InMemoryCalendar::new()));
        let err = execute_tool(
            &registry(),
            &ctx,
            "create_meeting",
            json!({
                "summary": "review",
                "start_time": "2024-03-01T10:00:00Z",
                "end_time": "2024-03-01T10:30:00Z",
                "attendees": ["ana@example.com", 42]
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn auto_schedule_carries_attendees_into_the_event() {
        let cal = Arc::new(InMemoryCalendar::new());
        let ctx = ctx_with(cal.clone());

        execute_tool(
            &registry(),
            &ctx,
            "auto_schedule_meeting",
            json!({
                "summary": "planning",
                "earliest": "2024-03-01T09:00:00Z",
                "latest": "2024-03-01T17:00:00Z",
                "attendees": ["ana@example.com"]
            }),
        )
        .await
        .unwrap();

        assert_eq!(cal.events()[0].attendees, vec!["ana@example.com".to_string()]);
    }

    #[tokio::test]
    async fn out_of_range_duration_is_invalid_input_not_a_panic() {
        let ctx = ctx_with(Arc::new(InMemoryCalendar::new()));
        let err = execute_tool(
            &registry(),
            &ctx,
            "auto_schedule_meeting",
            json!({
                "summary": "planning",
                "duration_minutes": i64::MAX,
                "earliest": "2024-03-01T09:00:00Z",
                "latest": "2024-03-01T17:00:00Z"
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn auto_schedule_rejects_expression_plus_bounds() {
        let ctx = ctx_with(Arc::new(InMemoryCalendar::new()));
        let err = execute_tool(
            &registry(),
            &ctx,
            "auto_schedule_meeting",
            json!({
                "summary": "1:1",
                "expression": "tomorrow at 2pm",
                "earliest": "2024-03-01T09:00:00Z"
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn auto_schedule_fully_booked_reports_no_slot() {
        let cal = Arc::new(InMemoryCalendar::new());
        cal.seed_event(
            "offsite",
            TimeInterval::new(
                Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap(),
            )
            .unwrap(),
        );

        let ctx = ctx_with(cal.clone());
        let err = execute_tool(
            &registry(),
            &ctx,
            "auto_schedule_meeting",
            json!({
                "summary": "planning",
                "earliest": "2024-03-01T09:00:00Z",
                "latest": "2024-03-01T17:00:00Z"
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err, ScheduleError::NoSlotAvailable);
        assert_eq!(cal.events().len(), 1);
    }

    #[tokio::test]
    async fn timezone_config_shapes_auto_schedule() {
        // Working hours 09:00-17:00 New York; an all-UTC-morning window has no
        // local working time before 14:00 UTC.
        let settings = SchedulerSettings {
            timezone: "America/New_York".to_string(),
            ..Default::default()
        };
        let config = settings.resolve().unwrap();
        let cal = Arc::new(InMemoryCalendar::new());
        let ctx = ToolContext::new(cal, config).with_reference_now(pinned_now());

        let err = execute_tool(
            &registry(),
            &ctx,
            "auto_schedule_meeting",
            json!({
                "summary": "planning",
                "earliest": "2024-03-01T09:00:00Z",
                "latest": "2024-03-01T13:00:00Z"
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err, ScheduleError::NoSlotAvailable);
    }
}
