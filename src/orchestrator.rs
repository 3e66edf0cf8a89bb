//! End-to-end auto-scheduling pipeline.
//!
//! Straight-line flow: resolve the request, fetch busy intervals, compute free
//! intervals, select a slot, create the event. One attempt per call; a
//! conflicting concurrent write surfaces as a provider error and the caller
//! decides whether to try again.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::availability::FreeSlots;
use crate::calendar::CalendarCapability;
use crate::error::ScheduleResult;
use crate::interval::TimeInterval;
use crate::parser;
use crate::selector;
use crate::settings::SchedulerConfig;
use crate::types::{MeetingRequest, ScheduledMeeting};

/// How the meeting's search window and duration were specified.
#[derive(Debug, Clone)]
pub enum ScheduleInput {
    /// Explicit window and duration, already validated.
    Explicit(MeetingRequest),
    /// Natural-language expression, resolved against `reference_now` in the
    /// configured timezone.
    Natural {
        summary: String,
        expression: String,
        reference_now: DateTime<Utc>,
        attendees: Vec<String>,
    },
}

/// Drives one scheduling attempt over an injected calendar capability.
pub struct Orchestrator<'a> {
    calendar: &'a dyn CalendarCapability,
    config: &'a SchedulerConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(calendar: &'a dyn CalendarCapability, config: &'a SchedulerConfig) -> Self {
        Self { calendar, config }
    }

    /// Resolve the input into a concrete [`MeetingRequest`].
    pub fn resolve_request(&self, input: ScheduleInput) -> ScheduleResult<MeetingRequest> {
        match input {
            ScheduleInput::Explicit(request) => Ok(request),
            ScheduleInput::Natural {
                summary,
                expression,
                reference_now,
                attendees,
            } => {
                let local_now = reference_now.with_timezone(&self.config.timezone);
                let parsed = parser::parse(&expression, local_now, self.config.default_duration)?;
                debug!(
                    window_start = %parsed.window.start(),
                    window_end = %parsed.window.end(),
                    "parsed time expression"
                );
                Ok(MeetingRequest::new(summary, parsed.duration, parsed.window)?
                    .with_attendees(attendees))
            }
        }
    }

    /// Find a free slot for the request and create the event there.
    ///
    /// Busy intervals are fetched fresh on every call. If no slot fits, no
    /// event is created and [`ScheduleError::NoSlotAvailable`] is returned;
    /// if the create itself fails, nothing is retried.
    ///
    /// [`ScheduleError::NoSlotAvailable`]: crate::error::ScheduleError::NoSlotAvailable
    pub async fn auto_schedule(&self, input: ScheduleInput) -> ScheduleResult<ScheduledMeeting> {
        let request = self.resolve_request(input)?;

        let busy = self.calendar.list_busy(&request.window).await?;
        debug!(busy = busy.len(), "fetched busy intervals");

        let free = FreeSlots::new(request.window, &busy, self.config.min_gap);
        let slot = selector::select_slot(
            &free,
            request.duration,
            &self.config.work_hours,
            self.config.timezone,
        )?;

        let event_id = self
            .calendar
            .create_event(&request.summary, &slot, &request.attendees)
            .await?;
        info!(%event_id, start = %slot.start(), "scheduled meeting");

        Ok(ScheduledMeeting {
            event_id,
            interval: slot,
            summary: request.summary,
            attendees: request.attendees,
        })
    }

    /// Create a meeting at an explicit time, without slot search.
    pub async fn create_meeting(
        &self,
        summary: &str,
        interval: &TimeInterval,
        attendees: &[String],
    ) -> ScheduleResult<ScheduledMeeting> {
        let event_id = self.calendar.create_event(summary, interval, attendees).await?;
        info!(%event_id, start = %interval.start(), "created meeting");
        Ok(ScheduledMeeting {
            event_id,
            interval: *interval,
            summary: summary.to_string(),
            attendees: attendees.to_vec(),
        })
    }

    /// List meetings overlapping the window, ordered by start.
    pub async fn list_meetings(
        &self,
        window: &TimeInterval,
    ) -> ScheduleResult<Vec<ScheduledMeeting>> {
        Ok(self.calendar.list_events(window).await?)
    }

    /// Delete a meeting by its provider event id.
    pub async fn delete_meeting(&self, event_id: &str) -> ScheduleResult<()> {
        self.calendar.delete_event(event_id).await?;
        info!(%event_id, "deleted meeting");
        Ok(())
    }
}
