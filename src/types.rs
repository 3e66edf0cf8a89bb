//! Request and confirmation types shared across the scheduling pipeline.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};
use crate::interval::TimeInterval;

/// Daily time-of-day range within which meetings may be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkHours {
    start: NaiveTime,
    end: NaiveTime,
}

impl WorkHours {
    pub fn new(start: NaiveTime, end: NaiveTime) -> ScheduleResult<Self> {
        if start >= end {
            return Err(ScheduleError::InvalidInput(format!(
                "working hours start {start} must precede end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }
}

/// A request to schedule one meeting inside a search window.
///
/// Built from explicit tool arguments or from a parsed natural-language
/// expression. Invariants are checked once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingRequest {
    pub summary: String,
    pub duration: Duration,
    pub window: TimeInterval,
    pub attendees: Vec<String>,
}

impl MeetingRequest {
    pub fn new(
        summary: impl Into<String>,
        duration: Duration,
        window: TimeInterval,
    ) -> ScheduleResult<Self> {
        if duration <= Duration::zero() {
            return Err(ScheduleError::InvalidInput(
                "meeting duration must be positive".to_string(),
            ));
        }
        if duration > window.duration() {
            return Err(ScheduleError::InvalidInput(format!(
                "duration {}m exceeds the search window of {}m",
                duration.num_minutes(),
                window.duration().num_minutes()
            )));
        }
        Ok(Self {
            summary: summary.into(),
            duration,
            window,
            attendees: Vec::new(),
        })
    }

    pub fn with_attendees(mut self, attendees: Vec<String>) -> Self {
        self.attendees = attendees;
        self
    }
}

/// Confirmation record for a meeting that exists on the provider's calendar.
///
/// Not persisted locally; the calendar service is the sole source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMeeting {
    /// Identifier assigned by the provider on creation.
    pub event_id: String,
    pub interval: TimeInterval,
    pub summary: String,
    /// Attendee email addresses, empty when none were invited.
    #[serde(default)]
    pub attendees: Vec<String>,
}
