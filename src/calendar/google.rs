//! Google Calendar REST v3 capability implementation.
//!
//! Thin I/O wrapper: list/insert/delete against the primary calendar. The
//! bearer token is pre-provisioned by the caller; this client never reads or
//! refreshes credential files.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, ProviderErrorKind, ProviderOp};
use crate::interval::{BusyInterval, TimeInterval};
use crate::types::ScheduledMeeting;

use super::CalendarCapability;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
const PAGE_SIZE: u32 = 250;

/// Google Calendar client over an injected access token.
pub struct GoogleCalendar {
    http: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GoogleCalendar {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch all event resources overlapping the window, following pagination.
    async fn fetch_events(&self, window: &TimeInterval) -> Result<Vec<EventResource>, ProviderError> {
        let mut all = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/calendars/primary/events?timeMin={}&timeMax={}\
                 &singleEvents=true&orderBy=startTime&maxResults={}",
                self.base_url,
                urlencoding::encode(&window.start().to_rfc3339()),
                urlencoding::encode(&window.end().to_rfc3339()),
                PAGE_SIZE,
            );
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.access_token)
                .send()
                .await
                .map_err(|e| ProviderError::transient(ProviderOp::Read, e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(http_error(ProviderOp::Read, status, &body));
            }

            let page: EventList = response
                .json()
                .await
                .map_err(|e| ProviderError::permanent(ProviderOp::Read, e.to_string()))?;

            if let Some(items) = page.items {
                all.extend(items);
            }
            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        debug!(count = all.len(), "fetched calendar events");
        Ok(all)
    }
}

#[async_trait]
impl CalendarCapability for GoogleCalendar {
    async fn list_busy(&self, window: &TimeInterval) -> Result<Vec<BusyInterval>, ProviderError> {
        Ok(self
            .list_events(window)
            .await?
            .into_iter()
            .map(|e| BusyInterval::new(e.interval, e.event_id))
            .collect())
    }

    async fn list_events(
        &self,
        window: &TimeInterval,
    ) -> Result<Vec<ScheduledMeeting>, ProviderError> {
        let mut meetings = Vec::new();
        for resource in self.fetch_events(window).await? {
            if resource.status.as_deref() == Some("cancelled") {
                continue;
            }
            if let Some(meeting) = resource.into_meeting()? {
                meetings.push(meeting);
            }
        }
        meetings.sort_by_key(|m| m.interval.start());
        Ok(meetings)
    }

    async fn create_event(
        &self,
        summary: &str,
        interval: &TimeInterval,
        attendees: &[String],
    ) -> Result<String, ProviderError> {
        let url = format!("{}/calendars/primary/events", self.base_url);
        let body = EventInsert {
            summary,
            start: EventTimeRef {
                date_time: interval.start().to_rfc3339(),
            },
            end: EventTimeRef {
                date_time: interval.end().to_rfc3339(),
            },
            attendees: attendees
                .iter()
                .map(|email| AttendeeRef { email })
                .collect(),
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::transient(ProviderOp::Write, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(http_error(ProviderOp::Write, status, &body));
        }

        let created: CreatedEvent = response
            .json()
            .await
            .map_err(|e| ProviderError::permanent(ProviderOp::Write, e.to_string()))?;
        Ok(created.id)
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), ProviderError> {
        let url = format!(
            "{}/calendars/primary/events/{}",
            self.base_url,
            urlencoding::encode(event_id)
        );

        let response = self
            .http
            .delete(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ProviderError::transient(ProviderOp::Delete, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(http_error(ProviderOp::Delete, status, &body));
        }
        Ok(())
    }
}

/// Map an HTTP failure status onto the provider error taxonomy.
fn http_error(op: ProviderOp, status: StatusCode, body: &str) -> ProviderError {
    let kind = if status == StatusCode::CONFLICT {
        ProviderErrorKind::Conflict
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        ProviderErrorKind::Transient
    } else {
        ProviderErrorKind::Permanent
    };
    ProviderError::new(kind, op, format!("HTTP {status}: {body}"))
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct EventList {
    items: Option<Vec<EventResource>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventResource {
    id: String,
    summary: Option<String>,
    status: Option<String>,
    start: Option<EventTime>,
    end: Option<EventTime>,
    attendees: Option<Vec<EventAttendee>>,
}

#[derive(Debug, Deserialize)]
struct EventAttendee {
    email: Option<String>,
}

impl EventResource {
    /// Resolve into a meeting record, or `None` for events without usable
    /// times. All-day events occupy their whole UTC day.
    fn into_meeting(self) -> Result<Option<ScheduledMeeting>, ProviderError> {
        let (start, end) = match (&self.start, &self.end) {
            (Some(s), Some(e)) => (s.resolve()?, e.resolve()?),
            _ => return Ok(None),
        };
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) => (s, e),
            _ => return Ok(None),
        };
        let attendees = self
            .attendees
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| a.email)
            .collect();
        match TimeInterval::new(start, end) {
            Ok(interval) => Ok(Some(ScheduledMeeting {
                event_id: self.id,
                interval,
                summary: self.summary.unwrap_or_else(|| "(no title)".to_string()),
                attendees,
            })),
            // Zero-length events exist in the wild; they block nothing.
            Err(_) => Ok(None),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventTime {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    date: Option<String>,
}

impl EventTime {
    fn resolve(&self) -> Result<Option<DateTime<Utc>>, ProviderError> {
        if let Some(date_time) = &self.date_time {
            let dt = DateTime::parse_from_rfc3339(date_time).map_err(|e| {
                ProviderError::permanent(ProviderOp::Read, format!("bad dateTime: {e}"))
            })?;
            return Ok(Some(dt.with_timezone(&Utc)));
        }
        if let Some(date) = &self.date {
            let day = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
                ProviderError::permanent(ProviderOp::Read, format!("bad date: {e}"))
            })?;
            let midnight = day
                .and_hms_opt(0, 0, 0)
                .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc));
            return Ok(midnight);
        }
        Ok(None)
    }
}

#[derive(Debug, Serialize)]
struct EventInsert<'a> {
    summary: &'a str,
    start: EventTimeRef,
    end: EventTimeRef,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attendees: Vec<AttendeeRef<'a>>,
}

#[derive(Debug, Serialize)]
struct AttendeeRef<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct EventTimeRef {
    #[serde(rename = "dateTime")]
    date_time: String,
}

#[derive(Debug, Deserialize)]
struct CreatedEvent {
    id: String,
}
