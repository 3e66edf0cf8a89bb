//! In-memory calendar for tests and credential-less runs.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{ProviderError, ProviderOp};
use crate::interval::{BusyInterval, TimeInterval};
use crate::types::ScheduledMeeting;

use super::CalendarCapability;

/// Mutex-guarded event store implementing the calendar capability.
///
/// Supports one-shot failure injection so orchestration tests can exercise the
/// fetch/create race window without a live provider.
#[derive(Default)]
pub struct InMemoryCalendar {
    events: Mutex<Vec<ScheduledMeeting>>,
    fail_next_list: Mutex<Option<ProviderError>>,
    fail_next_create: Mutex<Option<ProviderError>>,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event directly, bypassing the capability surface. Returns the
    /// assigned id.
    pub fn seed_event(&self, summary: &str, interval: TimeInterval) -> String {
        self.store(summary, interval, &[])
    }

    fn store(&self, summary: &str, interval: TimeInterval, attendees: &[String]) -> String {
        let event_id = Uuid::new_v4().to_string();
        self.events
            .lock()
            .expect("calendar store lock poisoned")
            .push(ScheduledMeeting {
                event_id: event_id.clone(),
                interval,
                summary: summary.to_string(),
                attendees: attendees.to_vec(),
            });
        event_id
    }

    /// Make the next `list_busy`/`list_events` call fail with `err`.
    pub fn fail_next_list(&self, err: ProviderError) {
        *self
            .fail_next_list
            .lock()
            .expect("calendar store lock poisoned") = Some(err);
    }

    /// Make the next `create_event` call fail with `err`.
    pub fn fail_next_create(&self, err: ProviderError) {
        *self
            .fail_next_create
            .lock()
            .expect("calendar store lock poisoned") = Some(err);
    }

    /// Snapshot of all stored events.
    pub fn events(&self) -> Vec<ScheduledMeeting> {
        self.events
            .lock()
            .expect("calendar store lock poisoned")
            .clone()
    }

    fn take_injected(&self, slot: &Mutex<Option<ProviderError>>) -> Option<ProviderError> {
        slot.lock().expect("calendar store lock poisoned").take()
    }

    fn overlapping(&self, window: &TimeInterval) -> Vec<ScheduledMeeting> {
        let mut events: Vec<ScheduledMeeting> = self
            .events
            .lock()
            .expect("calendar store lock poisoned")
            .iter()
            .filter(|e| e.interval.overlaps(window))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.interval.start());
        events
    }
}

#[async_trait]
impl CalendarCapability for InMemoryCalendar {
    async fn list_busy(&self, window: &TimeInterval) -> Result<Vec<BusyInterval>, ProviderError> {
        if let Some(err) = self.take_injected(&self.fail_next_list) {
            return Err(err);
        }
        Ok(self
            .overlapping(window)
            .into_iter()
            .map(|e| BusyInterval::new(e.interval, e.event_id))
            .collect())
    }

    async fn list_events(
        &self,
        window: &TimeInterval,
    ) -> Result<Vec<ScheduledMeeting>, ProviderError> {
        if let Some(err) = self.take_injected(&self.fail_next_list) {
            return Err(err);
        }
        Ok(self.overlapping(window))
    }

    async fn create_event(
        &self,
        summary: &str,
        interval: &TimeInterval,
        attendees: &[String],
    ) -> Result<String, ProviderError> {
        if let Some(err) = self.take_injected(&self.fail_next_create) {
            return Err(err);
        }
        Ok(self.store(summary, *interval, attendees))
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), ProviderError> {
        let mut events = self.events.lock().expect("calendar store lock poisoned");
        let before = events.len();
        events.retain(|e| e.event_id != event_id);
        if events.len() == before {
            return Err(ProviderError::permanent(
                ProviderOp::Delete,
                format!("no event with id {event_id}"),
            ));
        }
        Ok(())
    }
}
