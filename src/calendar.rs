//! Calendar capability: the external-provider seam.
//!
//! The scheduling core never talks to a provider directly and never touches
//! credential material; it receives an already-authenticated capability
//! instance and calls through this trait.

pub mod google;
pub mod memory;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::interval::{BusyInterval, TimeInterval};
use crate::types::ScheduledMeeting;

pub use google::GoogleCalendar;
pub use memory::InMemoryCalendar;

/// Operations the scheduler consumes from a calendar provider.
///
/// No transactional guarantee exists across a `list_busy` / `create_event`
/// pair; a concurrent writer may take the chosen slot in between, and
/// implementations surface that as a conflict-kind [`ProviderError`].
#[async_trait]
pub trait CalendarCapability: Send + Sync {
    /// Busy intervals overlapping the window, ordered by start.
    async fn list_busy(&self, window: &TimeInterval) -> Result<Vec<BusyInterval>, ProviderError>;

    /// Events overlapping the window, with summaries, ordered by start.
    async fn list_events(
        &self,
        window: &TimeInterval,
    ) -> Result<Vec<ScheduledMeeting>, ProviderError>;

    /// Create an event, inviting `attendees`; returns the provider-assigned
    /// event id.
    async fn create_event(
        &self,
        summary: &str,
        interval: &TimeInterval,
        attendees: &[String],
    ) -> Result<String, ProviderError>;

    /// Delete an event by provider id.
    async fn delete_event(&self, event_id: &str) -> Result<(), ProviderError>;
}
