//! coschedule: calendar scheduling tools for AI agents.
//!
//! Exposes meeting management (create, list, delete, auto-schedule) as a
//! registry of schema-validated tools over an injected calendar capability.
//! Auto-scheduling runs a deterministic pipeline: parse or accept a search
//! window, fetch busy intervals, compute the free complement, pick the
//! earliest slot inside working hours, create the event.

pub mod availability;
pub mod calendar;
pub mod error;
pub mod interval;
pub mod orchestrator;
pub mod parser;
pub mod selector;
pub mod settings;
pub mod tools;
pub mod types;

pub use crate::calendar::{CalendarCapability, GoogleCalendar, InMemoryCalendar};
pub use crate::error::{ParseError, ProviderError, ScheduleError, ScheduleResult};
pub use crate::interval::{BusyInterval, TimeInterval};
pub use crate::orchestrator::{Orchestrator, ScheduleInput};
pub use crate::settings::{SchedulerConfig, SchedulerSettings, SettingsStore};
pub use crate::types::{MeetingRequest, ScheduledMeeting, WorkHours};
