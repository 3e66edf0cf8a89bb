//! Time intervals and the busy/free vocabulary built on them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};

/// A half-open span of absolute time `[start, end)`.
///
/// Immutable once constructed; the constructor enforces `start < end`.
/// Wall-clock concerns (working hours, "tomorrow") live at the edges of the
/// crate and are resolved through an explicit timezone before reaching here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    /// Create an interval, rejecting empty and inverted spans.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> ScheduleResult<Self> {
        if start >= end {
            return Err(ScheduleError::InvalidInput(format!(
                "interval start {start} must precede end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether two intervals share any instant.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely within this interval.
    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The overlapping portion of two intervals, if any.
    pub fn intersection(&self, other: &TimeInterval) -> Option<TimeInterval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(TimeInterval { start, end })
        } else {
            None
        }
    }
}

/// An occupied span on the calendar, tagged with the event that owns it.
///
/// Fetched fresh for every scheduling attempt; calendars mutate externally,
/// so busy intervals are never cached across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub interval: TimeInterval,
    pub event_id: String,
}

impl BusyInterval {
    pub fn new(interval: TimeInterval, event_id: impl Into<String>) -> Self {
        Self {
            interval,
            event_id: event_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    #[test]
    fn rejects_inverted_interval() {
        assert!(TimeInterval::new(at(10, 0), at(9, 0)).is_err());
    }

    #[test]
    fn rejects_empty_interval() {
        assert!(TimeInterval::new(at(10, 0), at(10, 0)).is_err());
    }

    #[test]
    fn duration_is_end_minus_start() {
        let iv = TimeInterval::new(at(9, 0), at(10, 30)).unwrap();
        assert_eq!(iv.duration(), Duration::minutes(90));
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let a = TimeInterval::new(at(9, 0), at(10, 0)).unwrap();
        let b = TimeInterval::new(at(10, 0), at(11, 0)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn intersection_of_overlapping_intervals() {
        let a = TimeInterval::new(at(9, 0), at(11, 0)).unwrap();
        let b = TimeInterval::new(at(10, 0), at(12, 0)).unwrap();
        let cut = a.intersection(&b).unwrap();
        assert_eq!(cut.start(), at(10, 0));
        assert_eq!(cut.end(), at(11, 0));
    }

    #[test]
    fn contains_is_inclusive_of_bounds() {
        let outer = TimeInterval::new(at(9, 0), at(17, 0)).unwrap();
        let inner = TimeInterval::new(at(9, 0), at(9, 30)).unwrap();
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn serde_roundtrip_preserves_bounds() {
        let iv = TimeInterval::new(at(9, 0), at(10, 0)).unwrap();
        let json = serde_json::to_string(&iv).unwrap();
        let back: TimeInterval = serde_json::from_str(&json).unwrap();
        assert_eq!(back, iv);
    }
}
