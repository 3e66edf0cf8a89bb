//! Slot selection policy: earliest fit within working hours.

use chrono::{Duration, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{ScheduleError, ScheduleResult};
use crate::interval::TimeInterval;
use crate::types::WorkHours;

/// Choose the slot for a meeting of `duration` from an ordered free-interval
/// sequence.
///
/// Free intervals are clipped to the working-hours window of every calendar
/// day they touch (an overnight interval splits into per-day pieces). Among
/// the clipped candidates long enough for the meeting, the earliest start
/// wins, and the result is exactly `[start, start + duration)` — the rest of
/// the free interval stays free.
pub fn select_slot<I>(
    free: I,
    duration: Duration,
    work_hours: &WorkHours,
    tz: Tz,
) -> ScheduleResult<TimeInterval>
where
    I: IntoIterator<Item = TimeInterval>,
{
    if duration <= Duration::zero() {
        return Err(ScheduleError::InvalidInput(
            "slot duration must be positive".to_string(),
        ));
    }

    for interval in free {
        for candidate in clip_to_work_days(interval, work_hours, tz) {
            if candidate.duration() >= duration {
                let start = candidate.start();
                return TimeInterval::new(start, start + duration);
            }
        }
    }

    Err(ScheduleError::NoSlotAvailable)
}

/// Intersect a free interval with the working-hours window of each local
/// calendar day it touches, in day order.
fn clip_to_work_days(interval: TimeInterval, work_hours: &WorkHours, tz: Tz) -> Vec<TimeInterval> {
    let mut pieces = Vec::new();

    let mut day = interval.start().with_timezone(&tz).date_naive();
    let last_day = interval.end().with_timezone(&tz).date_naive();

    while day <= last_day {
        // A DST gap can swallow a working-hours bound; such a day contributes
        // nothing rather than a guessed window.
        let bounds = (
            tz.from_local_datetime(&day.and_time(work_hours.start()))
                .earliest(),
            tz.from_local_datetime(&day.and_time(work_hours.end()))
                .earliest(),
        );
        if let (Some(work_start), Some(work_end)) = bounds {
            let work_start = work_start.with_timezone(&Utc);
            let work_end = work_end.with_timezone(&Utc);
            if let Ok(work_window) = TimeInterval::new(work_start, work_end) {
                if let Some(piece) = interval.intersection(&work_window) {
                    pieces.push(piece);
                }
            }
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    pieces
}
