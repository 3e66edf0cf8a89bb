//! Natural-language time expression parsing.
//!
//! Turns phrases like "tomorrow at 2pm" or "friday 14:00 for 45 minutes" into a
//! precise search window. Deliberately deterministic: one best-guess reading or
//! a parse failure, never a ranked list of candidates.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::{ParseError, ScheduleResult};
use crate::interval::TimeInterval;

/// Window fragment produced by the parser.
///
/// `window` is exactly `[start, start + duration)`; callers that want slack
/// around the requested instant widen it themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedWindow {
    pub window: TimeInterval,
    pub duration: Duration,
}

/// Parse a time expression against an explicit reference instant.
///
/// The reference carries the caller's timezone; relative dates ("tomorrow")
/// resolve against the reference's local calendar day, never the system clock.
/// Local times made ambiguous or nonexistent by a DST transition are parse
/// failures rather than silent guesses.
pub fn parse(
    expression: &str,
    reference_now: DateTime<Tz>,
    default_duration: Duration,
) -> ScheduleResult<ParsedWindow> {
    let ambiguous = || ParseError::AmbiguousExpression(expression.to_string());

    let lowered = expression.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    let mut day: Option<DayToken> = None;
    let mut time: Option<NaiveTime> = None;
    let mut duration: Option<Duration> = None;

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if token == "at" {
            i += 1;
            continue;
        }
        if token == "for" {
            if duration.is_some() || i + 2 >= tokens.len() {
                return Err(ambiguous().into());
            }
            duration = Some(parse_duration(tokens[i + 1], tokens[i + 2]).ok_or_else(ambiguous)?);
            i += 3;
            continue;
        }
        if let Some(d) = parse_day(token) {
            if day.replace(d).is_some() {
                return Err(ambiguous().into());
            }
            i += 1;
            continue;
        }
        if let Some(t) = parse_clock(token) {
            if time.replace(t).is_some() {
                return Err(ambiguous().into());
            }
            i += 1;
            continue;
        }
        return Err(ambiguous().into());
    }

    let (day, time) = match (day, time) {
        (Some(d), Some(t)) => (d, t),
        _ => return Err(ambiguous().into()),
    };

    let tz = reference_now.timezone();
    let today = reference_now.date_naive();
    let target_date = match day {
        DayToken::Today => today,
        DayToken::Tomorrow => today.succ_opt().ok_or_else(ambiguous)?,
        DayToken::Weekday(target) => {
            // Next strictly-future occurrence: "monday" on a Monday means in a week.
            let ahead = (target.num_days_from_monday() + 7
                - today.weekday().num_days_from_monday()
                - 1)
                % 7
                + 1;
            today + Duration::days(ahead as i64)
        }
    };

    // Resolve the wall-clock reading in the caller's zone. DST transitions can
    // make it ambiguous (fall back) or nonexistent (spring forward).
    let start = match tz.from_local_datetime(&target_date.and_time(time)) {
        chrono::LocalResult::Single(dt) => dt.with_timezone(&Utc),
        _ => return Err(ambiguous().into()),
    };

    let duration = duration.unwrap_or(default_duration);
    let end = start.checked_add_signed(duration).ok_or_else(ambiguous)?;
    let window = TimeInterval::new(start, end)?;
    Ok(ParsedWindow { window, duration })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayToken {
    Today,
    Tomorrow,
    Weekday(Weekday),
}

fn parse_day(token: &str) -> Option<DayToken> {
    match token {
        "today" => Some(DayToken::Today),
        "tomorrow" => Some(DayToken::Tomorrow),
        "monday" | "mon" => Some(DayToken::Weekday(Weekday::Mon)),
        "tuesday" | "tue" | "tues" => Some(DayToken::Weekday(Weekday::Tue)),
        "wednesday" | "wed" => Some(DayToken::Weekday(Weekday::Wed)),
        "thursday" | "thu" | "thurs" => Some(DayToken::Weekday(Weekday::Thu)),
        "friday" | "fri" => Some(DayToken::Weekday(Weekday::Fri)),
        "saturday" | "sat" => Some(DayToken::Weekday(Weekday::Sat)),
        "sunday" | "sun" => Some(DayToken::Weekday(Weekday::Sun)),
        _ => None,
    }
}

/// Parse "2pm", "2:30pm", or 24-hour "14:00".
fn parse_clock(token: &str) -> Option<NaiveTime> {
    let (body, meridiem) = if let Some(stripped) = token.strip_suffix("am") {
        (stripped, Some(false))
    } else if let Some(stripped) = token.strip_suffix("pm") {
        (stripped, Some(true))
    } else {
        (token, None)
    };

    let (hour_str, minute_str) = match body.split_once(':') {
        Some((h, m)) => (h, m),
        None => (body, "0"),
    };
    // Bare numbers without am/pm or minutes ("at 2") stay ambiguous.
    if meridiem.is_none() && !body.contains(':') {
        return None;
    }

    let hour: u32 = hour_str.parse().ok()?;
    let minute: u32 = minute_str.parse().ok()?;

    let hour = match meridiem {
        Some(pm) => {
            if hour == 0 || hour > 12 {
                return None;
            }
            match (pm, hour) {
                (false, 12) => 0,
                (true, h) if h < 12 => h + 12,
                (_, h) => h,
            }
        }
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Parse the two tokens after "for": a count and a unit.
fn parse_duration(count: &str, unit: &str) -> Option<Duration> {
    let count: i64 = count.parse().ok()?;
    if count <= 0 {
        return None;
    }
    match unit {
        "minute" | "minutes" | "min" | "mins" => Duration::try_minutes(count),
        "hour" | "hours" | "hr" | "hrs" => Duration::try_hours(count),
        _ => None,
    }
}
