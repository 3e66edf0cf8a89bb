//! Scheduling policy settings.
//!
//! User-configurable policy (timezone, working hours, default duration, minimum
//! gap) that persists across restarts. Stored as JSON in the app data directory,
//! with environment-variable overrides for deployments that never touch disk.

use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::{ScheduleError, ScheduleResult};
use crate::types::WorkHours;

/// Persisted scheduling settings, as written by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchedulerSettings {
    /// IANA timezone name used to resolve relative dates and working hours.
    pub timezone: String,
    /// Start of the working day, "HH:MM".
    pub work_hours_start: String,
    /// End of the working day, "HH:MM".
    pub work_hours_end: String,
    /// Meeting length applied when a request does not specify one.
    pub default_duration_minutes: i64,
    /// Minimum buffer kept between the chosen slot and neighboring meetings.
    pub min_gap_minutes: i64,
    /// How far ahead auto-scheduling looks when no window is given.
    pub search_horizon_days: i64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            work_hours_start: "09:00".to_string(),
            work_hours_end: "17:00".to_string(),
            default_duration_minutes: 30,
            min_gap_minutes: 15,
            search_horizon_days: 7,
        }
    }
}

impl SchedulerSettings {
    /// Apply `COSCHEDULE_*` environment overrides on top of these settings.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(tz) = std::env::var("COSCHEDULE_TIMEZONE") {
            if !tz.is_empty() {
                self.timezone = tz;
            }
        }
        if let Ok(minutes) = std::env::var("COSCHEDULE_DEFAULT_DURATION_MINUTES") {
            if let Ok(minutes) = minutes.parse() {
                self.default_duration_minutes = minutes;
            }
        }
        if let Ok(minutes) = std::env::var("COSCHEDULE_MIN_GAP_MINUTES") {
            if let Ok(minutes) = minutes.parse() {
                self.min_gap_minutes = minutes;
            }
        }
        self
    }

    /// Validate and convert into the typed config used by the pipeline.
    pub fn resolve(&self) -> ScheduleResult<SchedulerConfig> {
        let timezone: Tz = self.timezone.parse().map_err(|_| {
            ScheduleError::InvalidInput(format!("unknown timezone: {:?}", self.timezone))
        })?;

        let start = parse_clock(&self.work_hours_start)?;
        let end = parse_clock(&self.work_hours_end)?;
        let work_hours = WorkHours::new(start, end)?;

        if self.default_duration_minutes <= 0 {
            return Err(ScheduleError::InvalidInput(
                "default duration must be positive".to_string(),
            ));
        }
        if self.min_gap_minutes < 0 {
            return Err(ScheduleError::InvalidInput(
                "minimum gap cannot be negative".to_string(),
            ));
        }
        // The gap widens busy blocks during the availability sweep; more than a
        // day of buffer is a configuration mistake, not a policy.
        if self.min_gap_minutes > 24 * 60 {
            return Err(ScheduleError::InvalidInput(
                "minimum gap cannot exceed one day".to_string(),
            ));
        }
        if self.search_horizon_days <= 0 {
            return Err(ScheduleError::InvalidInput(
                "search horizon must be at least one day".to_string(),
            ));
        }

        let default_duration = Duration::try_minutes(self.default_duration_minutes)
            .ok_or_else(|| out_of_range("default duration", self.default_duration_minutes))?;
        let min_gap = Duration::try_minutes(self.min_gap_minutes)
            .ok_or_else(|| out_of_range("minimum gap", self.min_gap_minutes))?;
        let search_horizon = Duration::try_days(self.search_horizon_days)
            .ok_or_else(|| out_of_range("search horizon", self.search_horizon_days))?;

        Ok(SchedulerConfig {
            timezone,
            work_hours,
            default_duration,
            min_gap,
            search_horizon,
        })
    }
}

fn out_of_range(what: &str, value: i64) -> ScheduleError {
    ScheduleError::InvalidInput(format!("{what} out of range: {value}"))
}

fn parse_clock(value: &str) -> ScheduleResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| ScheduleError::InvalidInput(format!("invalid clock time: {value:?}")))
}

/// Resolved, validated scheduling policy.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub timezone: Tz,
    pub work_hours: WorkHours,
    pub default_duration: Duration,
    pub min_gap: Duration,
    pub search_horizon: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        // Default settings always resolve.
        SchedulerSettings::default()
            .resolve()
            .expect("default settings are valid")
    }
}

/// Settings store that persists to disk.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store in the default location: `COSCHEDULE_SETTINGS_PATH` or the
    /// platform app data directory.
    pub fn default_location() -> Self {
        let path = std::env::var("COSCHEDULE_SETTINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("coschedule")
                    .join("settings.json")
            });
        Self::new(path)
    }

    /// Load settings from disk, returning defaults if the file does not exist.
    pub fn load(&self) -> ScheduleResult<SchedulerSettings> {
        if !self.path.exists() {
            return Ok(SchedulerSettings::default());
        }
        let data = fs::read_to_string(&self.path)
            .map_err(|e| ScheduleError::InvalidInput(format!("settings read failed: {e}")))?;
        serde_json::from_str(&data)
            .map_err(|e| ScheduleError::InvalidInput(format!("settings parse failed: {e}")))
    }

    /// Save settings to disk, creating parent directories as needed.
    pub fn save(&self, settings: &SchedulerSettings) -> ScheduleResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ScheduleError::InvalidInput(format!("settings dir failed: {e}")))?;
        }
        let data = serde_json::to_string_pretty(settings)
            .map_err(|e| ScheduleError::InvalidInput(format!("settings encode failed: {e}")))?;
        fs::write(&self.path, data)
            .map_err(|e| ScheduleError::InvalidInput(format!("settings write failed: {e}")))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_resolve() {
        let config = SchedulerSettings::default().resolve().unwrap();
        assert_eq!(config.timezone, chrono_tz::UTC);
        assert_eq!(config.default_duration, Duration::minutes(30));
        assert_eq!(config.min_gap, Duration::minutes(15));
    }

    #[test]
    fn named_timezone_resolves() {
        let settings = SchedulerSettings {
            timezone: "America/New_York".to_string(),
            ..SchedulerSettings::default()
        };
        let config = settings.resolve().unwrap();
        assert_eq!(config.timezone, chrono_tz::America::New_York);
    }

    #[test]
    fn unknown_timezone_rejected() {
        let settings = SchedulerSettings {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..SchedulerSettings::default()
        };
        assert!(settings.resolve().is_err());
    }

    #[test]
    fn inverted_work_hours_rejected() {
        let settings = SchedulerSettings {
            work_hours_start: "18:00".to_string(),
            work_hours_end: "09:00".to_string(),
            ..SchedulerSettings::default()
        };
        assert!(settings.resolve().is_err());
    }

    #[test]
    fn nonpositive_default_duration_rejected() {
        let settings = SchedulerSettings {
            default_duration_minutes: 0,
            ..SchedulerSettings::default()
        };
        assert!(settings.resolve().is_err());
    }

    #[test]
    fn out_of_range_minutes_rejected_not_panicked() {
        // Settings come from a user-edited JSON file; absurd values must
        // resolve to an error.
        let settings = SchedulerSettings {
            default_duration_minutes: i64::MAX,
            ..SchedulerSettings::default()
        };
        assert!(settings.resolve().is_err());

        let settings = SchedulerSettings {
            search_horizon_days: i64::MAX,
            ..SchedulerSettings::default()
        };
        assert!(settings.resolve().is_err());

        let settings = SchedulerSettings {
            min_gap_minutes: 24 * 60 + 1,
            ..SchedulerSettings::default()
        };
        assert!(settings.resolve().is_err());
    }

    #[test]
    fn store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));

        let settings = SchedulerSettings {
            timezone: "Europe/Berlin".to_string(),
            default_duration_minutes: 45,
            ..SchedulerSettings::default()
        };
        store.save(&settings).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nope.json"));
        assert_eq!(store.load().unwrap(), SchedulerSettings::default());
    }
}
