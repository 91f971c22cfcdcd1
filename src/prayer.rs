//! # Daily Prayer Schedule
//!
//! The five daily prayers, a per-day timetable and the "next prayer" lookup.
//!
//! ## Ordering
//! [`Prayer::ALL`] fixes the canonical order Fajr → Dhuhr → Asr → Maghrib → Isha.
//! The order is circular: once Isha has passed, the next prayer is tomorrow's Fajr.
//!
//! ## Boundary Policy
//! A prayer whose time equals "now" to the minute counts as already passed, so at
//! exactly 12:00 with Dhuhr at 12:00 the next prayer is Asr.

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while building or querying a [`PrayerSchedule`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrayerError {
    /// The timetable has no entry for this prayer
    #[error("missing prayer time for {0}")]
    MissingTime(Prayer),

    /// A time string could not be read as `HH:MM`
    #[error("invalid time {value:?} for {prayer}")]
    InvalidTime { prayer: Prayer, value: String },

    /// Not one of the five prayer names
    #[error("unknown prayer name {0:?}")]
    UnknownPrayer(String),
}

/// One of the five obligatory daily prayers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    /// Canonical display and lookup order.
    pub const ALL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }

    /// The prayer after this one, wrapping Isha → Fajr.
    pub fn following(self) -> Prayer {
        let idx = Prayer::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Prayer::ALL[(idx + 1) % Prayer::ALL.len()]
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Prayer {
    type Err = PrayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prayer::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PrayerError::UnknownPrayer(s.to_string()))
    }
}

/// Prayer times for a single day, local wall-clock, no date component.
///
/// Entries may be missing when a fetched timetable is incomplete or the
/// offline model cannot place a prayer (very high latitudes). Lookups that need
/// a missing entry fail with [`PrayerError::MissingTime`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrayerSchedule {
    times: BTreeMap<Prayer, NaiveTime>,
    /// True if computed by the offline approximation instead of the prayer-time service
    #[serde(default)]
    pub offline: bool,
}

impl PrayerSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for literals in tests and the fallback model.
    pub fn with(mut self, prayer: Prayer, time: NaiveTime) -> Self {
        self.times.insert(prayer, time);
        self
    }

    pub fn insert(&mut self, prayer: Prayer, time: NaiveTime) {
        self.times.insert(prayer, time);
    }

    pub fn get(&self, prayer: Prayer) -> Option<NaiveTime> {
        self.times.get(&prayer).copied()
    }

    /// Time of `prayer`, or [`PrayerError::MissingTime`].
    pub fn time_of(&self, prayer: Prayer) -> Result<NaiveTime, PrayerError> {
        self.get(prayer).ok_or(PrayerError::MissingTime(prayer))
    }

    /// Entries in canonical order, skipping missing ones.
    pub fn iter(&self) -> impl Iterator<Item = (Prayer, NaiveTime)> + '_ {
        Prayer::ALL
            .into_iter()
            .filter_map(|p| self.get(p).map(|t| (p, t)))
    }

    /// Ok when all five prayers have a time.
    pub fn validate(&self) -> Result<(), PrayerError> {
        Prayer::ALL
            .into_iter()
            .try_for_each(|p| self.time_of(p).map(|_| ()))
    }

    /// Build a schedule from a name → `"HH:MM"` map such as Aladhan's `timings`.
    ///
    /// Keys that are not prayers (Sunrise, Imsak, Midnight, ...) are ignored.
    /// Prayers absent from the map stay absent.
    pub fn from_timings(timings: &HashMap<String, String>) -> Result<Self, PrayerError> {
        let mut schedule = PrayerSchedule::new();
        for prayer in Prayer::ALL {
            if let Some(raw) = timings.get(prayer.name()) {
                schedule.insert(prayer, parse_time(prayer, raw)?);
            }
        }
        Ok(schedule)
    }
}

/// Parse `"HH:MM"`, tolerating a trailing annotation such as `"05:12 (BST)"`.
pub fn parse_time(prayer: Prayer, raw: &str) -> Result<NaiveTime, PrayerError> {
    let head = raw.split_whitespace().next().unwrap_or("");
    NaiveTime::parse_from_str(head, "%H:%M").map_err(|_| PrayerError::InvalidTime {
        prayer,
        value: raw.to_string(),
    })
}

fn to_minute(now: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now)
}

/// The first prayer in canonical order whose time is strictly after `now`,
/// or Fajr when every prayer today has passed.
///
/// Only hours and minutes of `now` are compared. The schedule must be
/// complete; a missing entry is an error even when an earlier prayer would
/// already have matched.
///
/// # Example
/// ```
/// use chrono::NaiveTime;
/// use salat_lib::prayer::{next_prayer, Prayer, PrayerSchedule};
///
/// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let schedule = PrayerSchedule::new()
///     .with(Prayer::Fajr, t(5, 0))
///     .with(Prayer::Dhuhr, t(12, 0))
///     .with(Prayer::Asr, t(15, 30))
///     .with(Prayer::Maghrib, t(18, 0))
///     .with(Prayer::Isha, t(19, 30));
///
/// assert_eq!(next_prayer(&schedule, t(6, 0)).unwrap(), Prayer::Dhuhr);
/// ```
pub fn next_prayer(schedule: &PrayerSchedule, now: NaiveTime) -> Result<Prayer, PrayerError> {
    schedule.validate()?;
    let now = to_minute(now);

    for prayer in Prayer::ALL {
        if schedule.time_of(prayer)? > now {
            return Ok(prayer);
        }
    }
    Ok(Prayer::Fajr)
}

/// The next prayer and how long until it, wrapping past midnight.
pub fn time_until(
    schedule: &PrayerSchedule,
    now: NaiveTime,
) -> Result<(Prayer, Duration), PrayerError> {
    let prayer = next_prayer(schedule, now)?;
    let at = schedule.time_of(prayer)?;
    let mut remaining = at.signed_duration_since(to_minute(now));
    if remaining <= Duration::zero() {
        remaining = remaining + Duration::days(1);
    }
    Ok((prayer, remaining))
}
