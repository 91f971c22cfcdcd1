//! # Hijri Calendar
//!
//! Conversion between Gregorian and Hijri (Islamic lunar) dates, plus the
//! catalogue of the twelve Islamic months.
//!
//! ## Calendar Model
//! - **Arithmetic**: the "civil" tabular calendar with 30-year cycles; leap
//!   years are 2, 5, 7, 10, 13, 16, 18, 21, 24, 26 and 29
//! - **Epoch**: 1 Muharram 1 AH = Friday 16 July 622 (Julian), JDN 1 948 440
//! - **Accuracy**: within ±1 day of sighting-based calendars such as Umm
//!   al-Qura; the tabular calendar never consults the actual moon

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Julian Day Number of 1 Muharram 1 AH (civil epoch).
const EPOCH_JDN: i64 = 1_948_440;

/// Offset between chrono's day count from 0001-01-01 (day 1) and the JDN.
const CE_TO_JDN: i64 = 1_721_425;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HijriError {
    #[error("invalid Hijri date {year}-{month}-{day}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("{0} is before the start of the Hijri calendar")]
    BeforeEpoch(NaiveDate),
}

/// A day in the Hijri calendar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HijriDate {
    pub year: i32,
    /// 1 = Muharram … 12 = Dhu al-Hijjah
    pub month: u32,
    pub day: u32,
}

impl HijriDate {
    /// Checked constructor.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, HijriError> {
        let invalid = HijriError::InvalidDate { year, month, day };
        if year < 1 || !(1..=12).contains(&month) {
            return Err(invalid);
        }
        if day < 1 || day > month_length(year, month) {
            return Err(invalid);
        }
        Ok(Self { year, month, day })
    }

    /// Convert a Gregorian date.
    ///
    /// # Returns
    /// - `Ok(HijriDate)`: the tabular Hijri date for that day
    /// - `Err(HijriError::BeforeEpoch)`: the date precedes 16 July 622
    ///
    /// # Example
    /// ```
    /// use chrono::NaiveDate;
    /// use salat_lib::hijri::HijriDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
    /// assert_eq!(HijriDate::from_gregorian(date).unwrap().to_string(), "1 Ramadan 1445 AH");
    /// ```
    pub fn from_gregorian(date: NaiveDate) -> Result<Self, HijriError> {
        let jdn = date.num_days_from_ce() as i64 + CE_TO_JDN;
        if jdn < EPOCH_JDN {
            return Err(HijriError::BeforeEpoch(date));
        }

        let year = ((30 * (jdn - EPOCH_JDN) + 10_646) / 10_631) as i32;
        let into_year = (jdn - (29 + to_jdn(year, 1, 1))) as f64;
        let month = ((into_year / 29.5).ceil() as i64 + 1).clamp(1, 12) as u32;
        let day = (jdn - to_jdn(year, month, 1) + 1) as u32;

        Ok(Self { year, month, day })
    }

    /// Convert back to the proleptic Gregorian calendar.
    pub fn to_gregorian(&self) -> Option<NaiveDate> {
        let days = to_jdn(self.year, self.month, self.day) - CE_TO_JDN;
        NaiveDate::from_num_days_from_ce_opt(i32::try_from(days).ok()?)
    }

    /// Catalogue entry for this month. Out-of-range months, only reachable by
    /// building the struct directly, clamp to Muharram or Dhu al-Hijjah.
    pub fn month_info(&self) -> &'static IslamicMonth {
        &MONTHS[(self.month.clamp(1, 12) - 1) as usize]
    }

    pub fn month_name(&self) -> &'static str {
        self.month_info().name
    }

    pub fn weekday(&self) -> Option<Weekday> {
        self.to_gregorian().map(|d| d.weekday())
    }
}

impl fmt::Display for HijriDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} AH", self.day, self.month_name(), self.year)
    }
}

/// True for the 11 leap years of each 30-year cycle.
pub fn is_leap_year(year: i32) -> bool {
    (14 + 11 * year).rem_euclid(30) < 11
}

/// Odd months have 30 days, even months 29, and Dhu al-Hijjah gains a day in
/// leap years.
pub fn month_length(year: i32, month: u32) -> u32 {
    if month % 2 == 1 || (month == 12 && is_leap_year(year)) {
        30
    } else {
        29
    }
}

fn to_jdn(year: i32, month: u32, day: u32) -> i64 {
    let (y, m, d) = (year as i64, month as i64, day as i64);
    // ceil(29.5 * (m - 1)) in integers
    d + (59 * (m - 1) + 1) / 2 + (y - 1) * 354 + (3 + 11 * y) / 30 + EPOCH_JDN - 1
}

/// A month of the Islamic year with its traditional significance.
#[derive(Debug)]
pub struct IslamicMonth {
    pub name: &'static str,
    /// One of the four sacred months (al-ashhur al-hurum)
    pub sacred: bool,
    pub description: &'static str,
    pub virtues: &'static [&'static str],
}

pub const MONTHS: [IslamicMonth; 12] = [
    IslamicMonth {
        name: "Muharram",
        sacred: true,
        description: "The first month of the Islamic calendar, a sacred month",
        virtues: &[
            "One of the four sacred months in Islam",
            "The day of Ashura (10th Muharram) is a significant day of fasting",
            "Fasting on Ashura expiates the sins of the previous year",
        ],
    },
    IslamicMonth {
        name: "Safar",
        sacred: false,
        description: "",
        virtues: &[],
    },
    IslamicMonth {
        name: "Rabi al-Awwal",
        sacred: false,
        description: "Month of the Prophet's birth",
        virtues: &[],
    },
    IslamicMonth {
        name: "Rabi al-Thani",
        sacred: false,
        description: "",
        virtues: &[],
    },
    IslamicMonth {
        name: "Jumada al-Awwal",
        sacred: false,
        description: "",
        virtues: &[],
    },
    IslamicMonth {
        name: "Jumada al-Thani",
        sacred: false,
        description: "",
        virtues: &[],
    },
    IslamicMonth {
        name: "Rajab",
        sacred: true,
        description: "One of the sacred months, the month of Isra and Mi'raj",
        virtues: &[
            "One of the four sacred months in Islam",
            "The Isra and Mi'raj (Prophet's night journey) occurred in this month",
            "Recommended to increase worship and good deeds",
        ],
    },
    IslamicMonth {
        name: "Sha'ban",
        sacred: false,
        description: "Month preceding Ramadan",
        virtues: &[],
    },
    IslamicMonth {
        name: "Ramadan",
        sacred: false,
        description: "The month of fasting, Quran revelation, and Laylat al-Qadr",
        virtues: &[
            "Fasting during Ramadan is one of the Five Pillars of Islam",
            "The Quran was first revealed in this month",
            "Contains Laylat al-Qadr (Night of Power) which is better than 1000 months",
            "Gates of Paradise are opened and gates of Hell are closed",
        ],
    },
    IslamicMonth {
        name: "Shawwal",
        sacred: false,
        description: "The month following Ramadan containing Eid al-Fitr",
        virtues: &[
            "First day is Eid al-Fitr, a celebration after Ramadan",
            "Fasting six days in Shawwal (after Eid) brings the reward of fasting the whole year",
            "A time to continue good habits developed in Ramadan",
        ],
    },
    IslamicMonth {
        name: "Dhu al-Qi'dah",
        sacred: true,
        description: "",
        virtues: &[],
    },
    IslamicMonth {
        name: "Dhu al-Hijjah",
        sacred: true,
        description: "Month of Hajj and Eid al-Adha",
        virtues: &[],
    },
];

/// Look up a month by (case-insensitive) name.
pub fn month_by_name(name: &str) -> Option<&'static IslamicMonth> {
    MONTHS
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(name.trim()))
}
