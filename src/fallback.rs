//! # Fallback Prayer-Time Model
//!
//! This module provides an astronomical fallback when the prayer-time service is
//! unavailable. Prayer times are tied to the sun's position, so a low-precision
//! solar ephemeris is enough to place all five prayers within a few minutes.
//!
//! ## Model Characteristics
//!
//! ### Solar Position
//! For the requested day the model computes the sun's declination δ and the
//! equation of time from mean anomaly and ecliptic longitude (USNO
//! low-precision formulae, good to about a minute of time between 1950 and 2050).
//!
//! ### Prayer Definitions (ISNA convention)
//! - **Fajr**: sun 15° below the eastern horizon
//! - **Dhuhr**: solar noon
//! - **Asr**: shadow length equals object height plus its noon shadow (factor 1)
//! - **Maghrib**: sunset, sun's upper limb at −0.833° (refraction + radius)
//! - **Isha**: sun 15° below the western horizon
//!
//! The hour angle for a solar altitude `a` is
//! `cos H = (−sin a − sin δ · sin φ) / (cos δ · cos φ)`.
//!
//! ### Accuracy Trade-offs
//! - ✅ **Correct shape**: times follow the seasons and latitude
//! - ✅ **No network**: pure arithmetic on the date and coordinates
//! - ❌ **Single convention**: ignores the configured calculation method
//! - ❌ **No elevation or high-latitude rules**: when the sun never reaches an
//!   angle (summer nights far north), that prayer is left out of the schedule
//!
//! The schedule is marked `offline` so the display can flag the approximation.

use crate::prayer::{Prayer, PrayerSchedule};
use crate::GeoCoordinate;
use chrono::{Datelike, NaiveDate, NaiveTime};

/// Sun depression angle for Fajr and Isha (degrees).
const TWILIGHT_ANGLE: f64 = 15.0;
/// Apparent sunset altitude below the horizon (degrees).
const SUNSET_ANGLE: f64 = 0.833;
/// Shadow factor for Asr (1 = Shafi'i, Maliki, Hanbali).
const ASR_SHADOW_FACTOR: f64 = 1.0;

/// Julian date of 0001-01-01 00:00 UTC minus one day (chrono counts that day as 1).
const CE_TO_JD: f64 = 1_721_424.5;
const J2000: f64 = 2_451_545.0;

/// Approximate prayer times for `date` at `location`.
///
/// `utc_offset_hours` is the local clock's offset from UTC (e.g. `1.0` for BST).
pub fn approximate(location: GeoCoordinate, date: NaiveDate, utc_offset_hours: f64) -> PrayerSchedule {
    let jd = date.num_days_from_ce() as f64 + CE_TO_JD - location.longitude / (15.0 * 24.0);
    let sun = SolarDay {
        jd,
        latitude: location.latitude,
    };

    // Each time is evaluated at a rough guess of its own day fraction.
    let solar_times = [
        (Prayer::Fajr, sun.angle_time(TWILIGHT_ANGLE, 5.0 / 24.0, true)),
        (Prayer::Dhuhr, Some(sun.mid_day(12.0 / 24.0))),
        (Prayer::Asr, sun.asr_time(ASR_SHADOW_FACTOR, 13.0 / 24.0)),
        (Prayer::Maghrib, sun.angle_time(SUNSET_ANGLE, 18.0 / 24.0, false)),
        (Prayer::Isha, sun.angle_time(TWILIGHT_ANGLE, 18.0 / 24.0, false)),
    ];

    let mut schedule = PrayerSchedule::new();
    for (prayer, hours) in solar_times {
        if let Some(h) = hours {
            let local = h + utc_offset_hours - location.longitude / 15.0;
            schedule.insert(prayer, hours_to_time(local));
        }
    }
    schedule.offline = true;
    schedule
}

struct SolarDay {
    jd: f64,
    latitude: f64,
}

impl SolarDay {
    /// Declination (degrees) and equation of time (hours) at day fraction `t`.
    fn position(&self, t: f64) -> (f64, f64) {
        let d = self.jd + t - J2000;
        let g = (357.529 + 0.985_600_28 * d).rem_euclid(360.0);
        let q = (280.459 + 0.985_647_36 * d).rem_euclid(360.0);
        let l = (q + 1.915 * g.to_radians().sin() + 0.020 * (2.0 * g).to_radians().sin())
            .rem_euclid(360.0);
        let e = (23.439 - 0.000_000_36 * d).to_radians();

        let ra = (e.cos() * l.to_radians().sin())
            .atan2(l.to_radians().cos())
            .to_degrees()
            / 15.0;
        let eqt = q / 15.0 - ra.rem_euclid(24.0);
        let decl = (e.sin() * l.to_radians().sin()).asin().to_degrees();
        (decl, eqt)
    }

    /// Solar noon in hours, before the longitude correction.
    fn mid_day(&self, t: f64) -> f64 {
        let (_, eqt) = self.position(t);
        (12.0 - eqt).rem_euclid(24.0)
    }

    /// Time the sun is `angle` degrees below the horizon, before noon when `ccw`.
    fn angle_time(&self, angle: f64, t: f64, ccw: bool) -> Option<f64> {
        let (decl, _) = self.position(t);
        let noon = self.mid_day(t);
        let (decl, lat) = (decl.to_radians(), self.latitude.to_radians());
        let cos_h = (-angle.to_radians().sin() - decl.sin() * lat.sin()) / (decl.cos() * lat.cos());
        if !(-1.0..=1.0).contains(&cos_h) {
            return None;
        }
        let h = cos_h.acos().to_degrees() / 15.0;
        Some(if ccw { noon - h } else { noon + h })
    }

    fn asr_time(&self, factor: f64, t: f64) -> Option<f64> {
        let (decl, _) = self.position(t);
        let zenith_at_noon = (self.latitude - decl).abs().to_radians();
        let altitude = (1.0 / (factor + zenith_at_noon.tan())).atan().to_degrees();
        self.angle_time(-altitude, t, false)
    }
}

fn hours_to_time(hours: f64) -> NaiveTime {
    let minutes = (hours.rem_euclid(24.0) * 60.0).round() as u32 % (24 * 60);
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prayer::next_prayer;
    use chrono::Timelike;

    fn minutes(t: NaiveTime) -> i64 {
        (t.hour() * 60 + t.minute()) as i64
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn london_in_may_is_close_to_published_times() {
        let schedule = approximate(GeoCoordinate::new(51.5074, -0.1278), ymd(2025, 5, 1), 1.0);
        assert!(schedule.offline);
        assert!(schedule.validate().is_ok());

        // Published: solar noon 12:57, sunset 20:22 (BST)
        let dhuhr = minutes(schedule.get(Prayer::Dhuhr).unwrap());
        let maghrib = minutes(schedule.get(Prayer::Maghrib).unwrap());
        assert!((dhuhr - (12 * 60 + 57)).abs() <= 3, "dhuhr {dhuhr}");
        assert!((maghrib - (20 * 60 + 22)).abs() <= 5, "maghrib {maghrib}");
    }

    #[test]
    fn prayers_are_in_canonical_order() {
        for (location, offset) in [
            (GeoCoordinate::new(21.4225, 39.8262), 3.0),
            (GeoCoordinate::new(40.7128, -74.0060), -5.0),
            (GeoCoordinate::new(-33.8688, 151.2093), 10.0),
        ] {
            let schedule = approximate(location, ymd(2025, 3, 20), offset);
            let times: Vec<_> = schedule.iter().map(|(_, t)| t).collect();
            assert_eq!(times.len(), 5);
            assert!(
                times.windows(2).all(|w| w[0] < w[1]),
                "out of order at {location:?}: {times:?}"
            );
        }
    }

    #[test]
    fn midnight_sun_leaves_gaps() {
        // Tromsø at midsummer: the sun never sets
        let schedule = approximate(GeoCoordinate::new(69.6492, 18.9553), ymd(2025, 6, 21), 2.0);
        assert!(schedule.get(Prayer::Dhuhr).is_some());
        assert!(schedule.get(Prayer::Maghrib).is_none());
        assert!(next_prayer(&schedule, NaiveTime::default()).is_err());
    }

    #[test]
    fn hours_wrap_into_a_day() {
        assert_eq!(hours_to_time(25.5), NaiveTime::from_hms_opt(1, 30, 0).unwrap());
        assert_eq!(hours_to_time(-0.25), NaiveTime::from_hms_opt(23, 45, 0).unwrap());
        assert_eq!(hours_to_time(23.999), NaiveTime::default());
    }
}
