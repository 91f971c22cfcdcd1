use chrono::{Duration, NaiveDate, NaiveTime};
use proptest::prelude::*;
use salat_lib::compass::OrientationTracker;
use salat_lib::hijri::HijriDate;
use salat_lib::prayer::{next_prayer, Prayer, PrayerSchedule};
use salat_lib::qibla::{compute_bearing, normalize_degrees, qibla_bearing};
use salat_lib::GeoCoordinate;

fn latitude_strategy() -> impl Strategy<Value = f64> {
    -90.0..=90.0
}

fn longitude_strategy() -> impl Strategy<Value = f64> {
    -180.0..=180.0
}

/// Five strictly increasing minutes of the day, Fajr first.
fn schedule_strategy() -> impl Strategy<Value = [u32; 5]> {
    prop::collection::btree_set(0u32..1440, 5).prop_map(|set| {
        let v: Vec<u32> = set.into_iter().collect();
        [v[0], v[1], v[2], v[3], v[4]]
    })
}

fn minute(m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(m / 60, m % 60, 0).unwrap()
}

proptest! {
    /// Every valid origin has a Qibla bearing inside [0, 360)
    #[test]
    fn qibla_bearing_in_range(lat in latitude_strategy(), lon in longitude_strategy()) {
        let bearing = qibla_bearing(GeoCoordinate::new(lat, lon));
        prop_assert!(bearing.is_finite());
        prop_assert!((0.0..360.0).contains(&bearing), "bearing {bearing} for ({lat}, {lon})");
    }

    /// Same input, same output
    #[test]
    fn bearing_is_deterministic(
        a in (latitude_strategy(), longitude_strategy()),
        b in (-89.0..89.0, longitude_strategy()),
    ) {
        let origin = GeoCoordinate::new(a.0, a.1);
        let target = GeoCoordinate::new(b.0, b.1);
        prop_assert_eq!(
            compute_bearing(origin, target).to_bits(),
            compute_bearing(origin, target).to_bits()
        );
    }

    #[test]
    fn normalized_angles_stay_in_range(deg in -1.0e6f64..1.0e6) {
        let n = normalize_degrees(deg);
        prop_assert!((0.0..360.0).contains(&n));
    }

    /// The needle rotation is always a proper angle, and turning the device to
    /// the Qibla zeroes it.
    #[test]
    fn tracker_rotation_in_range(bearing in 0.0f64..360.0, heading in -720.0f64..720.0) {
        let mut tracker = OrientationTracker::new(bearing);
        tracker.apply(heading);
        let rotation = tracker.rotation();
        prop_assert!((0.0..360.0).contains(&rotation));

        tracker.apply(bearing);
        let r = tracker.rotation();
        prop_assert!(r < 1e-9 || r > 360.0 - 1e-9);
    }

    /// The next prayer is the first one strictly after `now`, else tomorrow's Fajr.
    #[test]
    fn next_prayer_is_first_later_entry(times in schedule_strategy(), now in 0u32..1440) {
        let schedule = Prayer::ALL
            .iter()
            .zip(times)
            .fold(PrayerSchedule::new(), |s, (&p, m)| s.with(p, minute(m)));

        let expected = Prayer::ALL
            .iter()
            .zip(times)
            .find(|(_, m)| *m > now)
            .map(|(&p, _)| p)
            .unwrap_or(Prayer::Fajr);

        prop_assert_eq!(next_prayer(&schedule, minute(now)).unwrap(), expected);
    }

    /// Gregorian -> Hijri -> Gregorian is the identity.
    #[test]
    fn hijri_round_trip(offset in 0i64..60_000) {
        let date = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap() + Duration::days(offset);
        let hijri = HijriDate::from_gregorian(date).unwrap();
        prop_assert_eq!(hijri.to_gregorian(), Some(date));
    }
}
