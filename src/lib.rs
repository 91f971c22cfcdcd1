//! # Salat Tracker Core Library
//!
//! This library provides the data structures and calculations behind the salat
//! tracker application: the Qibla bearing, the daily prayer schedule and the
//! "next prayer" lookup, the compass orientation tracker, Hijri dates, Quran text
//! retrieval and verse bookmarks.
//!
//! ## Design Philosophy
//!
//! ### Pure Core, Thin Edges
//! - **Stateless math**: the bearing and next-prayer lookups are pure functions over
//!   small `Copy` values; identical input always gives identical output
//! - **External data at the edges**: prayer timetables and Quran text come from
//!   public HTTP APIs ([`prayer_data`], [`quran`]) and are handed to the core as
//!   plain values
//! - **Offline-aware**: when the prayer-time service is unreachable an astronomical
//!   approximation ([`fallback`]) takes over and the schedule is marked offline
//!
//! ### Data Flow
//! 1. **Location**: read from `salat-config.toml` or the command line
//! 2. **Qibla**: [`qibla::qibla_bearing`] → rotation via [`compass::OrientationTracker`]
//! 3. **Prayers**: fetch Aladhan timetable → cache → [`prayer::next_prayer`]
//! 4. **Display**: ASCII output through [`renderer`]
//!
//! ## Core Types
//!
//! - [`GeoCoordinate`]: a latitude/longitude pair in degrees
//! - [`KAABA`]: the fixed Qibla target

use serde::{Deserialize, Serialize};

pub mod bookmarks;
pub mod compass;
pub mod config;
pub mod fallback;
pub mod hijri;
pub mod prayer;
pub mod prayer_data;
pub mod qibla;
pub mod quran;
pub mod reader;
pub mod renderer;

/// A point on the Earth's surface in decimal degrees.
///
/// Latitude is expected in `[-90, 90]` and longitude in `[-180, 180]`, but the
/// type does not enforce it: calculations accept any finite value and produce a
/// mathematically defined (if meaningless) result for out-of-range input. Use
/// [`GeoCoordinate::is_valid`] when the source is untrusted.
///
/// # Example
/// ```
/// use salat_lib::GeoCoordinate;
///
/// let london = GeoCoordinate::new(51.5074, -0.1278);
/// assert!(london.is_valid());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Degrees north of the equator (negative for south)
    pub latitude: f64,
    /// Degrees east of Greenwich (negative for west)
    pub longitude: f64,
}

impl GeoCoordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both components are finite and inside their geographic range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Location of the Kaaba in Mecca, the target of every Qibla bearing.
pub const KAABA: GeoCoordinate = GeoCoordinate::new(21.4225, 39.8262);
