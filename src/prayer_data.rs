//! # Prayer Timetable Fetching and Caching
//!
//! This module handles all network operations for fetching the daily prayer
//! timetable from the Aladhan prayer-times service. It caches the result on disk
//! so repeated runs on the same day do not hit the network.
//!
//! ## Data Source
//!
//! ### Aladhan Timings API
//! - **URL**: `https://api.aladhan.com/v1/timings/{unix}?latitude=..&longitude=..&method=N`
//! - **Format**: JSON envelope `{ code, status, data: { timings: { "Fajr": "04:31", ... } } }`
//! - **Method**: calculation convention, configurable (default 2, ISNA)
//!
//! ## Caching Strategy
//! - **Location**: configurable, default `/tmp/salat_cache.json` (cleared on reboot)
//! - **TTL**: file modification age, configurable
//! - **Validation**: the cached entry must also match the requested date,
//!   coordinates and method; moving or crossing midnight forces a refetch
//!
//! ## Error Handling
//! All failures surface as [`PrayerDataError`]. The caller is expected to fall
//! back to [`crate::fallback::approximate`] so the application keeps working offline.

use crate::config::Config;
use crate::prayer::{PrayerError, PrayerSchedule};
use crate::GeoCoordinate;
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, SystemTime};
use std::{fs, io};
use thiserror::Error;
use tracing::{debug, info};

const TIMINGS_URL: &str = "https://api.aladhan.com/v1/timings";

/// Errors that can occur while obtaining a prayer timetable.
#[derive(Error, Debug)]
pub enum PrayerDataError {
    /// HTTP request failed (network, server, or protocol error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered but not with a usable timetable
    #[error("prayer-time service error: {0}")]
    Api(String),

    /// Timetable present but malformed
    #[error("bad timetable: {0}")]
    Schedule(#[from] PrayerError),

    /// Cache file operations failed
    #[error("cache IO: {0}")]
    Cache(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct AladhanResponse {
    code: u16,
    status: String,
    data: Option<AladhanData>,
}

#[derive(Debug, Deserialize)]
struct AladhanData {
    timings: HashMap<String, String>,
}

/// What was asked for; a cache entry is only reused for an identical request.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimetableRequest {
    pub date: NaiveDate,
    pub location: GeoCoordinate,
    pub method: u8,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    request: TimetableRequest,
    schedule: PrayerSchedule,
}

/// Fetch today's prayer times for the configured location, cache first.
///
/// # Returns
/// - `Ok(PrayerSchedule)`: cached or freshly fetched timetable (`offline == false`)
/// - `Err(PrayerDataError)`: both cache and network failed
pub async fn fetch(config: &Config, now: DateTime<Local>) -> Result<PrayerSchedule, PrayerDataError> {
    let request = TimetableRequest {
        date: now.date_naive(),
        location: config.coordinate(),
        method: config.prayer.method,
    };
    let ttl = Duration::from_secs(config.prayer.cache_ttl_minutes * 60);

    match load_cache(&config.prayer.cache_path, &request, ttl) {
        Ok(schedule) => {
            debug!(path = %config.prayer.cache_path.display(), "using cached timetable");
            return Ok(schedule);
        }
        Err(e) => debug!("cache miss: {}", e),
    }

    let url = timings_url(request.location, now.timestamp(), request.method);
    info!(%url, "fetching prayer times");
    let body = reqwest::get(&url).await?.error_for_status()?.text().await?;
    let schedule = parse_response(&body)?;

    // Cache write failures are not fatal
    if let Err(e) = save_cache(&config.prayer.cache_path, &request, &schedule) {
        debug!("could not write cache: {}", e);
    }

    Ok(schedule)
}

/// Aladhan timings URL for an instant and location.
pub fn timings_url(location: GeoCoordinate, unix_time: i64, method: u8) -> String {
    format!(
        "{TIMINGS_URL}/{unix_time}?latitude={}&longitude={}&method={method}",
        location.latitude, location.longitude
    )
}

/// Parse an Aladhan JSON body into a schedule.
pub fn parse_response(body: &str) -> Result<PrayerSchedule, PrayerDataError> {
    let response: AladhanResponse =
        serde_json::from_str(body).map_err(|e| PrayerDataError::Api(e.to_string()))?;

    if response.code != 200 {
        return Err(PrayerDataError::Api(format!(
            "{} {}",
            response.code, response.status
        )));
    }
    let data = response
        .data
        .ok_or_else(|| PrayerDataError::Api("response has no data".to_string()))?;

    Ok(PrayerSchedule::from_timings(&data.timings)?)
}

/// Load a schedule from the cache file if it is fresh and answers `request`.
pub fn load_cache(
    path: &Path,
    request: &TimetableRequest,
    ttl: Duration,
) -> Result<PrayerSchedule, io::Error> {
    let meta = fs::metadata(path)?;

    let age = SystemTime::now()
        .duration_since(meta.modified()?)
        .map_err(|_| io::Error::other("time error"))?;
    if age > ttl {
        return Err(io::Error::other("stale"));
    }

    let entry: CacheEntry = serde_json::from_slice(&fs::read(path)?)?;
    if entry.request != *request {
        return Err(io::Error::other("cached timetable is for another day or place"));
    }
    Ok(entry.schedule)
}

/// Write `schedule` to the cache file.
pub fn save_cache(
    path: &Path,
    request: &TimetableRequest,
    schedule: &PrayerSchedule,
) -> Result<(), io::Error> {
    let entry = CacheEntry {
        request: *request,
        schedule: schedule.clone(),
    };
    fs::write(path, serde_json::to_vec(&entry)?)?;
    Ok(())
}
