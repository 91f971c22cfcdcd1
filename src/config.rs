//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the salat-config.toml file.
//! It provides a centralized way to configure the observer's location, the prayer-time
//! calculation method, Quran editions and the bookmark store.

use crate::GeoCoordinate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "salat-config.toml";

/// Application configuration loaded from salat-config.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Observer location
    pub location: LocationConfig,
    /// Prayer-time service settings
    pub prayer: PrayerConfig,
    /// Quran text and audio settings
    pub quran: QuranConfig,
    /// Bookmark storage
    pub bookmarks: BookmarkConfig,
}

/// Observer location used for the Qibla bearing and prayer times
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationConfig {
    /// Human-readable place name for reference
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Prayer-time lookup configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrayerConfig {
    /// Aladhan calculation method (2 = Islamic Society of North America)
    pub method: u8,
    /// Cache TTL in minutes
    pub cache_ttl_minutes: u64,
    /// Where the fetched timetable is cached
    pub cache_path: PathBuf,
}

/// Quran retrieval configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuranConfig {
    /// Arabic text edition (also selects the recitation on alquran.cloud)
    pub edition: String,
    /// Translation edition shown under each verse
    pub translation: String,
    /// everyayah.com reciter folder for per-verse audio
    pub reciter: String,
    /// Verses shown per page when reading a surah
    pub verses_per_page: usize,
}

/// Bookmark store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookmarkConfig {
    /// JSON file holding saved bookmarks
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            location: LocationConfig {
                name: "Mecca".to_string(),
                latitude: 21.4225,
                longitude: 39.8262,
            },
            prayer: PrayerConfig {
                method: 2,
                cache_ttl_minutes: 360,
                cache_path: PathBuf::from("/tmp/salat_cache.json"),
            },
            quran: QuranConfig {
                edition: "ar.alafasy".to_string(),
                translation: "en.asad".to_string(),
                reciter: "Alafasy_128kbps".to_string(),
                verses_per_page: 15,
            },
            bookmarks: BookmarkConfig {
                path: PathBuf::from("quran-bookmarks.json"),
            },
        }
    }
}

impl Config {
    /// Load configuration from salat-config.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(location = %config.location.name, "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!("invalid config file format: {}", e);
                    warn!("using default configuration (Mecca)");
                    Self::default()
                }
            },
            Err(_) => {
                info!("no config file found, using default configuration (Mecca)");
                Self::default()
            }
        }
    }

    /// Save current configuration to `path`
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }

    /// The configured observer position.
    pub fn coordinate(&self) -> GeoCoordinate {
        GeoCoordinate::new(self.location.latitude, self.location.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.location.name, "Mecca");
        assert_eq!(config.prayer.method, 2);
        assert_eq!(config.quran.verses_per_page, 15);
        assert_eq!(config.quran.translation, "en.asad");
        assert!(config.coordinate().is_valid());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.location.name, parsed.location.name);
        assert_eq!(config.bookmarks.path, parsed.bookmarks.path);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config.location.name, "Mecca");
    }

    #[test]
    fn test_load_custom_location() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.location = LocationConfig {
            name: "London".to_string(),
            latitude: 51.5074,
            longitude: -0.1278,
        };
        config.save_to_path(file.path()).unwrap();

        let loaded = Config::load_from_path(file.path());
        assert_eq!(loaded.location.name, "London");
        assert_eq!(loaded.coordinate(), GeoCoordinate::new(51.5074, -0.1278));
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "location = \"nowhere\"").unwrap();
        let config = Config::load_from_path(file.path());
        assert_eq!(config.location.name, "Mecca");
    }
}
