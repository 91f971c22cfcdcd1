//! # Quran Text Retrieval
//!
//! Client for the public alquran.cloud API: the surah index, a surah in a given
//! edition (Arabic recitation text or a translation) and a juz (para).
//!
//! Every response is wrapped in an envelope `{ code, status, data }` where
//! `code == 200` signals success.
//!
//! The juz boundaries and their traditional names are static, so the juz index
//! ([`JUZ`]) works without a network connection.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const API_BASE: &str = "https://api.alquran.cloud/v1";

/// Translation used when the requested one cannot be loaded.
pub const DEFAULT_TRANSLATION: &str = "en.asad";

/// Number of surahs in the Quran.
pub const SURAH_COUNT: u32 = 114;
/// Number of juz (paras) the Quran is divided into.
pub const JUZ_COUNT: u32 = 30;

#[derive(Error, Debug)]
pub enum QuranError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Quran API error: {0}")]
    Api(String),

    /// Requested surah or juz number is out of range
    #[error("{kind} {number} does not exist")]
    NotFound { kind: &'static str, number: u32 },
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: u16,
    status: String,
    data: Option<T>,
}

/// Surah summary as listed in the index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surah {
    pub number: u32,
    /// Arabic name
    pub name: String,
    pub english_name: String,
    pub english_name_translation: String,
    pub number_of_ayahs: u32,
    /// "Meccan" or "Medinan"
    pub revelation_type: String,
}

/// A single verse in some edition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ayah {
    /// Position in the whole Quran (1..=6236)
    pub number: u32,
    pub text: String,
    pub number_in_surah: u32,
    #[serde(default)]
    pub juz: Option<u32>,
    /// Recitation URL, present for audio editions
    #[serde(default)]
    pub audio: Option<String>,
}

/// A surah with its verses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurahText {
    #[serde(flatten)]
    pub surah: Surah,
    pub ayahs: Vec<Ayah>,
}

/// A verse inside a juz, tagged with the surah it belongs to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JuzAyah {
    #[serde(flatten)]
    pub ayah: Ayah,
    pub surah: Surah,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JuzText {
    pub number: u32,
    pub ayahs: Vec<JuzAyah>,
}

/// Thin async client over the alquran.cloud REST API.
pub struct QuranClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for QuranClient {
    fn default() -> Self {
        Self::new(API_BASE)
    }
}

impl QuranClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// The 114-entry surah index.
    pub async fn surahs(&self) -> Result<Vec<Surah>, QuranError> {
        self.get("surah").await
    }

    /// Surah `number` in `edition` (e.g. `ar.alafasy`, `en.asad`).
    pub async fn surah(&self, number: u32, edition: &str) -> Result<SurahText, QuranError> {
        check_range("surah", number, SURAH_COUNT)?;
        self.get(&format!("surah/{number}/{edition}")).await
    }

    /// Juz `number` in `edition`.
    pub async fn juz(&self, number: u32, edition: &str) -> Result<JuzText, QuranError> {
        check_range("juz", number, JUZ_COUNT)?;
        self.get(&format!("juz/{number}/{edition}")).await
    }

    /// Surah `number` in translation `edition`, retrying with
    /// [`DEFAULT_TRANSLATION`] when that edition cannot be loaded.
    ///
    /// # Returns
    /// - `Ok(SurahText)`: the requested translation, or the default one
    /// - `Err(QuranError)`: the surah number is out of range, or both editions failed
    pub async fn translation(&self, number: u32, edition: &str) -> Result<SurahText, QuranError> {
        match self.surah(number, edition).await {
            Ok(text) => Ok(text),
            Err(e @ QuranError::NotFound { .. }) => Err(e),
            Err(e) if edition != DEFAULT_TRANSLATION => {
                warn!(edition, "translation unavailable ({}), using {}", e, DEFAULT_TRANSLATION);
                self.surah(number, DEFAULT_TRANSLATION).await
            }
            Err(e) => Err(e),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, QuranError> {
        let url = format!("{}/{}", self.base_url, path);
        info!(%url, "fetching Quran data");
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        decode(&body)
    }
}

fn check_range(kind: &'static str, number: u32, max: u32) -> Result<(), QuranError> {
    if (1..=max).contains(&number) {
        Ok(())
    } else {
        Err(QuranError::NotFound { kind, number })
    }
}

/// Unwrap an alquran.cloud envelope.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, QuranError> {
    let envelope: Envelope<T> =
        serde_json::from_str(body).map_err(|e| QuranError::Api(e.to_string()))?;
    if envelope.code != 200 {
        return Err(QuranError::Api(format!(
            "{} {}",
            envelope.code, envelope.status
        )));
    }
    envelope
        .data
        .ok_or_else(|| QuranError::Api("response has no data".to_string()))
}

/// Surahs whose English name, translated name, Arabic name or number contains
/// `query` (case-insensitive). An empty query matches everything.
pub fn search_surahs<'a>(surahs: &'a [Surah], query: &str) -> Vec<&'a Surah> {
    let query = query.trim().to_lowercase();
    surahs
        .iter()
        .filter(|s| {
            query.is_empty()
                || s.english_name.to_lowercase().contains(&query)
                || s.english_name_translation.to_lowercase().contains(&query)
                || s.name.contains(&query)
                || s.number.to_string().contains(&query)
        })
        .collect()
}

/// A verse position, `surah:ayah`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct VerseRef {
    pub surah: u32,
    pub ayah: u32,
}

/// Boundaries and traditional name of one juz.
#[derive(Debug)]
pub struct JuzInfo {
    pub number: u32,
    /// Opening words by which the juz is known, e.g. "Alif Lam Meem"
    pub name: &'static str,
    pub start: VerseRef,
    pub end: VerseRef,
}

impl JuzInfo {
    /// Whether any verse of surah `number` falls in this juz.
    pub fn contains_surah(&self, number: u32) -> bool {
        (self.start.surah..=self.end.surah).contains(&number)
    }

    /// Whether `verse` falls in this juz.
    pub fn contains(&self, verse: VerseRef) -> bool {
        (self.start..=self.end).contains(&verse)
    }
}

const fn juz(number: u32, name: &'static str, start: (u32, u32), end: (u32, u32)) -> JuzInfo {
    JuzInfo {
        number,
        name,
        start: VerseRef {
            surah: start.0,
            ayah: start.1,
        },
        end: VerseRef {
            surah: end.0,
            ayah: end.1,
        },
    }
}

/// The thirty juz in order.
pub const JUZ: [JuzInfo; 30] = [
    juz(1, "Alif Lam Meem", (1, 1), (2, 141)),
    juz(2, "Sayaqool", (2, 142), (2, 252)),
    juz(3, "Tilkal Rusul", (2, 253), (3, 92)),
    juz(4, "Lan Tana Loo", (3, 93), (4, 23)),
    juz(5, "Wal Mohsanat", (4, 24), (4, 147)),
    juz(6, "La Yuhibbullah", (4, 148), (5, 81)),
    juz(7, "Wa Iza Samiu", (5, 82), (6, 110)),
    juz(8, "Wa Lau Annana", (6, 111), (7, 87)),
    juz(9, "Qalal Malao", (7, 88), (8, 40)),
    juz(10, "Wa A'lamu", (8, 41), (9, 92)),
    juz(11, "Yatazeroon", (9, 93), (11, 5)),
    juz(12, "Wa Mamin Da'abat", (11, 6), (12, 52)),
    juz(13, "Wa Ma Ubrioo", (12, 53), (14, 52)),
    juz(14, "Rubama", (15, 1), (16, 128)),
    juz(15, "Subhanallazi", (17, 1), (18, 74)),
    juz(16, "Qal Alam", (18, 75), (20, 135)),
    juz(17, "Aqtarabo", (21, 1), (22, 78)),
    juz(18, "Qad Aflaha", (23, 1), (25, 20)),
    juz(19, "Wa Qalallazina", (25, 21), (27, 55)),
    juz(20, "A'man Khalaq", (27, 56), (29, 45)),
    juz(21, "Utlu Ma Oohi", (29, 46), (33, 30)),
    juz(22, "Wa Manyaqnut", (33, 31), (36, 27)),
    juz(23, "Wa Mali", (36, 28), (39, 31)),
    juz(24, "Faman Azlam", (39, 32), (41, 46)),
    juz(25, "Elahe Yuruddo", (41, 47), (45, 37)),
    juz(26, "Haa Meem", (46, 1), (51, 30)),
    juz(27, "Qala Fama Khatbukum", (51, 31), (57, 29)),
    juz(28, "Qad Sami Allah", (58, 1), (66, 12)),
    juz(29, "Tabarakallazi", (67, 1), (77, 50)),
    juz(30, "Amma Yatasa'aloon", (78, 1), (114, 6)),
];

/// Index entry for juz `number` (1-based).
pub fn juz_info(number: u32) -> Option<&'static JuzInfo> {
    JUZ.get(number.checked_sub(1)? as usize)
}
