//! # Verse Bookmarks
//!
//! Saved verses behind a small repository interface ([`BookmarkRepository`]).
//!
//! ## Identity
//! A bookmark is identified by `(surah_number, ayah_number)`; adding the same
//! verse twice keeps the first entry.
//!
//! ## Storage
//! - [`JsonBookmarkStore`]: a JSON array in a single file, rewritten through a
//!   temp file and rename so a crash mid-write leaves the old list intact. A
//!   missing file is an empty list.
//! - [`MemoryBookmarkStore`]: a plain vector, for tests and one-off sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum BookmarkError {
    #[error("bookmark store IO: {0}")]
    Io(#[from] io::Error),

    #[error("bookmark store is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub surah_number: u32,
    pub ayah_number: u32,
    pub surah_name: String,
    pub timestamp: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(surah_number: u32, ayah_number: u32, surah_name: impl Into<String>) -> Self {
        Self {
            surah_number,
            ayah_number,
            surah_name: surah_name.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_verse(&self, surah_number: u32, ayah_number: u32) -> bool {
        self.surah_number == surah_number && self.ayah_number == ayah_number
    }
}

/// Persistent list of bookmarks.
pub trait BookmarkRepository {
    /// All bookmarks in insertion order.
    fn list(&self) -> Result<Vec<Bookmark>, BookmarkError>;

    /// Save a bookmark.
    ///
    /// # Returns
    /// - `Ok(true)`: the bookmark was stored
    /// - `Ok(false)`: the verse was already bookmarked; nothing changed
    /// - `Err(BookmarkError)`: the store could not be read or written
    fn add(&mut self, bookmark: Bookmark) -> Result<bool, BookmarkError>;

    /// Delete the bookmark for a verse. Returns false if there was none.
    fn remove(&mut self, surah_number: u32, ayah_number: u32) -> Result<bool, BookmarkError>;
}

/// Bookmarks kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryBookmarkStore {
    items: Vec<Bookmark>,
}

impl BookmarkRepository for MemoryBookmarkStore {
    fn list(&self) -> Result<Vec<Bookmark>, BookmarkError> {
        Ok(self.items.clone())
    }

    fn add(&mut self, bookmark: Bookmark) -> Result<bool, BookmarkError> {
        Ok(insert(&mut self.items, bookmark))
    }

    fn remove(&mut self, surah_number: u32, ayah_number: u32) -> Result<bool, BookmarkError> {
        Ok(delete(&mut self.items, surah_number, ayah_number))
    }
}

fn insert(items: &mut Vec<Bookmark>, bookmark: Bookmark) -> bool {
    if items
        .iter()
        .any(|b| b.is_verse(bookmark.surah_number, bookmark.ayah_number))
    {
        return false;
    }
    items.push(bookmark);
    true
}

fn delete(items: &mut Vec<Bookmark>, surah_number: u32, ayah_number: u32) -> bool {
    let before = items.len();
    items.retain(|b| !b.is_verse(surah_number, ayah_number));
    items.len() != before
}

/// Bookmarks stored as a JSON array in a file.
///
/// # Example
/// ```no_run
/// use salat_lib::bookmarks::{Bookmark, BookmarkRepository, JsonBookmarkStore};
///
/// let mut store = JsonBookmarkStore::new("quran-bookmarks.json");
/// store.add(Bookmark::new(18, 10, "Al-Kahf"))?;
/// assert_eq!(store.list()?.len(), 1);
/// # Ok::<(), salat_lib::bookmarks::BookmarkError>(())
/// ```
#[derive(Debug)]
pub struct JsonBookmarkStore {
    path: PathBuf,
}

impl JsonBookmarkStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> Result<Vec<Bookmark>, BookmarkError> {
        match fs::read(&self.path) {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, items: &[Bookmark]) -> Result<(), BookmarkError> {
        let json = serde_json::to_vec_pretty(items)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;
        debug!(path = %self.path.display(), count = items.len(), "bookmarks saved");
        Ok(())
    }
}

impl BookmarkRepository for JsonBookmarkStore {
    fn list(&self) -> Result<Vec<Bookmark>, BookmarkError> {
        self.load()
    }

    fn add(&mut self, bookmark: Bookmark) -> Result<bool, BookmarkError> {
        let mut items = self.load()?;
        let added = insert(&mut items, bookmark);
        if added {
            self.save(&items)?;
        }
        Ok(added)
    }

    fn remove(&mut self, surah_number: u32, ayah_number: u32) -> Result<bool, BookmarkError> {
        let mut items = self.load()?;
        let removed = delete(&mut items, surah_number, ayah_number);
        if removed {
            self.save(&items)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise(store: &mut dyn BookmarkRepository) {
        assert!(store.list().unwrap().is_empty());
        assert!(store.add(Bookmark::new(2, 255, "Al-Baqara")).unwrap());
        assert!(store.add(Bookmark::new(18, 10, "Al-Kahf")).unwrap());
        assert!(!store.add(Bookmark::new(2, 255, "Al-Baqara")).unwrap());

        let names: Vec<_> = store.list().unwrap().into_iter().map(|b| b.surah_name).collect();
        assert_eq!(names, vec!["Al-Baqara", "Al-Kahf"]);

        assert!(store.remove(2, 255).unwrap());
        assert!(!store.remove(2, 255).unwrap());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn memory_store_behaves() {
        exercise(&mut MemoryBookmarkStore::default());
    }

    #[test]
    fn json_store_behaves() {
        let dir = TempDir::new().unwrap();
        exercise(&mut JsonBookmarkStore::new(dir.path().join("bookmarks.json")));
    }

    #[test]
    fn json_store_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bookmarks.json");

        let mut store = JsonBookmarkStore::new(&path);
        store.add(Bookmark::new(36, 1, "Ya-Seen")).unwrap();
        drop(store);

        let reopened = JsonBookmarkStore::new(&path);
        let items = reopened.list().unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_verse(36, 1));
        assert!(!dir.path().join("bookmarks.json.tmp").exists());
    }

    #[test]
    fn reads_camel_case_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bookmarks.json");
        fs::write(
            &path,
            r#"[{"surahNumber":1,"ayahNumber":5,"surahName":"Al-Faatiha","timestamp":"2024-03-11T18:02:00.000Z"}]"#,
        )
        .unwrap();

        let items = JsonBookmarkStore::new(&path).list().unwrap();
        assert_eq!(items[0].ayah_number, 5);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bookmarks.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonBookmarkStore::new(&path).list(),
            Err(BookmarkError::Json(_))
        ));
    }
}
