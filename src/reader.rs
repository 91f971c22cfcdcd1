//! # Reading and Recitation
//!
//! Helpers for working through a surah in the terminal.
//!
//! ## Pagination
//! Long surahs are shown [`Page`] by page (15 verses by default). Page numbers
//! are 1-based and always clamped into range, so a stale page number from the
//! command line still shows something sensible.
//!
//! ## Audio
//! Per-verse recitations come from everyayah.com, addressed by a six-digit
//! verse key. [`AudioQueue`] plays a whole surah one verse after another.

use std::collections::VecDeque;
use std::ops::Range;

const AUDIO_BASE: &str = "https://everyayah.com/data";

/// One page of a verse listing. Pages are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub current: usize,
    pub total: usize,
    pub per_page: usize,
    items: usize,
}

impl Page {
    /// Page `current` of `items` verses, clamped into the valid range.
    ///
    /// # Example
    /// ```
    /// use salat_lib::reader::Page;
    ///
    /// let last = Page::new(286, 15, 99);
    /// assert_eq!((last.current, last.total), (20, 20));
    /// assert_eq!(last.range(), 285..286);
    /// ```
    pub fn new(items: usize, per_page: usize, current: usize) -> Self {
        let per_page = per_page.max(1);
        let total = items.div_ceil(per_page).max(1);
        Self {
            current: current.clamp(1, total),
            total,
            per_page,
            items,
        }
    }

    /// Index range of the verses on this page.
    pub fn range(&self) -> Range<usize> {
        let start = ((self.current - 1) * self.per_page).min(self.items);
        let end = (start + self.per_page).min(self.items);
        start..end
    }

    pub fn next(&self) -> Option<Page> {
        (self.current < self.total).then(|| Page::new(self.items, self.per_page, self.current + 1))
    }

    pub fn previous(&self) -> Option<Page> {
        (self.current > 1).then(|| Page::new(self.items, self.per_page, self.current - 1))
    }
}

/// Six-digit everyayah key: surah and ayah zero-padded to three digits each.
pub fn verse_key(surah: u32, ayah: u32) -> String {
    format!("{surah:03}{ayah:03}")
}

/// MP3 URL for a single verse by `reciter` (an everyayah folder name).
///
/// # Example
/// ```
/// use salat_lib::reader::audio_url;
///
/// assert_eq!(
///     audio_url("Alafasy_128kbps", 1, 7),
///     "https://everyayah.com/data/Alafasy_128kbps/001007.mp3"
/// );
/// ```
pub fn audio_url(reciter: &str, surah: u32, ayah: u32) -> String {
    format!("{AUDIO_BASE}/{reciter}/{}.mp3", verse_key(surah, ayah))
}

/// A verse ready to be handed to a player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub surah: u32,
    pub ayah: u32,
    pub url: String,
}

/// Sequential playback of a whole surah, one verse after another.
///
/// The player calls [`AudioQueue::advance`] whenever the current track ends.
/// Stopping empties the queue; the queue also reports finished once the last
/// verse has been handed out.
#[derive(Debug)]
pub struct AudioQueue {
    reciter: String,
    surah: u32,
    pending: VecDeque<u32>,
    current: Option<u32>,
}

impl AudioQueue {
    pub fn for_surah(reciter: &str, surah: u32, ayahs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            reciter: reciter.to_string(),
            surah,
            pending: ayahs.into_iter().collect(),
            current: None,
        }
    }

    /// Move to the next verse.
    ///
    /// # Returns
    /// - `Some(Track)`: the verse that is now playing
    /// - `None`: the surah has finished or the queue was stopped
    pub fn advance(&mut self) -> Option<Track> {
        self.current = self.pending.pop_front();
        self.current.map(|ayah| Track {
            surah: self.surah,
            ayah,
            url: audio_url(&self.reciter, self.surah, ayah),
        })
    }

    pub fn current(&self) -> Option<u32> {
        self.current
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn stop(&mut self) {
        self.pending.clear();
        self.current = None;
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none() && self.pending.is_empty()
    }
}

impl Iterator for AudioQueue {
    type Item = Track;

    fn next(&mut self) -> Option<Track> {
        self.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baqarah_has_twenty_pages() {
        let first = Page::new(286, 15, 1);
        assert_eq!(first.total, 20);
        assert_eq!(first.range(), 0..15);

        let last = Page::new(286, 15, 20);
        assert_eq!(last.range(), 285..286);
        assert!(last.next().is_none());
        assert_eq!(last.previous().map(|p| p.current), Some(19));
    }

    #[test]
    fn page_number_is_clamped() {
        assert_eq!(Page::new(7, 15, 9).current, 1);
        assert_eq!(Page::new(7, 15, 0).current, 1);
        assert_eq!(Page::new(0, 15, 1).range(), 0..0);
    }

    #[test]
    fn verse_keys_are_zero_padded() {
        assert_eq!(verse_key(1, 7), "001007");
        assert_eq!(verse_key(114, 6), "114006");
        assert_eq!(
            audio_url("Alafasy_128kbps", 2, 255),
            "https://everyayah.com/data/Alafasy_128kbps/002255.mp3"
        );
    }

    #[test]
    fn queue_plays_in_order_then_finishes() {
        let mut queue = AudioQueue::for_surah("Alafasy_128kbps", 112, 1..=4);
        let ayahs: Vec<u32> = queue.by_ref().map(|t| t.ayah).collect();
        assert_eq!(ayahs, vec![1, 2, 3, 4]);
        assert!(queue.is_finished());
    }

    #[test]
    fn stopping_clears_the_queue() {
        let mut queue = AudioQueue::for_surah("Alafasy_128kbps", 1, 1..=7);
        let first = queue.advance().unwrap();
        assert_eq!(first.url, "https://everyayah.com/data/Alafasy_128kbps/001001.mp3");
        assert_eq!(queue.remaining(), 6);

        queue.stop();
        assert!(queue.is_finished());
        assert!(queue.advance().is_none());
    }
}
