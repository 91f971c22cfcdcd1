//! # Terminal Rendering
//!
//! This module renders the application's views as plain text: the Qibla compass,
//! the prayer timetable, Hijri dates, Quran pages and bookmarks. Every function
//! returns a `String` so the views can be tested without a terminal; the binary
//! prints them to stdout.

use crate::bookmarks::Bookmark;
use crate::compass::{HeadingState, OrientationTracker};
use crate::hijri::{HijriDate, MONTHS};
use crate::prayer::{Prayer, PrayerSchedule};
use crate::qibla::cardinal;
use crate::quran::{juz_info, JuzText, Surah, SurahText, JUZ};
use crate::reader::Page;
use chrono::{Duration, NaiveDate};
use std::fmt::Write;

/// Compass radius in rows. Columns are doubled to keep the dial round.
const RADIUS: usize = 6;

/// Draw the compass dial with the needle rotated toward the Qibla.
///
/// The rose labels are fixed to the device frame (top = where the device points);
/// the needle shows [`OrientationTracker::rotation`] clockwise from the top.
pub fn render_compass(tracker: &OrientationTracker) -> String {
    let rows = 2 * RADIUS + 1;
    let cols = 4 * RADIUS + 1;
    let (cy, cx) = (RADIUS as f64, (2 * RADIUS) as f64);
    let mut grid = vec![vec![' '; cols]; rows];

    // Dial outline
    for step in 0..72 {
        let theta = (step as f64 * 5.0).to_radians();
        let (r, c) = to_cell(cy, cx, theta, RADIUS as f64);
        grid[r][c] = '·';
    }
    grid[0][2 * RADIUS] = 'N';
    grid[RADIUS][cols - 1] = 'E';
    grid[rows - 1][2 * RADIUS] = 'S';
    grid[RADIUS][0] = 'W';

    // Needle, tipped with the Kaaba marker
    let theta = tracker.rotation().to_radians();
    for step in 1..RADIUS {
        let (r, c) = to_cell(cy, cx, theta, step as f64);
        grid[r][c] = if step == RADIUS - 1 { 'Q' } else { '•' };
    }
    grid[RADIUS][2 * RADIUS] = '+';

    let mut out = String::new();
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    let bearing = tracker.target_bearing();
    let _ = writeln!(
        out,
        "\nQibla Direction: {:.0}° ({})",
        bearing,
        cardinal(bearing)
    );
    match tracker.state() {
        HeadingState::HeadingKnown(heading) => {
            let _ = writeln!(
                out,
                "Heading {:.0}°, turn needle {:.0}°",
                heading,
                tracker.rotation()
            );
        }
        HeadingState::NoHeading => {
            let _ = writeln!(
                out,
                "Compass not available. Point device North, turn {:.0}°",
                bearing
            );
        }
    }
    out
}

fn to_cell(cy: f64, cx: f64, theta: f64, radius: f64) -> (usize, usize) {
    let r = (cy - radius * theta.cos()).round().max(0.0) as usize;
    let c = (cx + 2.0 * radius * theta.sin()).round().max(0.0) as usize;
    (r.min(2 * RADIUS), c.min(4 * RADIUS))
}

/// Today's prayer table with the next prayer highlighted.
pub fn render_prayers(
    schedule: &PrayerSchedule,
    next: Option<Prayer>,
    remaining: Option<Duration>,
) -> String {
    let mut out = String::new();
    if schedule.offline {
        out.push_str("⚠ OFFLINE (approximate times)\n\n");
    }
    out.push_str("Today's Prayer Times\n");
    out.push_str("────────────────────\n");
    for prayer in Prayer::ALL {
        let marker = if Some(prayer) == next { "▶" } else { " " };
        let time = schedule
            .get(prayer)
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string());
        let _ = writeln!(out, "{marker} {:<8} {time}", prayer.name());
    }
    if let Some(prayer) = next {
        let _ = write!(out, "\nNext prayer: {prayer}");
        if let Some(left) = remaining {
            let _ = write!(
                out,
                " in {}h {:02}m",
                left.num_hours(),
                left.num_minutes() % 60
            );
        }
        out.push('\n');
    }
    out
}

pub fn render_hijri(hijri: &HijriDate, gregorian: NaiveDate) -> String {
    let mut out = format!(
        "Hijri Date: {}\nGregorian:  {}\n",
        hijri,
        gregorian.format("%A, %-d %B %Y")
    );
    let month = hijri.month_info();
    if month.sacred {
        out.push_str("Sacred Month\n");
    }
    if !month.description.is_empty() {
        let _ = writeln!(out, "{}", month.description);
    }
    for virtue in month.virtues {
        let _ = writeln!(out, "  - {virtue}");
    }
    out
}

/// The twelve Islamic months with their sacred marker.
pub fn render_months() -> String {
    let mut out = String::new();
    for (i, month) in MONTHS.iter().enumerate() {
        let tag = if month.sacred { " [Sacred Month]" } else { "" };
        let _ = writeln!(out, "{:>2}. {}{}", i + 1, month.name, tag);
        if !month.description.is_empty() {
            let _ = writeln!(out, "    {}", month.description);
        }
    }
    out
}

pub fn render_surah_index<'a>(surahs: impl IntoIterator<Item = &'a Surah>) -> String {
    let mut out = String::new();
    for s in surahs {
        let _ = writeln!(
            out,
            "{:>3}. {:<18} {:<26} {:>3} verses  {}",
            s.number, s.english_name, s.english_name_translation, s.number_of_ayahs, s.revelation_type
        );
    }
    if out.is_empty() {
        out.push_str("No surahs match\n");
    }
    out
}

/// The thirty juz with their names and verse ranges.
pub fn render_juz_index() -> String {
    let mut out = String::new();
    for juz in &JUZ {
        let _ = writeln!(
            out,
            "{:>2}. {:<20} {}:{} - {}:{}",
            juz.number, juz.name, juz.start.surah, juz.start.ayah, juz.end.surah, juz.end.ayah
        );
    }
    out
}

/// One page of a surah, Arabic first with the translation beneath each verse.
pub fn render_surah_page(arabic: &SurahText, translation: Option<&SurahText>, page: Page) -> String {
    let s = &arabic.surah;
    let mut out = format!(
        "{}\n{}\n{} • {} verses\n\n",
        s.english_name, s.name, s.english_name_translation, s.number_of_ayahs
    );

    let range = page.range();
    let verses = arabic.ayahs.get(range.clone()).unwrap_or_default();
    let translated = translation
        .and_then(|t| t.ayahs.get(range))
        .unwrap_or_default();

    for (i, ayah) in verses.iter().enumerate() {
        let _ = writeln!(out, "Verse {}", ayah.number_in_surah);
        let _ = writeln!(out, "  {}", ayah.text);
        if let Some(t) = translated.get(i) {
            let _ = writeln!(out, "  {}", t.text);
        }
        out.push('\n');
    }
    let _ = writeln!(out, "Page {} of {}", page.current, page.total);
    out
}

/// A juz listing, with a heading whenever a new surah starts.
pub fn render_juz(juz: &JuzText) -> String {
    let mut out = match juz_info(juz.number) {
        Some(info) => format!("Juz {} - {}\n", juz.number, info.name),
        None => format!("Juz {}\n", juz.number),
    };
    let mut last_surah = None;
    for entry in &juz.ayahs {
        if last_surah != Some(entry.surah.number) {
            let _ = writeln!(out, "\n== {} ({}) ==", entry.surah.english_name, entry.surah.name);
            last_surah = Some(entry.surah.number);
        }
        let _ = writeln!(out, "{:>3}. {}", entry.ayah.number_in_surah, entry.ayah.text);
    }
    out
}

pub fn render_bookmarks(bookmarks: &[Bookmark]) -> String {
    if bookmarks.is_empty() {
        return "No bookmarks yet\nStart reading the Quran and bookmark verses to save them for later.\n"
            .to_string();
    }
    let mut out = String::from("Your Bookmarks\n");
    for b in bookmarks {
        let _ = writeln!(
            out,
            "  Surah {} ({}), Verse {}  saved {}",
            b.surah_name,
            b.surah_number,
            b.ayah_number,
            b.timestamp.format("%Y-%m-%d")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn compass_without_heading_shows_instructions() {
        let tracker = OrientationTracker::new(118.9);
        let text = render_compass(&tracker);
        assert!(text.contains("Qibla Direction: 119° (ESE)"));
        assert!(text.contains("Point device North, turn 119°"));
        assert_eq!(text.matches('Q').count(), 2); // needle tip + label
    }

    #[test]
    fn compass_needle_points_up_when_facing_qibla() {
        let mut tracker = OrientationTracker::new(118.0);
        tracker.apply(118.0);
        let text = render_compass(&tracker);
        let lines: Vec<&str> = text.lines().collect();
        // Tip sits one row inside the dial, straight above the centre
        assert_eq!(lines[1].chars().nth(2 * RADIUS), Some('Q'));
        assert!(text.contains("turn needle 0°"));
    }

    #[test]
    fn prayer_table_marks_next_and_offline() {
        let mut schedule = PrayerSchedule::new()
            .with(Prayer::Fajr, t(5, 0))
            .with(Prayer::Dhuhr, t(12, 0))
            .with(Prayer::Asr, t(15, 30))
            .with(Prayer::Maghrib, t(18, 0));
        schedule.offline = true;

        let text = render_prayers(&schedule, Some(Prayer::Asr), Some(Duration::minutes(95)));
        assert!(text.starts_with("⚠ OFFLINE"));
        assert!(text.contains("▶ Asr      15:30"));
        assert!(text.contains("  Isha     --:--"));
        assert!(text.contains("Next prayer: Asr in 1h 35m"));
    }

    #[test]
    fn empty_bookmarks_have_a_hint() {
        assert!(render_bookmarks(&[]).starts_with("No bookmarks yet"));
    }

    #[test]
    fn hijri_view_lists_month_virtues() {
        let hijri = HijriDate::new(1445, 9, 1).unwrap();
        let text = render_hijri(&hijri, hijri.to_gregorian().unwrap());
        assert!(text.contains("1 Ramadan 1445 AH"));
        assert!(text.contains("Laylat al-Qadr"));
        assert!(!text.contains("Sacred Month"));
    }

    #[test]
    fn juz_index_lists_names_and_ranges() {
        let text = render_juz_index();
        assert_eq!(text.lines().count(), 30);
        assert!(text.starts_with(" 1. Alif Lam Meem"));
        assert!(text.contains("2:142 - 2:252"));
        assert!(text.contains("Amma Yatasa'aloon"));
    }

    #[test]
    fn empty_surah_search_says_so() {
        assert_eq!(render_surah_index(&Vec::<Surah>::new()), "No surahs match\n");
    }

    #[test]
    fn months_list_has_four_sacred() {
        assert_eq!(render_months().matches("[Sacred Month]").count(), 4);
    }
}
