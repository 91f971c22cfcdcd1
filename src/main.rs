//! # Salat Tracker Application Entry Point
//!
//! This binary crate wires configuration, data fetching and rendering together.
//! Each subcommand corresponds to one view of the application; with no
//! subcommand the dashboard (Hijri date, Qibla compass and prayer times) is shown.


mod cli;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use cli::{BookmarkAction, Command, Invocation};
use salat_lib::bookmarks::{Bookmark, BookmarkRepository, JsonBookmarkStore};
use salat_lib::compass::{HeadingFeed, OrientationTracker, Permission};
use salat_lib::config::Config;
use salat_lib::hijri::HijriDate;
use salat_lib::prayer::{self, PrayerSchedule};
use salat_lib::quran::QuranClient;
use salat_lib::reader::{AudioQueue, Page};
use salat_lib::{fallback, prayer_data, qibla, quran, renderer};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let invocation = cli::parse(std::env::args().skip(1))?;
    let mut config = match &invocation.config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    if let Some((latitude, longitude)) = invocation.location {
        config.location.name = format!("{latitude:.4}, {longitude:.4}");
        config.location.latitude = latitude;
        config.location.longitude = longitude;
    }
    if !config.coordinate().is_valid() {
        warn!(location = ?config.location, "location is outside the valid latitude/longitude range");
    }

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(invocation, config))
}

async fn run(invocation: Invocation, config: Config) -> anyhow::Result<()> {
    match invocation.command {
        Command::Dashboard => {
            let today = Local::now().date_naive();
            print!("{}", hijri_view(today)?);
            println!();
            print!("{}", qibla_view(&config));
            println!();
            print!("{}", prayer_view(&config).await);
        }
        Command::Qibla => print!("{}", qibla_view(&config)),
        Command::Prayers => print!("{}", prayer_view(&config).await),
        Command::Hijri(date) => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            print!("{}", hijri_view(date)?);
        }
        Command::ToGregorian { year, month, day } => {
            let hijri = HijriDate::new(year, month, day)?;
            let date = hijri
                .to_gregorian()
                .context("date is outside the supported range")?;
            println!("{hijri} = {}", date.format("%A, %-d %B %Y"));
        }
        Command::Months => print!("{}", renderer::render_months()),
        Command::Surahs(query) => {
            let surahs = QuranClient::default().surahs().await?;
            let matches = quran::search_surahs(&surahs, query.as_deref().unwrap_or(""));
            print!("{}", renderer::render_surah_index(matches));
        }
        Command::Surah { number, page } => {
            let client = QuranClient::default();
            let arabic = client.surah(number, &config.quran.edition).await?;
            let translation = match client.translation(number, &config.quran.translation).await {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!("translation unavailable: {}", e);
                    None
                }
            };
            let page = Page::new(arabic.ayahs.len(), config.quran.verses_per_page, page);
            print!(
                "{}",
                renderer::render_surah_page(&arabic, translation.as_ref(), page)
            );
        }
        Command::JuzIndex => print!("{}", renderer::render_juz_index()),
        Command::Juz(number) => {
            let juz = QuranClient::default()
                .juz(number, &config.quran.edition)
                .await?;
            print!("{}", renderer::render_juz(&juz));
        }
        Command::Play(number) => {
            let surah = QuranClient::default()
                .surah(number, &config.quran.edition)
                .await?;
            let queue = AudioQueue::for_surah(
                &config.quran.reciter,
                number,
                surah.ayahs.iter().map(|a| a.number_in_surah),
            );
            println!("Playlist for Surah {}", surah.surah.english_name);
            for track in queue {
                println!("{:>3}  {}", track.ayah, track.url);
            }
        }
        Command::Bookmarks(action) => bookmarks(&config, action).await?,
        Command::Compass { permission } => compass(&config, permission).await?,
        Command::Help => print!("{}", cli::USAGE),
    }
    Ok(())
}

fn qibla_view(config: &Config) -> String {
    let bearing = qibla::qibla_bearing(config.coordinate());
    format!(
        "Location: {}\n{}",
        config.location.name,
        renderer::render_compass(&OrientationTracker::new(bearing))
    )
}

fn hijri_view(date: NaiveDate) -> anyhow::Result<String> {
    let hijri = HijriDate::from_gregorian(date)?;
    Ok(renderer::render_hijri(&hijri, date))
}

/// Fetch today's timetable with automatic fallback on failure, then render it.
async fn prayer_view(config: &Config) -> String {
    let now = Local::now();
    let schedule: PrayerSchedule = prayer_data::fetch(config, now)
        .await
        .unwrap_or_else(|error| {
            warn!("prayer time fetch failed: {}", error);
            warn!("falling back to offline astronomical model");
            let offset_hours = now.offset().local_minus_utc() as f64 / 3600.0;
            fallback::approximate(config.coordinate(), now.date_naive(), offset_hours)
        });

    match prayer::time_until(&schedule, now.time()) {
        Ok((next, remaining)) => renderer::render_prayers(&schedule, Some(next), Some(remaining)),
        Err(e) => {
            warn!("cannot determine next prayer: {}", e);
            renderer::render_prayers(&schedule, None, None)
        }
    }
}

async fn bookmarks(config: &Config, action: BookmarkAction) -> anyhow::Result<()> {
    let mut store = JsonBookmarkStore::new(&config.bookmarks.path);
    match action {
        BookmarkAction::List => {}
        BookmarkAction::Add { surah, ayah } => {
            let name = match QuranClient::default().surahs().await {
                Ok(index) => index
                    .into_iter()
                    .find(|s| s.number == surah)
                    .map(|s| s.english_name)
                    .with_context(|| format!("surah {surah} does not exist"))?,
                Err(e) => {
                    warn!("surah index unavailable: {}", e);
                    format!("#{surah}")
                }
            };
            if store.add(Bookmark::new(surah, ayah, name.as_str()))? {
                println!("Added bookmark for Surah {name}, Verse {ayah}");
            } else {
                println!("Surah {name}, Verse {ayah} is already bookmarked");
            }
        }
        BookmarkAction::Remove { surah, ayah } => {
            if store.remove(surah, ayah)? {
                println!("Bookmark removed");
            } else {
                println!("No bookmark for {surah}:{ayah}");
            }
        }
    }
    print!("{}", renderer::render_bookmarks(&store.list()?));
    Ok(())
}

/// Follow headings typed on stdin (one per line: `<degrees>` or `alpha <degrees>`)
/// and redraw the compass after each one.
async fn compass(config: &Config, permission: Permission) -> anyhow::Result<()> {
    let bearing = qibla::qibla_bearing(config.coordinate());
    let mut tracker = OrientationTracker::new(bearing);
    let mut feed = HeadingFeed::start(permission);
    let mut subscription = feed.subscribe();

    print!("{}", renderer::render_compass(&tracker));
    if !feed.is_running() {
        return Ok(());
    }

    let sensor = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match cli::parse_reading(&line) {
                Some(reading) => {
                    feed.publish(reading);
                }
                None => warn!(%line, "not a heading"),
            }
        }
        feed.stop();
    });

    tracker
        .follow(&mut subscription, |t| {
            println!();
            print!("{}", renderer::render_compass(t));
        })
        .await;
    sensor.await?;
    Ok(())
}
