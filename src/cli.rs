//! # Command-Line Arguments
//!
//! Hand-rolled parsing of the subcommand and its arguments, plus the stdin
//! sensor-line format used by `compass`.
//!
//! Global options (`--config`, `--lat`/`--lon`) may appear anywhere; the first
//! bare word selects the subcommand and the remaining bare words are its
//! positional arguments.

use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use salat_lib::compass::{OrientationReading, Permission};
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: salat-tracker [OPTIONS] [COMMAND]

Commands:
  dashboard                 Hijri date, Qibla direction and prayer times (default)
  qibla                     Qibla bearing and compass
  prayers                   Today's prayer times and the next prayer
  hijri [YYYY-MM-DD]        Convert a Gregorian date (default today) to Hijri
  to-gregorian D M Y        Convert a Hijri date to Gregorian
  months                    The twelve Islamic months
  surahs [QUERY]            List surahs, optionally filtered by name or number
  surah N [PAGE]            Read surah N with translation
  juz [N]                   List the 30 juz (paras), or read juz N
  play N                    Verse-by-verse audio playlist for surah N
  bookmarks [list]          Show saved bookmarks
  bookmarks add S A         Bookmark verse A of surah S
  bookmarks remove S A      Remove a bookmark
  compass [--deny]          Follow headings from stdin and redraw the compass
  help                      Show this message

Options:
  --config PATH             Config file (default salat-config.toml)
  --lat DEG --lon DEG       Override the configured location
";

#[derive(Debug, PartialEq)]
pub enum Command {
    Dashboard,
    Qibla,
    Prayers,
    Hijri(Option<NaiveDate>),
    ToGregorian { year: i32, month: u32, day: u32 },
    Months,
    Surahs(Option<String>),
    Surah { number: u32, page: usize },
    JuzIndex,
    Juz(u32),
    Play(u32),
    Bookmarks(BookmarkAction),
    Compass { permission: Permission },
    Help,
}

#[derive(Debug, PartialEq)]
pub enum BookmarkAction {
    List,
    Add { surah: u32, ayah: u32 },
    Remove { surah: u32, ayah: u32 },
}

#[derive(Debug, PartialEq)]
pub struct Invocation {
    pub command: Command,
    pub config_path: Option<PathBuf>,
    pub location: Option<(f64, f64)>,
}

pub fn parse<I, S>(args: I) -> anyhow::Result<Invocation>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut config_path = None;
    let mut lat = None;
    let mut lon = None;
    let mut deny = false;
    let mut words: Vec<String> = Vec::new();

    let mut args = args.into_iter().map(|a| a.as_ref().to_string());
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = Some(PathBuf::from(args.next().context("--config needs a path")?))
            }
            "--lat" => lat = Some(number::<f64>(args.next(), "--lat")?),
            "--lon" => lon = Some(number::<f64>(args.next(), "--lon")?),
            "--deny" => deny = true,
            "-h" | "--help" => words = vec!["help".to_string()],
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n\n{USAGE}"),
            _ => words.push(arg),
        }
    }

    let location = match (lat, lon) {
        (Some(lat), Some(lon)) => Some((lat, lon)),
        (None, None) => None,
        _ => bail!("--lat and --lon must be given together"),
    };

    let mut words = words.into_iter();
    let name = words.next();
    let mut positional = |what: &str| words.next().ok_or_else(|| anyhow!("missing {what}"));

    let command = match name.as_deref() {
        None | Some("dashboard") => Command::Dashboard,
        Some("qibla") => Command::Qibla,
        Some("prayers") => Command::Prayers,
        Some("hijri") => match positional("date") {
            Ok(raw) => Command::Hijri(Some(
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .with_context(|| format!("expected YYYY-MM-DD, got {raw}"))?,
            )),
            Err(_) => Command::Hijri(None),
        },
        Some("to-gregorian") => {
            let day = number(positional("day").ok(), "day")?;
            let month = number(positional("month").ok(), "month")?;
            let year = number(positional("year").ok(), "year")?;
            Command::ToGregorian { year, month, day }
        }
        Some("months") => Command::Months,
        Some("surahs") => {
            let query: Vec<String> = std::iter::from_fn(|| positional("query").ok()).collect();
            Command::Surahs((!query.is_empty()).then(|| query.join(" ")))
        }
        Some("surah") => {
            let number_ = number(positional("surah number").ok(), "surah number")?;
            let page = match positional("page") {
                Ok(raw) => number(Some(raw), "page")?,
                Err(_) => 1,
            };
            Command::Surah {
                number: number_,
                page,
            }
        }
        Some("juz") | Some("para") => match positional("juz") {
            Ok(raw) => Command::Juz(number(Some(raw), "juz")?),
            Err(_) => Command::JuzIndex,
        },
        Some("paras") => Command::JuzIndex,
        Some("play") => Command::Play(number(positional("surah").ok(), "surah")?),
        Some("bookmarks") => {
            let action = positional("action").ok();
            match action.as_deref() {
                None | Some("list") => Command::Bookmarks(BookmarkAction::List),
                Some(verb @ ("add" | "remove")) => {
                    let surah = number(positional("surah").ok(), "surah")?;
                    let ayah = number(positional("ayah").ok(), "ayah")?;
                    Command::Bookmarks(if verb == "add" {
                        BookmarkAction::Add { surah, ayah }
                    } else {
                        BookmarkAction::Remove { surah, ayah }
                    })
                }
                Some(other) => bail!("unknown bookmarks action {other}"),
            }
        }
        Some("compass") => Command::Compass {
            permission: if deny {
                Permission::Denied
            } else {
                Permission::NotRequired
            },
        },
        Some("help") => Command::Help,
        Some(other) => bail!("unknown command {other}\n\n{USAGE}"),
    };

    Ok(Invocation {
        command,
        config_path,
        location,
    })
}

fn number<T: std::str::FromStr>(raw: Option<String>, what: &str) -> anyhow::Result<T> {
    let raw = raw.ok_or_else(|| anyhow!("missing {what}"))?;
    raw.parse()
        .map_err(|_| anyhow!("{what} must be a number, got {raw}"))
}

/// One stdin line as a sensor event: `123.4` (compass heading) or `alpha 236.6`.
pub fn parse_reading(line: &str) -> Option<OrientationReading> {
    let mut parts = line.split_whitespace();
    match (parts.next()?, parts.next()) {
        ("alpha", Some(value)) => value
            .parse()
            .ok()
            .map(|alpha| OrientationReading::from_alpha(alpha, true)),
        (value, None) => value.parse().ok().map(OrientationReading::from_compass),
        _ => None,
    }
}
