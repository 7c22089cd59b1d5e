use std::sync::LazyLock;
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};

// Static variables that are initialised at runtime the first time they are accessed.

/// Explicit date annotation, for example `[2020-05-01]`.
pub static RE_BRACKET_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2})\]")
        .expect("Failed to create regex pattern for bracketed date")
});

/// Bare year between 1970 and 2019.
pub static RE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(19[789]\d|20[01]\d)").expect("Failed to create regex pattern for yyyy year"));

/// Effective timestamp of an entry together with the category string it was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTimestamp {
    pub timestamp: NaiveDateTime,
    /// Category with any bracketed date removed.
    pub category: String,
    /// The bracketed date that was found, or an empty string.
    pub annotation: String,
}

/// Resolve the effective timestamp for an entry.
///
/// First match wins:
/// 1. first valid bracketed `[YYYY-MM-DD]` date in the category. All bracketed dates are removed from the category
/// 2. bare year in the category
/// 3. bare year in the filename
/// 4. the fallback, usually the filesystem modification time
#[must_use]
pub fn resolve_timestamp(category: &str, filename: &str, fallback: NaiveDateTime) -> ResolvedTimestamp {
    let bracket_date = RE_BRACKET_DATE.captures_iter(category).find_map(|caps| {
        let date = parse_bracket_date(&caps)?;
        Some((date, caps.get(0)?.as_str().to_string()))
    });
    if let Some((date, annotation)) = bracket_date {
        let cleaned = RE_BRACKET_DATE.replace_all(category, "").trim().to_string();
        return ResolvedTimestamp {
            timestamp: start_of_day(date),
            category: cleaned,
            annotation,
        };
    }

    let timestamp = year_from_string(category)
        .or_else(|| year_from_string(filename))
        .unwrap_or(fallback);

    ResolvedTimestamp {
        timestamp,
        category: category.to_string(),
        annotation: String::new(),
    }
}

/// Find a bare year in the given string and return January 1st of that year.
#[must_use]
pub fn year_from_string(s: &str) -> Option<NaiveDateTime> {
    let year = RE_YEAR.captures(s)?.get(1)?.as_str().parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, 1, 1).map(start_of_day)
}

/// Convert a filesystem modification time to local naive time.
#[must_use]
pub fn system_time_to_naive(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

fn parse_bracket_date(caps: &Captures) -> Option<NaiveDate> {
    let year = caps.name("year")?.as_str().parse::<i32>().ok()?;
    let month = caps.name("month")?.as_str().parse::<u32>().ok()?;
    let day = caps.name("day")?.as_str().parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}
