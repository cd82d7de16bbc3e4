//! Date window extraction for BCOEM competition information pages.
//!
//! BCOEM prints windows as free text such as
//! `"Registration opens Saturday, March 1, 2025 9:00 AM, MST. and closes
//! Monday, March 31, 2025 11:59 PM, MDT."`. The first recognised date is the
//! window start, the second (if any) its end.

use chrono::{DateTime, Local, Month, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::error::ParseError;

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(today)|(?:(Sunday|Monday|Tuesday|Wednesday|Thursday|Friday|Saturday), ([A-Za-z]+) (\d{1,2}), (\d{4}) (\d{1,2}):(\d{2}) ([AP]M), ([A-Za-z]+)\.)",
    )
    .expect("static regex")
});

/// Abbreviations BCOEM installs print, mapped to IANA zones.
static TIMEZONES: [(&str, Tz); 8] = [
    ("AEST", chrono_tz::Australia::Sydney),
    ("BST", chrono_tz::Europe::London),
    ("CDT", chrono_tz::America::Chicago),
    ("CET", chrono_tz::Europe::Paris),
    ("EDT", chrono_tz::America::New_York),
    ("JST", chrono_tz::Asia::Tokyo),
    ("MDT", chrono_tz::America::Denver),
    ("PDT", chrono_tz::America::Los_Angeles),
];

pub fn timezone_for(abbreviation: &str) -> Option<Tz> {
    TIMEZONES
        .iter()
        .find(|(abbr, _)| *abbr == abbreviation)
        .map(|(_, tz)| *tz)
}

/// The first two dates found in a text, by position.
///
/// A slot is `None` when its match could not be resolved to an instant; a
/// failed first match never lets the second one take its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Extract a window, resolving `"today"` to the current instant.
pub fn extract_date_window(text: &str) -> Result<DateWindow, ParseError> {
    extract_date_window_at(text, Utc::now())
}

/// Extract a window, resolving `"today"` to `now`.
///
/// Matches beyond the second are ignored. Fails with
/// [`ParseError::NoDateFound`] when nothing in `text` looks like a date.
pub fn extract_date_window_at(text: &str, now: DateTime<Utc>) -> Result<DateWindow, ParseError> {
    let slots: Vec<Option<DateTime<Utc>>> = DATE_PATTERN
        .captures_iter(text)
        .take(2)
        .map(|caps| {
            if caps.get(1).is_some() {
                Some(now)
            } else {
                parse_match(&caps)
            }
        })
        .collect();

    let Some(&start) = slots.first() else {
        return Err(ParseError::NoDateFound(text.to_string()));
    };
    let end = slots.get(1).copied().flatten();
    debug!(?start, ?end, "Extracted date window");
    Ok(DateWindow { start, end })
}

fn parse_match(caps: &Captures<'_>) -> Option<DateTime<Utc>> {
    let month: Month = caps[3].parse().ok()?;
    let day: u32 = caps[4].parse().ok()?;
    let year: i32 = caps[5].parse().ok()?;
    let hour12: u32 = caps[6].parse().ok()?;
    let minute: u32 = caps[7].parse().ok()?;
    if !(1..=12).contains(&hour12) {
        return None;
    }
    let hour = match &caps[8] {
        "AM" => hour12 % 12,
        _ => hour12 % 12 + 12,
    };

    let naive: NaiveDateTime =
        NaiveDate::from_ymd_opt(year, month.number_from_month(), day)?.and_hms_opt(hour, minute, 0)?;

    let abbreviation = &caps[9];
    let resolved = match timezone_for(abbreviation) {
        Some(tz) => tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
        None => {
            debug!(abbreviation, "Unmapped timezone; using local zone");
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
        }
    };
    if resolved.is_none() {
        warn!(%naive, abbreviation, "Local time does not exist in zone; skipping date");
    }
    resolved
}
