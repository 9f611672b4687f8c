//! Date and time normalization shared by all format grammars.
//!
//! Source documents give partial dates (day only, or day and month) and bare
//! clock times. Everything here turns those into UTC epoch seconds:
//!
//! 1. partial dates are anchored to a declared period start, or to the
//!    reference date of the [`ExtractionContext`](shared_types::ExtractionContext)
//! 2. a day smaller than a late-month anchor day belongs to the next month
//! 3. clock times are naive UTC, no timezone conversion happens
//! 4. an arrival not after the departure is next day, unless the source
//!    carries an explicit `+1` marker, which always wins
//! 5. no block time leaves here with `time_in <= time_out`

mod months;

pub use months::month_number;

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use shared_types::{CoveringPeriod, FlightRecord};
use std::sync::LazyLock;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Anchor day from which an earlier day is read as next month
const LATE_MONTH_ANCHOR_DAY: u32 = 15;

static DAY_MONTH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})([A-Za-z]{3,9})(\d{2}|\d{4})?$").unwrap());

static CLOCK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):?(\d{2})[Zz]?$").unwrap());

/// Parse `17Feb` / `17FEB` into (day, month), ignoring any trailing year
pub fn parse_day_month(token: &str) -> Option<(u32, u32)> {
    let caps = DAY_MONTH_REGEX.captures(token.trim())?;
    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let month = month_number(caps.get(2)?.as_str())?;
    if day == 0 || day > 31 {
        return None;
    }
    Some((day, month))
}

/// Parse `02Mar22` / `17MAR2022` into a full date; the year is required
pub fn parse_day_month_year(token: &str) -> Option<NaiveDate> {
    let caps = DAY_MONTH_REGEX.captures(token.trim())?;
    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let month = month_number(caps.get(2)?.as_str())?;
    let year = expand_year(caps.get(3)?.as_str())?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Try each chrono format in turn
pub fn parse_date(token: &str, formats: &[&str]) -> Option<NaiveDate> {
    let token = token.trim();
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(token, format).ok())
}

/// Parse `0755`, `07:55`, `7:55` or `0755Z` as a UTC clock time
pub fn parse_clock(token: &str) -> Option<NaiveTime> {
    let caps = CLOCK_REGEX.captures(token.trim())?;
    let hours: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u32 = caps.get(2)?.as_str().parse().ok()?;
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Parse an `H:MM` duration into minutes
pub fn parse_duration_minutes(token: &str) -> Option<i64> {
    let (hours, minutes) = token.trim().split_once(':')?;
    let hours: i64 = hours.parse().ok()?;
    let minutes: i64 = minutes.parse().ok()?;
    if minutes >= 60 || hours < 0 || minutes < 0 {
        return None;
    }
    Some(hours * 60 + minutes)
}

fn expand_year(token: &str) -> Option<i32> {
    let year: i32 = token.parse().ok()?;
    match token.len() {
        2 => Some(2000 + year),
        4 => Some(year),
        _ => None,
    }
}

pub fn epoch_seconds(date: NaiveDate, time: NaiveTime) -> i64 {
    NaiveDateTime::new(date, time).and_utc().timestamp()
}

pub fn start_of_day(date: NaiveDate) -> i64 {
    epoch_seconds(date, NaiveTime::default())
}

/// Last second of the day
pub fn end_of_day(date: NaiveDate) -> i64 {
    start_of_day(date) + SECONDS_PER_DAY - 1
}

/// Period from the start of `first` to the last second of `last`
pub fn period_between(first: NaiveDate, last: NaiveDate) -> Option<CoveringPeriod> {
    if last < first {
        return None;
    }
    Some(CoveringPeriod::new(start_of_day(first), end_of_day(last)))
}

/// The whole calendar month
pub fn month_period(year: i32, month: u32) -> Option<CoveringPeriod> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    period_between(first, last)
}

/// Keep only records departing within a declared period
///
/// The returned period is the declared one, with its end pushed out to the
/// latest arrival so overnight flights from the last day stay covered.
pub fn restrict_to_period(
    flights: Vec<FlightRecord>,
    period: CoveringPeriod,
) -> (Vec<FlightRecord>, CoveringPeriod) {
    let before = flights.len();
    let kept: Vec<FlightRecord> = flights
        .into_iter()
        .filter(|flight| period.contains(flight.time_out))
        .collect();
    if kept.len() < before {
        tracing::debug!(
            "Dropped {} flights departing outside the declared period",
            before - kept.len()
        );
    }

    let end = kept
        .iter()
        .map(|flight| flight.time_in)
        .fold(period.end, i64::max);
    (kept, CoveringPeriod::new(period.start, end))
}

/// Reference point that partial dates are resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateAnchor {
    date: NaiveDate,
    period_start: bool,
}

impl DateAnchor {
    /// Anchor on a reference date such as today
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            period_start: false,
        }
    }

    /// Anchor on the first day of a declared period; no record precedes it
    pub fn period_start(date: NaiveDate) -> Self {
        Self {
            date,
            period_start: true,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Resolve a bare day-of-month
    ///
    /// The anchor's month is used, except when the day lies before the anchor
    /// day and the period has crossed into the next month. A period start
    /// anchor always rolls such a day forward; a reference date anchor only
    /// from the second half of its month.
    pub fn resolve_day(&self, day: u32) -> Option<NaiveDate> {
        let rolls_over = day < self.date.day()
            && (self.period_start || self.date.day() >= LATE_MONTH_ANCHOR_DAY);
        let month_start = self.date.with_day(1)?;
        let month_start = if rolls_over {
            month_start.checked_add_months(Months::new(1))?
        } else {
            month_start
        };
        month_start.with_day(day)
    }

    /// Resolve a day and month without year to the candidate closest to the anchor
    pub fn resolve_day_month(&self, day: u32, month: u32) -> Option<NaiveDate> {
        let year = self.date.year();
        [year, year - 1, year + 1]
            .into_iter()
            .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
            .min_by_key(|candidate| (*candidate - self.date).num_days().abs())
    }
}

/// Departure and arrival as UTC epoch seconds, `time_in` strictly after `time_out`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockTimes {
    pub time_out: i64,
    pub time_in: i64,
}

impl BlockTimes {
    /// Combine a date with departure and arrival clock times
    ///
    /// `days_later` is an explicit day marker next to the arrival time (`+1`);
    /// when present it replaces the rollover heuristic.
    pub fn resolve(
        date: NaiveDate,
        departure: NaiveTime,
        arrival: NaiveTime,
        days_later: Option<u32>,
    ) -> Option<Self> {
        let time_out = epoch_seconds(date, departure);
        let time_in = match days_later {
            Some(days) => epoch_seconds(date.checked_add_days(Days::new(days.into()))?, arrival),
            None => {
                let same_day = epoch_seconds(date, arrival);
                if same_day <= time_out {
                    same_day + SECONDS_PER_DAY
                } else {
                    same_day
                }
            }
        };

        if time_in <= time_out {
            return None;
        }
        Some(Self { time_out, time_in })
    }

    pub fn minutes(&self) -> i64 {
        (self.time_in - self.time_out) / 60
    }

    pub fn apply_to(&self, flight: &mut FlightRecord) {
        flight.time_out = self.time_out;
        flight.time_in = self.time_in;
    }
}

/// Parse a `+1` style day marker
pub fn parse_day_marker(token: &str) -> Option<u32> {
    token.trim().strip_prefix('+')?.trim().parse().ok()
}
