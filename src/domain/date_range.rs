use std::ops::RangeInclusive;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::InvalidArgument;

/// Years an expense can be attributed to. Timestamps inside this range keep a
/// four digit year, so their text form sorts chronologically.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 0..=9999;

pub fn is_supported_year(year: i32) -> bool {
    SUPPORTED_YEARS.contains(&year)
}

/// A closed interval of timestamps: both `start` and `end` match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// From midnight on January 1st of `now`'s year up to and including `now`.
    ///
    /// Unlike [`resolve_date_range`] the upper bound is the instant itself, not
    /// the last representable instant of a calendar period.
    pub fn year_to_date(now: NaiveDateTime) -> Self {
        let january_first = NaiveDate::from_ymd_opt(now.year(), 1, 1)
            .expect("January 1st exists in every representable year");
        Self::new(january_first.and_time(NaiveTime::MIN), now)
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Derive the closed interval selected by an optional year and month.
///
/// - no year: no date filtering at all (`None`)
/// - year only: the whole calendar year
/// - year and month: that calendar month
///
/// The end is one nanosecond before the next period starts, so it can be
/// matched inclusively. A month outside 1..=12 is rejected even when no year
/// is given, and so is a year outside [`SUPPORTED_YEARS`].
pub fn resolve_date_range(
    year: Option<i32>,
    month: Option<i32>,
) -> Result<Option<DateRange>, InvalidArgument> {
    let month = month.map(validate_month).transpose()?;
    let Some(year) = year else {
        return Ok(None);
    };
    if !is_supported_year(year) {
        return Err(out_of_range(year));
    }

    let (start, next) = match month {
        Some(12) => (first_instant(year, 12)?, first_instant(year + 1, 1)?),
        Some(month) => (first_instant(year, month)?, first_instant(year, month + 1)?),
        None => (first_instant(year, 1)?, first_instant(year + 1, 1)?),
    };

    Ok(Some(DateRange::new(start, next - Duration::nanoseconds(1))))
}

fn validate_month(month: i32) -> Result<u32, InvalidArgument> {
    u32::try_from(month)
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| InvalidArgument::new(format!("month must be between 1 and 12, got {month}")))
}

fn out_of_range(year: i32) -> InvalidArgument {
    InvalidArgument::new(format!(
        "year {year} is out of range, expected {} to {}",
        SUPPORTED_YEARS.start(),
        SUPPORTED_YEARS.end()
    ))
}

fn first_instant(year: i32, month: u32) -> Result<NaiveDateTime, InvalidArgument> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|date| date.and_time(NaiveTime::MIN))
        .ok_or_else(|| out_of_range(year))
}
