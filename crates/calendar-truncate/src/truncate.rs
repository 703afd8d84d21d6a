//! Cascading calendar truncation.
//!
//! Each `start_of_*` function is defined on top of the next finer one:
//! `start_of_minute` truncates to the second first, `start_of_hour` to the
//! minute first, and so on up to `start_of_year`. Truncating to a coarse unit
//! therefore always agrees with truncating an already-truncated finer instant.
//!
//! ```text
//! second → minute → hour → day → month → year
//!                             └──→ week
//! ```
//!
//! All functions take the [`CalendarContext`] explicitly and are pure.
//!
//! # Example
//!
//! ```
//! use calendar_truncate::{start_of_week, ZonedCalendar};
//! use chrono::{DateTime, Utc, Weekday};
//!
//! let cal = ZonedCalendar::utc(Weekday::Sun);
//! let t: DateTime<Utc> = "2023-06-14T15:42:07.250Z".parse().unwrap();
//! let week = start_of_week(&cal, t).unwrap();
//! assert_eq!(week.to_rfc3339(), "2023-06-11T00:00:00+00:00");
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::{CalendarContext, CalendarFields, Disambiguation};
use crate::error::{Result, TruncateError};

/// Granularity to truncate an instant to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarUnit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
    Week,
}

impl CalendarUnit {
    pub const ALL: [CalendarUnit; 7] = [
        CalendarUnit::Second,
        CalendarUnit::Minute,
        CalendarUnit::Hour,
        CalendarUnit::Day,
        CalendarUnit::Month,
        CalendarUnit::Year,
        CalendarUnit::Week,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CalendarUnit::Second => "second",
            CalendarUnit::Minute => "minute",
            CalendarUnit::Hour => "hour",
            CalendarUnit::Day => "day",
            CalendarUnit::Month => "month",
            CalendarUnit::Year => "year",
            CalendarUnit::Week => "week",
        }
    }

    /// Truncate `instant` to the start of this unit.
    pub fn truncate<C>(self, ctx: &C, instant: DateTime<Utc>) -> Result<DateTime<Utc>>
    where
        C: CalendarContext + ?Sized,
    {
        match self {
            CalendarUnit::Second => start_of_second(ctx, instant),
            CalendarUnit::Minute => start_of_minute(ctx, instant),
            CalendarUnit::Hour => start_of_hour(ctx, instant),
            CalendarUnit::Day => start_of_day(ctx, instant),
            CalendarUnit::Month => start_of_month(ctx, instant),
            CalendarUnit::Year => start_of_year(ctx, instant),
            CalendarUnit::Week => start_of_week(ctx, instant),
        }
    }
}

impl fmt::Display for CalendarUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalendarUnit {
    type Err = TruncateError;

    /// Accepts singular or plural unit names, case-insensitive (`"Week"`, `"days"`).
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        let singular = normalized.strip_suffix('s').unwrap_or(&normalized);
        CalendarUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == singular)
            .ok_or_else(|| TruncateError::InvalidUnit(format!("'{}'", s.trim())))
    }
}

/// Truncate `instant` to the start of `unit`.
pub fn start_of<C>(ctx: &C, instant: DateTime<Utc>, unit: CalendarUnit) -> Result<DateTime<Utc>>
where
    C: CalendarContext + ?Sized,
{
    unit.truncate(ctx, instant)
}

/// Decompose, apply `reset` to the fields, and recompose.
fn reset_fields<C, F>(ctx: &C, instant: DateTime<Utc>, reset: F) -> Result<DateTime<Utc>>
where
    C: CalendarContext + ?Sized,
    F: FnOnce(&mut CalendarFields),
{
    let mut fields = ctx.decompose(instant)?;
    reset(&mut fields);
    ctx.compose(&fields)
}

/// Zero the sub-second component.
pub fn start_of_second<C>(ctx: &C, instant: DateTime<Utc>) -> Result<DateTime<Utc>>
where
    C: CalendarContext + ?Sized,
{
    reset_fields(ctx, instant, |f| f.nanosecond = 0)
}

/// [`start_of_second`], then zero the second.
pub fn start_of_minute<C>(ctx: &C, instant: DateTime<Utc>) -> Result<DateTime<Utc>>
where
    C: CalendarContext + ?Sized,
{
    let t = start_of_second(ctx, instant)?;
    reset_fields(ctx, t, |f| f.second = 0)
}

/// [`start_of_minute`], then zero the minute.
pub fn start_of_hour<C>(ctx: &C, instant: DateTime<Utc>) -> Result<DateTime<Utc>>
where
    C: CalendarContext + ?Sized,
{
    let t = start_of_minute(ctx, instant)?;
    reset_fields(ctx, t, |f| f.minute = 0)
}

/// [`start_of_hour`], then zero the hour.
///
/// When local midnight occurs twice, the first occurrence is the start of
/// the day.
///
/// # Errors
///
/// Returns [`TruncateError::InvalidInstant`] if local midnight does not exist
/// on that day (zones whose DST transition happens at midnight).
pub fn start_of_day<C>(ctx: &C, instant: DateTime<Utc>) -> Result<DateTime<Utc>>
where
    C: CalendarContext + ?Sized,
{
    let t = start_of_hour(ctx, instant)?;
    reset_fields(ctx, t, |f| {
        f.hour = 0;
        f.disambiguation = Disambiguation::Earliest;
    })
}

/// Alias of [`start_of_day`].
pub fn start_of_date<C>(ctx: &C, instant: DateTime<Utc>) -> Result<DateTime<Utc>>
where
    C: CalendarContext + ?Sized,
{
    start_of_day(ctx, instant)
}

/// [`start_of_day`], then move to the first day of the month.
pub fn start_of_month<C>(ctx: &C, instant: DateTime<Utc>) -> Result<DateTime<Utc>>
where
    C: CalendarContext + ?Sized,
{
    let t = start_of_day(ctx, instant)?;
    reset_fields(ctx, t, |f| {
        f.day = 1;
        f.disambiguation = Disambiguation::Earliest;
    })
}

/// [`start_of_month`], then move to the first month of the year.
pub fn start_of_year<C>(ctx: &C, instant: DateTime<Utc>) -> Result<DateTime<Utc>>
where
    C: CalendarContext + ?Sized,
{
    let t = start_of_month(ctx, instant)?;
    reset_fields(ctx, t, |f| {
        f.month = 1;
        f.disambiguation = Disambiguation::Earliest;
    })
}

/// Local midnight of the most recent day (today included) whose weekday is
/// the context's first day of the week.
///
/// Stepping goes through [`CalendarContext::shift_days`] on calendar dates,
/// so the context's own day rules apply and days without a local midnight
/// can be passed over. Only the final date is composed into an instant;
/// this agrees with [`start_of_day`] applied to that date.
///
/// # Errors
///
/// Returns [`TruncateError::InvalidInstant`] if midnight does not exist on
/// the week's first day, or if the context does not reach the first weekday
/// within six steps.
pub fn start_of_week<C>(ctx: &C, instant: DateTime<Utc>) -> Result<DateTime<Utc>>
where
    C: CalendarContext + ?Sized,
{
    const MAX_STEPS: u32 = 6;

    let first = ctx.first_weekday();
    let mut fields = ctx.decompose(instant)?;
    let mut steps = 0;
    while fields.weekday != first {
        if steps == MAX_STEPS {
            return Err(TruncateError::InvalidInstant(format!(
                "no {first} within {MAX_STEPS} days before {instant}"
            )));
        }
        fields = ctx.shift_days(&fields, -1)?;
        steps += 1;
    }

    fields.hour = 0;
    fields.minute = 0;
    fields.second = 0;
    fields.nanosecond = 0;
    fields.disambiguation = Disambiguation::Earliest;
    ctx.compose(&fields)
}

// ── Tests ───────────────────────────────────────────────────────────────────
