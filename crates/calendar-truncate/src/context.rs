//! Calendar contexts: the rules that turn an instant into calendar fields and back.
//!
//! Truncation never touches a global calendar. Callers inject a
//! [`CalendarContext`], which makes it possible to truncate the same instant
//! under several timezones or week conventions side by side.
//!
//! [`ZonedCalendar`] is the provided implementation. It is backed by any
//! `chrono` [`TimeZone`]: [`Utc`], a fixed offset, the host zone ([`Local`]),
//! or an IANA zone from `chrono-tz`.

use std::fmt;

use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, Offset,
    TimeZone, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TruncateError};

// ── Calendar fields ─────────────────────────────────────────────────────────

/// Era of a proleptic Gregorian year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Era {
    /// Astronomical year 0 and earlier (1 BCE, 2 BCE, ...).
    BeforeCommon,
    /// Year 1 and later.
    Common,
}

/// Which instant to pick when local wall-clock time occurs twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disambiguation {
    /// The occurrence whose UTC offset equals `utc_offset_seconds`.
    #[default]
    MatchOffset,
    /// The first occurrence. Used once a day boundary is being composed.
    Earliest,
}

/// An instant broken down into local calendar fields.
///
/// `year` is the astronomical year (year 0 is 1 BCE). `weekday` is derived
/// and ignored by [`CalendarContext::compose`]. `utc_offset_seconds` is the
/// offset in force at the decomposed instant; together with
/// `disambiguation` it is only consulted when the local wall-clock time is
/// ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub nanosecond: u32,
    pub weekday: Weekday,
    pub utc_offset_seconds: i32,
    pub disambiguation: Disambiguation,
}

impl CalendarFields {
    fn from_local(local: &NaiveDateTime, utc_offset_seconds: i32) -> Self {
        Self {
            year: local.year(),
            month: local.month(),
            day: local.day(),
            hour: local.hour(),
            minute: local.minute(),
            second: local.second(),
            nanosecond: local.nanosecond(),
            weekday: local.weekday(),
            utc_offset_seconds,
            disambiguation: Disambiguation::MatchOffset,
        }
    }

    /// The era this year falls in.
    pub fn era(&self) -> Era {
        if self.year > 0 {
            Era::Common
        } else {
            Era::BeforeCommon
        }
    }

    /// The year counted within its era (1 BCE is year 1 of [`Era::BeforeCommon`]).
    pub fn year_of_era(&self) -> u32 {
        if self.year > 0 {
            self.year.unsigned_abs()
        } else {
            (1 - i64::from(self.year)) as u32
        }
    }

    /// The local wall-clock datetime, if the fields form a valid one.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_nano_opt(
            self.hour,
            self.minute,
            self.second,
            self.nanosecond,
        )
    }
}

impl fmt::Display for CalendarFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.utc_offset_seconds >= 0 { '+' } else { '-' };
        let abs = self.utc_offset_seconds.unsigned_abs();
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:09}{sign}{:02}:{:02}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.nanosecond,
            abs / 3600,
            (abs % 3600) / 60,
        )
    }
}

// ── CalendarContext ─────────────────────────────────────────────────────────

/// Read-only calendar rules used by the truncation functions.
///
/// Implementations must be pure: the same input always yields the same
/// output, and no method mutates the context.
pub trait CalendarContext {
    /// Break an instant down into local calendar fields.
    fn decompose(&self, instant: DateTime<Utc>) -> Result<CalendarFields>;

    /// Rebuild an instant from local calendar fields.
    ///
    /// Fails with [`TruncateError::InvalidInstant`] when the fields do not
    /// name exactly one instant in this calendar.
    fn compose(&self, fields: &CalendarFields) -> Result<DateTime<Utc>>;

    /// Move the local date of `fields` by `delta` calendar days, keeping the
    /// wall-clock fields and updating the weekday.
    ///
    /// Works on dates only: the shifted fields need not name an existing
    /// instant until they are passed to [`compose`](Self::compose).
    fn shift_days(&self, fields: &CalendarFields, delta: i64) -> Result<CalendarFields>;

    /// Move an instant by `delta` calendar days, keeping its wall-clock time.
    fn add_days(&self, instant: DateTime<Utc>, delta: i64) -> Result<DateTime<Utc>> {
        let fields = self.decompose(instant)?;
        self.compose(&self.shift_days(&fields, delta)?)
    }

    /// The weekday that starts a week in this calendar.
    fn first_weekday(&self) -> Weekday;
}

// ── ZonedCalendar ───────────────────────────────────────────────────────────

/// Proleptic Gregorian calendar in a `chrono` timezone with a configurable
/// first day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZonedCalendar<Z: TimeZone> {
    tz: Z,
    first_weekday: Weekday,
}

impl<Z: TimeZone> ZonedCalendar<Z> {
    pub fn new(tz: Z, first_weekday: Weekday) -> Self {
        Self { tz, first_weekday }
    }

    /// Same timezone, different first day of the week.
    pub fn with_first_weekday(self, first_weekday: Weekday) -> Self {
        Self {
            first_weekday,
            ..self
        }
    }

    pub fn timezone(&self) -> &Z {
        &self.tz
    }

    /// Express an instant in this calendar's timezone.
    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<Z> {
        instant.with_timezone(&self.tz)
    }
}

impl ZonedCalendar<Utc> {
    pub fn utc(first_weekday: Weekday) -> Self {
        Self::new(Utc, first_weekday)
    }
}

impl ZonedCalendar<Local> {
    /// The host's configured timezone.
    pub fn local(first_weekday: Weekday) -> Self {
        Self::new(Local, first_weekday)
    }
}

impl ZonedCalendar<Tz> {
    /// Build a calendar for an IANA timezone name (e.g. `"America/New_York"`).
    ///
    /// # Errors
    ///
    /// Returns [`TruncateError::InvalidTimezone`] if the name is unknown.
    pub fn from_iana(name: &str, first_weekday: Weekday) -> Result<Self> {
        let tz = name
            .parse::<Tz>()
            .map_err(|_| TruncateError::InvalidTimezone(format!("'{name}'")))?;
        Ok(Self::new(tz, first_weekday))
    }
}

impl Default for ZonedCalendar<Utc> {
    /// UTC with ISO 8601 weeks (Monday first).
    fn default() -> Self {
        Self::utc(Weekday::Mon)
    }
}

impl<Z: TimeZone> CalendarContext for ZonedCalendar<Z> {
    fn decompose(&self, instant: DateTime<Utc>) -> Result<CalendarFields> {
        let utc = instant.naive_utc();
        let offset = self.tz.offset_from_utc_datetime(&utc).fix();
        let offset_secs = offset.local_minus_utc();
        let local = utc
            .checked_add_signed(Duration::seconds(i64::from(offset_secs)))
            .ok_or_else(|| {
                TruncateError::InvalidInstant(format!(
                    "'{instant}' at offset {offset} is outside the representable calendar range"
                ))
            })?;
        Ok(CalendarFields::from_local(&local, offset_secs))
    }

    fn compose(&self, fields: &CalendarFields) -> Result<DateTime<Utc>> {
        let naive = fields.to_naive().ok_or_else(|| {
            TruncateError::InvalidInstant(format!("calendar fields out of range: {fields}"))
        })?;

        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) if fields.disambiguation == Disambiguation::Earliest => {
                Ok(earliest.with_timezone(&Utc))
            }
            LocalResult::Ambiguous(earliest, latest) => [earliest, latest]
                .into_iter()
                .find(|dt| dt.offset().fix().local_minus_utc() == fields.utc_offset_seconds)
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| {
                    tracing::debug!(%naive, offset = fields.utc_offset_seconds, "unresolvable ambiguous local time");
                    TruncateError::InvalidInstant(format!(
                        "ambiguous local time {naive} matches neither candidate offset"
                    ))
                }),
            LocalResult::None => {
                tracing::debug!(%naive, "local time falls in a timezone gap");
                Err(TruncateError::InvalidInstant(format!(
                    "nonexistent local time {naive}"
                )))
            }
        }
    }

    fn shift_days(&self, fields: &CalendarFields, delta: i64) -> Result<CalendarFields> {
        let shifted = NaiveDate::from_ymd_opt(fields.year, fields.month, fields.day)
            .zip(Duration::try_days(delta))
            .and_then(|(date, days)| date.checked_add_signed(days))
            .ok_or_else(|| {
                TruncateError::InvalidInstant(format!(
                    "{fields} shifted by {delta} days is out of range"
                ))
            })?;

        Ok(CalendarFields {
            year: shifted.year(),
            month: shifted.month(),
            day: shifted.day(),
            weekday: shifted.weekday(),
            ..*fields
        })
    }

    fn first_weekday(&self) -> Weekday {
        self.first_weekday
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
