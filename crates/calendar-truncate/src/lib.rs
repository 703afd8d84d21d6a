//! # calendar-truncate
//!
//! Truncate a point in time down to the start of a calendar unit: second,
//! minute, hour, day, week, month or year.
//!
//! Truncation cascades: every coarser unit is computed from the next finer
//! one, so `start_of_minute(start_of_second(t)) == start_of_minute(t)` holds
//! by construction. Calendar rules (timezone, first day of the week) come
//! from an injected [`CalendarContext`] instead of process-wide state.
//!
//! ## Modules
//!
//! - [`truncate`] — `start_of_*` functions and [`CalendarUnit`]
//! - [`context`] — [`CalendarContext`] trait and the chrono-backed [`ZonedCalendar`]
//! - [`clock`] — current Unix timestamps and wait-until-next helpers
//! - [`error`] — Error types

pub mod clock;
pub mod context;
pub mod error;
pub mod truncate;

pub use clock::{
    current_unix_timestamp_millis, current_unix_timestamp_secs, unix_timestamp_millis,
    unix_timestamp_secs, wait_till_next_millis, wait_till_next_second, Clock, FixedClock,
    SystemClock,
};
pub use context::{CalendarContext, CalendarFields, Disambiguation, Era, ZonedCalendar};
pub use error::{Result, TruncateError};
pub use truncate::{
    start_of, start_of_date, start_of_day, start_of_hour, start_of_minute, start_of_month,
    start_of_second, start_of_week, start_of_year, CalendarUnit,
};
