//! Reading the current time.
//!
//! The [`Clock`] trait lets callers swap the system clock for a fixed or
//! simulated one. The wait helpers block until a clock moves past a given
//! reading; they sleep toward the deadline in short slices instead of
//! spinning on the clock.

use std::thread;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};

/// Longest single sleep taken while waiting for a clock to advance.
pub const MAX_SLEEP_SLICE: StdDuration = StdDuration::from_millis(10);

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The operating system's wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant. Never use it with the wait helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Milliseconds since the Unix epoch. Readings before the epoch clamp to 0.
pub fn unix_timestamp_millis<C: Clock + ?Sized>(clock: &C) -> u64 {
    let millis = clock.now().timestamp_millis();
    u64::try_from(millis).unwrap_or_else(|_| {
        tracing::warn!(millis, "clock reads before the Unix epoch, using 0");
        0
    })
}

/// Seconds since the Unix epoch. Readings before the epoch clamp to 0.
pub fn unix_timestamp_secs<C: Clock + ?Sized>(clock: &C) -> u64 {
    let secs = clock.now().timestamp();
    u64::try_from(secs).unwrap_or_else(|_| {
        tracing::warn!(secs, "clock reads before the Unix epoch, using 0");
        0
    })
}

/// Current Unix timestamp in milliseconds from the system clock.
pub fn current_unix_timestamp_millis() -> u64 {
    unix_timestamp_millis(&SystemClock)
}

/// Current Unix timestamp in seconds from the system clock.
pub fn current_unix_timestamp_secs() -> u64 {
    unix_timestamp_secs(&SystemClock)
}

/// Block until the clock reads a millisecond later than `current`, and
/// return that reading.
///
/// Returns `u64::MAX` at once when `current` is `u64::MAX`. A clock stuck
/// before the epoch reads as 0, so this keeps waiting until it passes the
/// epoch and then moves past `current`.
pub fn wait_till_next_millis<C: Clock + ?Sized>(clock: &C, current: u64) -> u64 {
    if current == u64::MAX {
        return u64::MAX;
    }
    let deadline = current + 1;
    loop {
        let now = unix_timestamp_millis(clock);
        if now > current {
            return now;
        }
        sleep_toward(deadline, now);
    }
}

/// Block until the clock reads a second later than `current`, and return
/// that reading.
///
/// Returns `u64::MAX` at once when `current` is `u64::MAX`; see
/// [`wait_till_next_millis`] for clocks before the epoch.
pub fn wait_till_next_second<C: Clock + ?Sized>(clock: &C, current: u64) -> u64 {
    if current == u64::MAX {
        return u64::MAX;
    }
    let deadline = current.saturating_add(1).saturating_mul(1000);
    loop {
        let now = unix_timestamp_secs(clock);
        if now > current {
            return now;
        }
        sleep_toward(deadline, unix_timestamp_millis(clock));
    }
}

/// Sleep until `deadline_millis`, but never longer than [`MAX_SLEEP_SLICE`]
/// and never less than one millisecond.
fn sleep_toward(deadline_millis: u64, now_millis: u64) {
    let remaining = StdDuration::from_millis(deadline_millis.saturating_sub(now_millis).max(1));
    let slice = remaining.min(MAX_SLEEP_SLICE);
    tracing::trace!(?slice, deadline_millis, "waiting for clock to advance");
    thread::sleep(slice);
}
