//! `caltrunc` — truncate timestamps to the start of a calendar unit.
//!
//! ```text
//! caltrunc truncate week --at 2023-06-14T15:42:07Z --tz America/New_York --week-start sun
//! caltrunc now --secs
//! ```
//!
//! Set `RUST_LOG=debug` to see diagnostics on stderr.

use std::fmt;

use anyhow::{Context, Result};
use calendar_truncate::{
    current_unix_timestamp_millis, current_unix_timestamp_secs, CalendarUnit, Clock, SystemClock,
    ZonedCalendar,
};
use chrono::{DateTime, TimeZone, Utc, Weekday};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "caltrunc", version, about = "Truncate timestamps to calendar boundaries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Truncate an instant to the start of a calendar unit
    Truncate(TruncateArgs),
    /// Print the current Unix timestamp in milliseconds
    Now {
        /// Print seconds instead of milliseconds
        #[arg(long)]
        secs: bool,
    },
}

#[derive(Args)]
struct TruncateArgs {
    /// second, minute, hour, day, week, month or year
    unit: CalendarUnit,

    /// RFC 3339 instant to truncate (defaults to now)
    #[arg(long)]
    at: Option<String>,

    /// IANA timezone name (defaults to the host timezone)
    #[arg(long)]
    tz: Option<String>,

    /// First day of the week
    #[arg(long, default_value = "monday")]
    week_start: Weekday,

    /// Print a JSON object instead of a bare timestamp
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct TruncateOutput<'a> {
    unit: CalendarUnit,
    input: String,
    utc: String,
    local: String,
    timezone: &'a str,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = match cli.command {
        Command::Truncate(args) => run_truncate(&args)?,
        Command::Now { secs: true } => current_unix_timestamp_secs().to_string(),
        Command::Now { secs: false } => current_unix_timestamp_millis().to_string(),
    };
    println!("{output}");
    Ok(())
}

fn run_truncate(args: &TruncateArgs) -> Result<String> {
    let instant = match &args.at {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("invalid --at value '{s}'"))?,
        None => SystemClock.now(),
    };

    match &args.tz {
        Some(name) => {
            let cal = ZonedCalendar::from_iana(name, args.week_start)?;
            render(&cal, name, instant, args)
        }
        None => render(&ZonedCalendar::local(args.week_start), "local", instant, args),
    }
}

fn render<Z>(
    cal: &ZonedCalendar<Z>,
    timezone: &str,
    instant: DateTime<Utc>,
    args: &TruncateArgs,
) -> Result<String>
where
    Z: TimeZone,
    Z::Offset: fmt::Display,
{
    tracing::debug!(unit = %args.unit, %instant, timezone, week_start = %args.week_start, "truncating");
    let truncated = args
        .unit
        .truncate(cal, instant)
        .with_context(|| format!("cannot truncate {} to {}", instant.to_rfc3339(), args.unit))?;
    let local = cal.localize(truncated).to_rfc3339();

    if !args.json {
        return Ok(local);
    }
    let output = TruncateOutput {
        unit: args.unit,
        input: instant.to_rfc3339(),
        utc: truncated.to_rfc3339(),
        local,
        timezone,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}
