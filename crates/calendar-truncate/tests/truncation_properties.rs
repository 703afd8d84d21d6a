use calendar_truncate::{
    start_of_day, start_of_hour, start_of_minute, start_of_month, start_of_second, start_of_week,
    start_of_year, CalendarContext, CalendarUnit, ZonedCalendar,
};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use proptest::prelude::*;

// 1900-01-01 .. 2100-01-01
const MIN_SECS: i64 = -2_208_988_800;
const MAX_SECS: i64 = 4_102_444_800;

fn instant() -> impl Strategy<Value = DateTime<Utc>> {
    (MIN_SECS..MAX_SECS, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| DateTime::from_timestamp(secs, nanos).unwrap())
}

// 2008-01-01 .. 2024-01-01, covering midnight DST transitions in the zones below
const MIDNIGHT_ERA_MIN_SECS: i64 = 1_199_145_600;
const MIDNIGHT_ERA_MAX_SECS: i64 = 1_704_067_200;

fn midnight_era_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (MIDNIGHT_ERA_MIN_SECS..MIDNIGHT_ERA_MAX_SECS, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| DateTime::from_timestamp(secs, nanos).unwrap())
}

/// Zones whose DST transitions skip or repeat local midnight, plus Samoa's
/// skipped 2011-12-30.
fn midnight_transition_zone() -> impl Strategy<Value = Tz> {
    prop::sample::select(vec!["America/Havana", "America/Sao_Paulo", "Pacific/Apia"])
        .prop_map(|name| name.parse::<Tz>().unwrap())
}

/// The first instant of a local date, if its midnight exists.
fn first_instant_of(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn weekday() -> impl Strategy<Value = Weekday> {
    (0u8..7).prop_map(|n| Weekday::try_from(n).unwrap())
}

fn unit() -> impl Strategy<Value = CalendarUnit> {
    prop::sample::select(CalendarUnit::ALL.to_vec())
}

/// Whole-minute offsets between UTC-12:00 and UTC+14:00.
fn fixed_calendar() -> impl Strategy<Value = ZonedCalendar<FixedOffset>> {
    (-12 * 60..=14 * 60i32, weekday()).prop_map(|(minutes, first)| {
        ZonedCalendar::new(FixedOffset::east_opt(minutes * 60).unwrap(), first)
    })
}

fn local_date<C: CalendarContext>(cal: &C, t: DateTime<Utc>) -> NaiveDate {
    let f = cal.decompose(t).unwrap();
    NaiveDate::from_ymd_opt(f.year, f.month, f.day).unwrap()
}

proptest! {
    #[test]
    fn prop_idempotent(t in instant(), cal in fixed_calendar(), unit in unit()) {
        let once = unit.truncate(&cal, t).unwrap();
        prop_assert_eq!(unit.truncate(&cal, once).unwrap(), once);
    }

    #[test]
    fn prop_never_moves_forward(t in instant(), cal in fixed_calendar(), unit in unit()) {
        prop_assert!(unit.truncate(&cal, t).unwrap() <= t);
    }

    #[test]
    fn prop_cascade_consistent(t in instant(), cal in fixed_calendar()) {
        let second = start_of_second(&cal, t).unwrap();
        let minute = start_of_minute(&cal, t).unwrap();
        let hour = start_of_hour(&cal, t).unwrap();
        let day = start_of_day(&cal, t).unwrap();
        let month = start_of_month(&cal, t).unwrap();
        let year = start_of_year(&cal, t).unwrap();

        prop_assert_eq!(start_of_minute(&cal, second).unwrap(), minute);
        prop_assert_eq!(start_of_hour(&cal, minute).unwrap(), hour);
        prop_assert_eq!(start_of_day(&cal, hour).unwrap(), day);
        prop_assert_eq!(start_of_month(&cal, day).unwrap(), month);
        prop_assert_eq!(start_of_year(&cal, month).unwrap(), year);
        prop_assert_eq!(start_of_week(&cal, day).unwrap(), start_of_week(&cal, t).unwrap());
    }

    #[test]
    fn prop_week_aligned(t in instant(), cal in fixed_calendar()) {
        let week = start_of_week(&cal, t).unwrap();
        let day = start_of_day(&cal, t).unwrap();
        prop_assert_eq!(cal.decompose(week).unwrap().weekday, cal.first_weekday());
        let gap = (local_date(&cal, day) - local_date(&cal, week)).num_days();
        prop_assert!((0..=6).contains(&gap), "gap of {} days", gap);
    }

    #[test]
    fn prop_truncated_fields_are_zeroed(t in instant(), cal in fixed_calendar()) {
        let f = cal.decompose(start_of_year(&cal, t).unwrap()).unwrap();
        prop_assert_eq!((f.month, f.day, f.hour, f.minute, f.second, f.nanosecond), (1, 1, 0, 0, 0, 0));
        prop_assert_eq!(f.year, cal.decompose(t).unwrap().year);
    }

    /// DST zones can make a truncation fail, but whenever it succeeds the
    /// ordering and idempotence still hold.
    #[test]
    fn prop_dst_zone_when_valid(t in instant(), unit in unit(), first in weekday()) {
        let cal = ZonedCalendar::from_iana("Europe/London", first).unwrap();
        if let Ok(once) = unit.truncate(&cal, t) {
            prop_assert!(once <= t);
            prop_assert_eq!(unit.truncate(&cal, once).unwrap(), once);
        }
    }

    #[test]
    fn prop_day_start_is_first_instant_of_local_day(t in midnight_era_instant(), tz in midnight_transition_zone()) {
        let cal = ZonedCalendar::new(tz, Weekday::Mon);
        let date = t.with_timezone(&tz).date_naive();
        let day = start_of_day(&cal, t).ok();
        prop_assert_eq!(day, first_instant_of(&tz, date));

        if let Some(day) = day {
            prop_assert!(day <= t);
            let just_before = day - Duration::nanoseconds(1);
            prop_assert!(just_before.with_timezone(&tz).date_naive() < date);
            prop_assert_eq!(
                start_of_month(&cal, t).ok(),
                first_instant_of(&tz, date.with_day(1).unwrap())
            );
        }
    }

    #[test]
    fn prop_week_start_is_first_instant_of_week_day(
        t in midnight_era_instant(),
        tz in midnight_transition_zone(),
        first in weekday(),
    ) {
        let cal = ZonedCalendar::new(tz, first);
        let date = t.with_timezone(&tz).date_naive();
        let days_back = (date.weekday().num_days_from_monday() + 7 - first.num_days_from_monday()) % 7;
        let target = date - Duration::days(i64::from(days_back));

        let week = start_of_week(&cal, t).ok();
        prop_assert_eq!(week, first_instant_of(&tz, target));
        if let Some(week) = week {
            prop_assert!(week <= t);
            prop_assert_eq!(cal.decompose(week).unwrap().weekday, first);
        }
    }
}
