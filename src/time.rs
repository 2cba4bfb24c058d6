//! Time and Timezone Utilities Module
//!
//! Local wall-clock resolution, time parsing, timezone resolution and
//! duration formatting.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use iana_time_zone::get_timezone;
use std::sync::OnceLock;
use tzf_rs::DefaultFinder;

use crate::error::{Error, Result};

// tzf-rs DefaultFinder is pre-compiled and very fast
static TZF_FINDER: OnceLock<DefaultFinder> = OnceLock::new();

pub const MINUTES_PER_DAY: u32 = 1440;

// ===================== LOCAL TIME RESOLUTION =====================

/// Resolve a wall-clock time in `tz` to an instant.
///
/// Ambiguous times (fall back) resolve to the earlier instant. Times inside
/// a spring-forward gap are pushed forward by one hour, the way wall-clock
/// arithmetic lands past the gap. Returns `None` only when the shifted time
/// does not exist either (a whole skipped calendar day).
pub fn resolve_local(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => Some(t),
        LocalResult::Ambiguous(t, _) => Some(t),
        LocalResult::None => {
            let shifted = tz.from_local_datetime(&(naive + Duration::hours(1))).earliest();
            if shifted.is_some() {
                log::debug!("{} does not exist in {}; shifted one hour forward", naive, tz);
            } else {
                log::warn!("{} does not exist in {}; sample skipped", naive, tz);
            }
            shifted
        }
    }
}

/// The instant `minute` minutes after local midnight of `date`.
///
/// Minute 1440 is midnight of the following day.
pub fn local_minute(date: NaiveDate, tz: Tz, minute: u32) -> Option<DateTime<Tz>> {
    let naive = date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minute));
    resolve_local(tz, naive)
}

/// Every sampling minute of a day: 0, step, 2*step, ... up to and including 1440.
pub fn day_minutes(step_minutes: u32) -> Result<impl Iterator<Item = u32>> {
    if step_minutes == 0 || step_minutes > MINUTES_PER_DAY {
        return Err(Error::InvalidStep(step_minutes));
    }
    Ok((0..=MINUTES_PER_DAY).step_by(step_minutes as usize))
}

// ===================== TIME PARSING =====================

/// Parse a time string in HH:MM[:SS[.fffffffff]] format.
///
/// # Errors
/// Returns `Error::InvalidTime` if no format matches
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    // %.f accepts up to nanosecond precision
    let formats = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

    formats
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| Error::InvalidTime(s.to_string()))
}

// ===================== TIMEZONE UTILITIES =====================

/// Get the system's configured timezone.
///
/// Falls back to UTC if the system timezone cannot be determined.
pub fn system_timezone() -> Tz {
    match get_timezone().ok().and_then(|s| s.parse().ok()) {
        Some(tz) => tz,
        None => {
            log::warn!("could not determine the system time zone, using UTC");
            Tz::UTC
        }
    }
}

/// Resolve timezone from geographic coordinates.
///
/// # Arguments
/// * `lon` - Longitude in degrees
/// * `lat` - Latitude in degrees
///
/// # Returns
/// The resolved timezone, or UTC if resolution fails
pub fn resolve_timezone(lon: f64, lat: f64) -> Tz {
    let finder = TZF_FINDER.get_or_init(DefaultFinder::new);

    // IANA name such as "America/Chicago"
    let tzid = finder.get_tz_name(lon, lat);

    tzid.parse::<Tz>().unwrap_or_else(|_| {
        log::warn!("no time zone found for lat={}, lon={}, using UTC", lat, lon);
        Tz::UTC
    })
}

/// Parse an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>().map_err(|_| Error::UnknownTimezone(name.to_string()))
}

// ===================== FORMATTING =====================

/// Format a duration in minutes as "Xh Ym".
pub fn format_minutes(minutes: i64) -> String {
    let total = minutes.abs();
    let h = total / 60;
    let m = total % 60;
    match (h, m) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::America::Chicago;
    use chrono_tz::Pacific::Apia;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_time_parsing_invalid() {
        assert!(parse_time("a").is_err());
        assert!(parse_time("21").is_err());
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("12:60").is_err());
        assert!(parse_time("12:30:99").is_err());
    }

    #[test]
    fn test_time_parsing_valid() {
        assert_eq!(parse_time("12:30").unwrap(), NaiveTime::from_hms_opt(12, 30, 0).unwrap());
        assert_eq!(parse_time("00:00").unwrap(), NaiveTime::MIN);
        assert_eq!(
            parse_time("12:30:45.123").unwrap(),
            NaiveTime::from_hms_milli_opt(12, 30, 45, 123).unwrap()
        );
    }

    #[test]
    fn test_local_minute_regular_day() {
        let t = local_minute(date(2025, 6, 21), Chicago, 12 * 60 + 5).unwrap();
        assert_eq!((t.hour(), t.minute()), (12, 5));

        // 1440 rolls over to the next midnight
        let end = local_minute(date(2025, 6, 21), Chicago, MINUTES_PER_DAY).unwrap();
        assert_eq!(end.date_naive(), date(2025, 6, 22));
        assert_eq!((end.hour(), end.minute()), (0, 0));
    }

    #[test]
    fn test_local_minute_spring_forward_gap() {
        // 2025-03-09 02:30 does not exist in Chicago
        let t = local_minute(date(2025, 3, 9), Chicago, 150).unwrap();
        assert_eq!((t.hour(), t.minute()), (3, 30));
    }

    #[test]
    fn test_local_minute_fall_back_takes_earlier() {
        // 01:30 happens twice on 2025-11-02; the first one is still CDT (UTC-5)
        let t = local_minute(date(2025, 11, 2), Chicago, 90).unwrap();
        assert_eq!(format!("{}", t.format("%:z")), "-05:00");
    }

    #[test]
    fn test_local_minute_skipped_day() {
        // Samoa skipped Dec 30, 2011 entirely
        assert!(local_minute(date(2011, 12, 30), Apia, 720).is_none());
    }

    #[test]
    fn test_day_minutes() {
        let five: Vec<u32> = day_minutes(5).unwrap().collect();
        assert_eq!(five.len(), 289);
        assert_eq!(five.first(), Some(&0));
        assert_eq!(five.last(), Some(&1440));

        assert_eq!(day_minutes(10).unwrap().count(), 145);
        // 7 does not divide 1440: last sample is 1435
        assert_eq!(day_minutes(7).unwrap().last(), Some(1435));
        assert!(day_minutes(0).is_err());
        assert!(day_minutes(1441).is_err());
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("America/Chicago").unwrap(), Chicago);
        assert!(parse_timezone("Mars/Olympus_Mons").is_err());
    }

    #[test]
    fn test_resolve_timezone_lawrence() {
        let tz = resolve_timezone(-95.2422898, 38.9631672);
        assert_eq!(tz, Chicago);
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(120), "2h");
        assert_eq!(format_minutes(893), "14h 53m");
        assert_eq!(format_minutes(-61), "1h 1m");
    }
}
