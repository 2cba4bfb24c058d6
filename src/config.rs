//! Scene Configuration Module
//!
//! One immutable description of what to compute: where, when, and for which
//! panel. Built once by the caller and passed by reference into every engine
//! call.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_english::{Dialect, parse_date_string};
use chrono_tz::Tz;

use crate::error::{Error, Result};
use crate::geo::GeoLocation;
use crate::incidence::{DEFAULT_PEAK_STEP_MINUTES, PanelOrientation};
use crate::provider::Atmosphere;
use crate::sun_path::DEFAULT_PATH_STEP_MINUTES;
use crate::time::{
    MINUTES_PER_DAY, parse_time, parse_timezone, resolve_local, resolve_timezone, system_timezone,
};

/// Lowest supported observer elevation (Dead Sea shore), meters
pub const MIN_ELEVATION_M: f64 = -500.0;
/// Highest supported observer elevation (ISA troposphere limit), meters
pub const MAX_ELEVATION_M: f64 = 11_000.0;

// ===================== TYPES =====================

/// Time of day the scene is evaluated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeSelection {
    /// Follow the wall clock
    #[default]
    Now,
    /// A user-chosen local time of day
    Fixed(NaiveTime),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    pub location: GeoLocation,
    pub timezone: Tz,
    pub date: NaiveDate,
    pub time: TimeSelection,
    pub panel: PanelOrientation,
    /// Observer altitude above mean sea level
    pub elevation_m: f64,
    pub atmosphere: Atmosphere,
    pub peak_step_minutes: u32,
    pub path_step_minutes: u32,
}

impl SceneConfig {
    /// A scene at `location` on `date`, evaluated "now", with the default
    /// panel, sea-level observer and standard atmosphere.
    pub fn new(location: GeoLocation, timezone: Tz, date: NaiveDate) -> Self {
        Self {
            location,
            timezone,
            date,
            time: TimeSelection::Now,
            panel: PanelOrientation::default(),
            elevation_m: 0.0,
            atmosphere: Atmosphere::Standard,
            peak_step_minutes: DEFAULT_PEAK_STEP_MINUTES,
            path_step_minutes: DEFAULT_PATH_STEP_MINUTES,
        }
    }

    pub fn with_time(mut self, time: TimeSelection) -> Self {
        self.time = time;
        self
    }

    pub fn with_panel(mut self, panel: PanelOrientation) -> Self {
        self.panel = panel;
        self
    }

    pub fn with_elevation(mut self, elevation_m: f64) -> Self {
        self.elevation_m = elevation_m;
        self
    }

    pub fn with_atmosphere(mut self, atmosphere: Atmosphere) -> Self {
        self.atmosphere = atmosphere;
        self
    }

    pub fn with_steps(mut self, peak_step_minutes: u32, path_step_minutes: u32) -> Self {
        self.peak_step_minutes = peak_step_minutes;
        self.path_step_minutes = path_step_minutes;
        self
    }

    /// Check the numeric settings that the builder methods accept unchecked.
    ///
    /// # Errors
    /// `Error::InvalidStep` for a sampling step outside 1..=1440 and
    /// `Error::InvalidElevation` for an elevation outside the supported range
    pub fn validate(&self) -> Result<()> {
        for step in [self.peak_step_minutes, self.path_step_minutes] {
            if step == 0 || step > MINUTES_PER_DAY {
                return Err(Error::InvalidStep(step));
            }
        }
        if !(MIN_ELEVATION_M..=MAX_ELEVATION_M).contains(&self.elevation_m) {
            return Err(Error::InvalidElevation(self.elevation_m));
        }
        Ok(())
    }

    /// The instant this scene is evaluated at.
    ///
    /// # Arguments
    /// * `now` - The current instant, used for [`TimeSelection::Now`]
    ///
    /// # Errors
    /// `Error::NonexistentLocalTime` when a fixed time falls inside a DST gap
    pub fn instant(&self, now: DateTime<Utc>) -> Result<DateTime<Tz>> {
        match self.time {
            TimeSelection::Now => {
                let now = now.with_timezone(&self.timezone);
                if now.date_naive() == self.date {
                    return Ok(now);
                }
                // Same wall-clock time on another day
                Ok(resolve_local(self.timezone, self.date.and_time(now.time())).unwrap_or(now))
            }
            TimeSelection::Fixed(t) => {
                let naive = self.date.and_time(t);
                match self.timezone.from_local_datetime(&naive) {
                    LocalResult::Single(dt) => Ok(dt),
                    LocalResult::Ambiguous(early, late) => {
                        log::warn!(
                            "time {} is ambiguous (DST transition); using {} rather than {}",
                            t,
                            early.format("%H:%M:%S %Z"),
                            late.format("%H:%M:%S %Z")
                        );
                        Ok(early)
                    }
                    LocalResult::None => Err(Error::NonexistentLocalTime {
                        date: self.date.to_string(),
                        time: t.to_string(),
                        timezone: self.timezone.name().to_string(),
                    }),
                }
            }
        }
    }
}

// ===================== INPUT RESOLUTION =====================

/// Pick the scene time zone.
///
/// # Arguments
/// * `name` - "system", "location", or an IANA time zone name
/// * `utc` - Force UTC regardless of `name`
/// * `location` - Used by "location"
///
/// # Errors
/// `Error::UnknownTimezone` if `name` is not a known IANA zone
pub fn select_timezone(name: &str, utc: bool, location: GeoLocation) -> Result<Tz> {
    if utc {
        return Ok(Tz::UTC);
    }
    match name {
        "system" => Ok(system_timezone()),
        "location" => Ok(resolve_timezone(location.longitude, location.latitude)),
        other => parse_timezone(other),
    }
}

/// Resolve the scene date.
///
/// A missing input means today in `tz`. Otherwise the input is read as
/// natural language ("2025-06-21", "tomorrow", "next friday") relative to
/// `now` in `tz`.
///
/// # Errors
/// `Error::InvalidDate` if the input cannot be understood
pub fn parse_date(input: Option<&str>, tz: Tz, now: DateTime<Utc>) -> Result<NaiveDate> {
    // Anchor 'today' to the target timezone
    let anchor = now.with_timezone(&tz);
    match input {
        None => Ok(anchor.date_naive()),
        Some(s) => parse_date_string(s, anchor, Dialect::Us)
            .map(|dt| dt.with_timezone(&tz).date_naive())
            .map_err(|e| Error::InvalidDate { input: s.to_string(), reason: e.to_string() }),
    }
}

/// Read the `--at` value: absent or "now" follows the clock.
pub fn parse_time_selection(input: Option<&str>) -> Result<TimeSelection> {
    match input {
        None | Some("now") => Ok(TimeSelection::Now),
        Some(s) => parse_time(s).map(TimeSelection::Fixed),
    }
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::America::Chicago;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn lawrence(d: NaiveDate) -> SceneConfig {
        SceneConfig::new(GeoLocation::LAWRENCE_KS, Chicago, d)
    }

    #[test]
    fn test_defaults() {
        let cfg = lawrence(date(2025, 6, 21));
        assert_eq!(cfg.time, TimeSelection::Now);
        assert_eq!(cfg.panel, PanelOrientation { heading_deg: 155.0, tilt_deg: 24.0 });
        assert_eq!(cfg.peak_step_minutes, 5);
        assert_eq!(cfg.path_step_minutes, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cfg = lawrence(date(2025, 6, 21));
        assert!(matches!(cfg.with_steps(0, 10).validate(), Err(Error::InvalidStep(0))));
        assert!(matches!(cfg.with_steps(5, 2000).validate(), Err(Error::InvalidStep(2000))));
        assert!(matches!(
            cfg.with_elevation(12_000.0).validate(),
            Err(Error::InvalidElevation(_))
        ));
        assert!(cfg.with_elevation(-430.0).validate().is_ok());
    }

    #[test]
    fn test_fixed_instant() {
        let cfg = lawrence(date(2025, 6, 21)).with_time(TimeSelection::Fixed(hm(13, 30)));
        let t = cfg.instant(Utc::now()).unwrap();
        assert_eq!(t.to_rfc3339(), "2025-06-21T13:30:00-05:00");
    }

    #[test]
    fn test_fixed_instant_in_dst_gap_is_rejected() {
        let cfg = lawrence(date(2025, 3, 9)).with_time(TimeSelection::Fixed(hm(2, 30)));
        assert!(matches!(cfg.instant(Utc::now()), Err(Error::NonexistentLocalTime { .. })));
    }

    #[test]
    fn test_fixed_instant_ambiguous_takes_earlier() {
        let cfg = lawrence(date(2025, 11, 2)).with_time(TimeSelection::Fixed(hm(1, 30)));
        let t = cfg.instant(Utc::now()).unwrap();
        assert_eq!(t.to_rfc3339(), "2025-11-02T01:30:00-05:00");
    }

    #[test]
    fn test_now_instant() {
        let now = Utc.with_ymd_and_hms(2025, 6, 21, 18, 45, 0).unwrap();

        // Same day: the current instant itself
        let t = lawrence(date(2025, 6, 21)).instant(now).unwrap();
        assert_eq!(t, now.with_timezone(&Chicago));

        // Another day: the current wall-clock time on that day
        let t = lawrence(date(2025, 12, 21)).instant(now).unwrap();
        assert_eq!(t.date_naive(), date(2025, 12, 21));
        assert_eq!((t.hour(), t.minute()), (13, 45));
    }

    #[test]
    fn test_parse_date() {
        let now = Utc.with_ymd_and_hms(2025, 6, 21, 3, 0, 0).unwrap();

        // 03:00 UTC is still the 20th in Chicago
        assert_eq!(parse_date(None, Chicago, now).unwrap(), date(2025, 6, 20));
        assert_eq!(parse_date(Some("2025-12-25"), Chicago, now).unwrap(), date(2025, 12, 25));
        assert_eq!(parse_date(Some("tomorrow"), Chicago, now).unwrap(), date(2025, 6, 21));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        let err = parse_date(Some("blursday"), Chicago, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::InvalidDate { .. }), "got {:?}", err);
    }

    #[test]
    fn test_parse_time_selection() {
        assert_eq!(parse_time_selection(None).unwrap(), TimeSelection::Now);
        assert_eq!(parse_time_selection(Some("now")).unwrap(), TimeSelection::Now);
        assert_eq!(parse_time_selection(Some("06:15")).unwrap(), TimeSelection::Fixed(hm(6, 15)));
        assert!(parse_time_selection(Some("quarter past")).is_err());
    }

    #[test]
    fn test_select_timezone() {
        let loc = GeoLocation::LAWRENCE_KS;
        assert_eq!(select_timezone("America/Chicago", true, loc).unwrap(), Tz::UTC);
        assert_eq!(select_timezone("location", false, loc).unwrap(), Chicago);
        assert_eq!(select_timezone("Europe/Oslo", false, loc).unwrap(), chrono_tz::Europe::Oslo);
        assert!(matches!(
            select_timezone("Nowhere/Special", false, loc),
            Err(Error::UnknownTimezone(_))
        ));
    }
}
