//! Scene Report Module
//!
//! Runs the engine once for a [`SceneConfig`] and collects everything a
//! front end needs to draw the scene. Timestamps are rendered as RFC 3339
//! strings so the report serializes without further conversion.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::config::{SceneConfig, TimeSelection};
use crate::error::Result;
use crate::geo::GeoLocation;
use crate::geometry::{Vec3, rad_to_deg, to_compass_heading, to_direction_vector};
use crate::incidence::{
    PanelOrientation, angle_of_incidence_deg, contributing_incidence, daily_incidence_curve,
    incidence_factor, panel_normal, peak_of,
};
use crate::provider::SunPositionProvider;
use crate::sun_events::{SunEvent, daylight_minutes, daylight_summary, format_heading};
use crate::sun_path::build_sun_path_samples;
use crate::time::local_minute;

// ===================== TYPES =====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SunReport {
    /// Provider convention: from south, westward positive
    pub azimuth_rad: f64,
    pub altitude_rad: f64,
    pub altitude_deg: f64,
    /// Compass heading, 0 = north, clockwise
    pub heading_deg: f64,
    pub direction: Vec3,
    pub up: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelReport {
    pub orientation: PanelOrientation,
    pub normal: Vec3,
    /// Clamped cosine of the angle of incidence, ignoring the horizon
    pub incidence_factor: f64,
    /// Incidence factor, 0 while the sun is down
    pub contributing_factor: f64,
    pub angle_of_incidence_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventReport {
    pub time: String,
    pub heading_deg: f64,
}

impl From<SunEvent> for EventReport {
    fn from(event: SunEvent) -> Self {
        Self { time: event.time.to_rfc3339(), heading_deg: event.heading_deg }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaylightReport {
    pub sunrise: Option<EventReport>,
    pub sunset: Option<EventReport>,
    /// Headings as displayed, "--" when the event does not happen
    pub sunrise_heading: String,
    pub sunset_heading: String,
    pub daylight_minutes: i64,
    /// Next existing day's daylight minus today's, in minutes
    pub change_tomorrow_minutes: Option<i64>,
    pub solar_noon: Option<String>,
    pub solar_noon_altitude_deg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakReport {
    pub factor: f64,
    pub time: Option<String>,
    pub angle_of_incidence_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurvePoint {
    pub time: String,
    pub factor: f64,
    pub sun_up: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneReport {
    pub location: GeoLocation,
    pub timezone: String,
    pub date: String,
    pub time: String,
    pub fixed_time: bool,
    pub elevation_m: f64,
    pub sun: SunReport,
    pub panel: PanelReport,
    pub daylight: DaylightReport,
    pub daily_peak: PeakReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve: Option<Vec<CurvePoint>>,
    pub sun_path: Vec<Vec3>,
}

// ===================== COMPUTATION =====================

impl SceneReport {
    /// Evaluate the scene.
    ///
    /// # Arguments
    /// * `config` - What to compute
    /// * `provider` - Source of sun positions and daily times
    /// * `now` - Current instant, used when the time selection is "now"
    /// * `with_curve` - Keep every sample of the incidence sweep
    ///
    /// # Errors
    /// Invalid configuration values, or a fixed time inside a DST gap
    pub fn compute<P: SunPositionProvider>(
        config: &SceneConfig,
        provider: &P,
        now: DateTime<Utc>,
        with_curve: bool,
    ) -> Result<Self> {
        config.validate()?;
        let SceneConfig { location, timezone: tz, date, panel, .. } = *config;

        let at = config.instant(now)?;
        let sun = provider.position(at, location);
        let raw = incidence_factor(&sun, &panel);

        let sun_report = SunReport {
            azimuth_rad: sun.azimuth_rad,
            altitude_rad: sun.altitude_rad,
            altitude_deg: rad_to_deg(sun.altitude_rad),
            heading_deg: to_compass_heading(sun.azimuth_rad),
            direction: to_direction_vector(&sun),
            up: sun.is_up(),
        };

        let panel_report = PanelReport {
            orientation: panel,
            normal: panel_normal(&panel),
            incidence_factor: raw,
            contributing_factor: contributing_incidence(&sun, &panel),
            angle_of_incidence_deg: angle_of_incidence_deg(raw),
        };

        let daylight = daylight_report(provider, date, tz, location);

        let curve = daily_incidence_curve(
            provider,
            date,
            tz,
            location,
            &panel,
            config.peak_step_minutes,
        )?;
        let peak = peak_of(&curve);
        let daily_peak = PeakReport {
            factor: peak.factor,
            time: peak.time.map(|t| t.to_rfc3339()),
            angle_of_incidence_deg: angle_of_incidence_deg(peak.factor),
        };

        let sun_path =
            build_sun_path_samples(provider, date, tz, location, config.path_step_minutes)?;

        let curve = with_curve.then(|| {
            curve
                .iter()
                .map(|s| CurvePoint { time: s.time.to_rfc3339(), factor: s.factor, sun_up: s.sun_up })
                .collect()
        });

        Ok(Self {
            location,
            timezone: tz.name().to_string(),
            date: date.to_string(),
            time: at.to_rfc3339(),
            fixed_time: matches!(config.time, TimeSelection::Fixed(_)),
            elevation_m: config.elevation_m,
            sun: sun_report,
            panel: panel_report,
            daylight,
            daily_peak,
            curve,
            sun_path,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn daylight_report<P: SunPositionProvider>(
    provider: &P,
    date: NaiveDate,
    tz: Tz,
    location: GeoLocation,
) -> DaylightReport {
    let summary = daylight_summary(provider, date, tz, location);
    let noon = provider.times(date, tz, location).solar_noon;

    let change_tomorrow_minutes = next_existing_day(date, tz).map(|next| {
        let tomorrow = daylight_summary(provider, next, tz, location);
        tomorrow.daylight_minutes - summary.daylight_minutes
    });

    DaylightReport {
        sunrise: summary.sunrise.map(EventReport::from),
        sunset: summary.sunset.map(EventReport::from),
        sunrise_heading: format_heading(summary.sunrise.map(|e| e.heading_deg)),
        sunset_heading: format_heading(summary.sunset.map(|e| e.heading_deg)),
        daylight_minutes: daylight_minutes(summary.sunrise, summary.sunset),
        change_tomorrow_minutes,
        solar_noon: noon.map(|t| t.to_rfc3339()),
        solar_noon_altitude_deg: noon
            .map(|t| rad_to_deg(provider.position(t, location).altitude_rad)),
    }
}

/// The next calendar day that exists in `tz`.
///
/// Looks up to two days ahead so that a day skipped by a time-zone change
/// (Samoa, 2011-12-30) is stepped over.
fn next_existing_day(date: NaiveDate, tz: Tz) -> Option<NaiveDate> {
    let mut candidate = date.succ_opt();
    for _ in 0..2 {
        let d = candidate?;
        if local_minute(d, tz, 12 * 60).is_some() {
            return Some(d);
        }
        candidate = d.succ_opt();
    }
    None
}

// ===================== TESTS =====================
