//! Sunrise and Sunset Headings
//!
//! Where on the horizon the sun rises and sets, and how long it stays up.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

use crate::geo::GeoLocation;
use crate::geometry::to_compass_heading;
use crate::provider::SunPositionProvider;

/// Placeholder shown in place of a heading that does not exist today
pub const MISSING_HEADING: &str = "--";

// ===================== TYPES =====================

/// A sunrise or sunset: when it happens and the compass heading of the sun.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunEvent {
    pub time: DateTime<Tz>,
    pub heading_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaylightSummary {
    pub sunrise: Option<SunEvent>,
    pub sunset: Option<SunEvent>,
    /// Whole minutes between sunrise and sunset, 0 if either is missing
    pub daylight_minutes: i64,
}

// ===================== DERIVATION =====================

/// Sunrise/sunset events and daylight duration for a local calendar day.
///
/// During polar day or night the provider reports neither event, and the
/// summary carries `None` for both with zero daylight minutes.
pub fn daylight_summary<P: SunPositionProvider>(
    provider: &P,
    date: NaiveDate,
    tz: Tz,
    location: GeoLocation,
) -> DaylightSummary {
    let times = provider.times(date, tz, location);

    let event = |time: DateTime<Tz>| SunEvent {
        time,
        heading_deg: to_compass_heading(provider.position(time, location).azimuth_rad),
    };
    let sunrise = times.sunrise.map(event);
    let sunset = times.sunset.map(event);

    DaylightSummary { sunrise, sunset, daylight_minutes: daylight_minutes(sunrise, sunset) }
}

/// Minutes from sunrise to sunset, rounded, never negative.
pub fn daylight_minutes(sunrise: Option<SunEvent>, sunset: Option<SunEvent>) -> i64 {
    match (sunrise, sunset) {
        (Some(sr), Some(ss)) => {
            let ms = (ss.time - sr.time).num_milliseconds();
            ((ms as f64 / 60_000.0).round() as i64).max(0)
        }
        _ => 0,
    }
}

/// Render a heading with one decimal, or [`MISSING_HEADING`].
pub fn format_heading(heading_deg: Option<f64>) -> String {
    match heading_deg {
        Some(h) => format!("{:.1}°", h),
        None => MISSING_HEADING.to_string(),
    }
}

// ===================== TESTS =====================
