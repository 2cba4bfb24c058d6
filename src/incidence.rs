//! Panel Incidence Module
//!
//! Cosine-of-incidence between a fixed solar panel and the sun, and the
//! stepped full-day sweep that finds the daily peak.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::geo::GeoLocation;
use crate::geometry::{Vec3, deg_to_rad, rad_to_deg, to_direction_vector};
use crate::provider::{SunPosition, SunPositionProvider};
use crate::time::{day_minutes, local_minute};

/// Sampling step of the daily peak search, in minutes
pub const DEFAULT_PEAK_STEP_MINUTES: u32 = 5;

// ===================== PANEL =====================

/// Fixed panel orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanelOrientation {
    /// Compass heading the panel faces (0 = north, clockwise)
    pub heading_deg: f64,
    /// Angle from horizontal (0 = flat, 90 = vertical)
    pub tilt_deg: f64,
}

impl Default for PanelOrientation {
    fn default() -> Self {
        Self { heading_deg: 155.0, tilt_deg: 24.0 }
    }
}

impl PanelOrientation {
    pub fn new(heading_deg: f64, tilt_deg: f64) -> Result<Self> {
        if !(0.0..=360.0).contains(&heading_deg) || !(0.0..=90.0).contains(&tilt_deg) {
            return Err(Error::InvalidPanel { heading_deg, tilt_deg });
        }
        Ok(Self { heading_deg, tilt_deg })
    }
}

/// Unit normal of the panel surface in scene space.
///
/// Tilt 0 points straight up; tilt 90 points horizontally toward the
/// configured heading.
pub fn panel_normal(orientation: &PanelOrientation) -> Vec3 {
    let heading = deg_to_rad(orientation.heading_deg - 90.0);
    let horizontal = Vec3::new(heading.cos(), 0.0, heading.sin());
    let (sin_tilt, cos_tilt) = deg_to_rad(orientation.tilt_deg).sin_cos();
    Vec3::UP.scale(cos_tilt).add(horizontal.scale(sin_tilt)).normalized()
}

// ===================== INCIDENCE =====================

/// Cosine of the angle of incidence, clamped to [0, 1].
///
/// This is the plain geometric factor: a sun just below the horizon can
/// still give a small positive value on a steep panel. Use
/// [`contributing_incidence`] when the sun has to be up.
pub fn incidence_factor(sun: &SunPosition, orientation: &PanelOrientation) -> f64 {
    let dot = panel_normal(orientation).dot(to_direction_vector(sun));
    dot.clamp(0.0, 1.0)
}

/// Incidence factor gated on the sun being above the horizon.
pub fn contributing_incidence(sun: &SunPosition, orientation: &PanelOrientation) -> f64 {
    if sun.is_up() { incidence_factor(sun, orientation) } else { 0.0 }
}

/// Angle of incidence in degrees for an incidence factor.
pub fn angle_of_incidence_deg(factor: f64) -> f64 {
    rad_to_deg(factor.clamp(0.0, 1.0).acos())
}

// ===================== DAILY SWEEP =====================

/// Incidence at one instant of a daily sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncidenceSample {
    pub time: DateTime<Tz>,
    pub factor: f64,
    pub sun_up: bool,
}

/// Best incidence of a day. `time` is `None` when nothing beat zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyPeak {
    pub factor: f64,
    pub time: Option<DateTime<Tz>>,
}

impl DailyPeak {
    pub const NONE: DailyPeak = DailyPeak { factor: 0.0, time: None };
}

/// Sample the panel incidence across a local calendar day.
///
/// Minutes 0 through 1440 (inclusive) are visited in `step_minutes` steps.
/// While the sun is at or below the horizon the sample factor is 0.
///
/// # Errors
/// `Error::InvalidStep` when `step_minutes` is 0 or longer than a day
pub fn daily_incidence_curve<P: SunPositionProvider>(
    provider: &P,
    date: NaiveDate,
    tz: Tz,
    location: GeoLocation,
    orientation: &PanelOrientation,
    step_minutes: u32,
) -> Result<Vec<IncidenceSample>> {
    let samples: Vec<IncidenceSample> = day_minutes(step_minutes)?
        .filter_map(|minute| local_minute(date, tz, minute))
        .map(|time| {
            let sun = provider.position(time, location);
            IncidenceSample {
                time,
                factor: contributing_incidence(&sun, orientation),
                sun_up: sun.is_up(),
            }
        })
        .collect();

    log::debug!("{} incidence samples for {} at {}-minute steps", samples.len(), date, step_minutes);
    Ok(samples)
}

/// Fold a sweep into its peak.
///
/// Samples with the sun down are skipped. A later sample only replaces the
/// running best when strictly greater, so the earliest time wins ties.
pub fn peak_of(samples: &[IncidenceSample]) -> DailyPeak {
    samples.iter().filter(|s| s.sun_up).fold(DailyPeak::NONE, |best, s| {
        if s.factor > best.factor { DailyPeak { factor: s.factor, time: Some(s.time) } } else { best }
    })
}

/// Highest panel incidence of the day, found by a stepped sweep.
///
/// This is a discrete search: the result is the best sampled instant, not
/// the continuous optimum.
///
/// # Returns
/// `DailyPeak::NONE` when the sun never rises above the horizon
pub fn daily_peak_incidence<P: SunPositionProvider>(
    provider: &P,
    date: NaiveDate,
    tz: Tz,
    location: GeoLocation,
    orientation: &PanelOrientation,
    step_minutes: u32,
) -> Result<DailyPeak> {
    let curve = daily_incidence_curve(provider, date, tz, location, orientation, step_minutes)?;
    Ok(peak_of(&curve))
}

// ===================== TESTS =====================
