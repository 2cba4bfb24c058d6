//! Sun Path Module
//!
//! The arc the sun traces across the sky over one day, as scene-space unit
//! vectors.

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::error::Result;
use crate::geo::GeoLocation;
use crate::geometry::{Vec3, to_direction_vector};
use crate::provider::SunPositionProvider;
use crate::time::{day_minutes, local_minute};

/// Sampling step of the sun path, in minutes
pub const DEFAULT_PATH_STEP_MINUTES: u32 = 10;

/// Sample the sun's direction over a local calendar day.
///
/// Uses the same minute sweep as the daily peak search. Samples with the sun
/// at or below the horizon are dropped and nothing is interpolated across
/// the gap, so a day whose altitude crosses zero more than twice yields a
/// polyline with jumps. Polar night yields an empty path.
///
/// # Errors
/// `Error::InvalidStep` when `step_minutes` is 0 or longer than a day
pub fn build_sun_path_samples<P: SunPositionProvider>(
    provider: &P,
    date: NaiveDate,
    tz: Tz,
    location: GeoLocation,
    step_minutes: u32,
) -> Result<Vec<Vec3>> {
    let points: Vec<Vec3> = day_minutes(step_minutes)?
        .filter_map(|minute| local_minute(date, tz, minute))
        .map(|time| provider.position(time, location))
        .filter(|sun| sun.is_up())
        .map(|sun| to_direction_vector(&sun))
        .collect();

    log::debug!("sun path for {}: {} points above the horizon", date, points.len());
    Ok(points)
}

// ===================== TESTS =====================
