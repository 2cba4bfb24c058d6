//! Geographic Module
//!
//! Observer location plus the WGS84 Earth radius and horizon dip used to
//! lower the sunrise/sunset target for elevated observers.

use serde::Serialize;

use crate::error::{Error, Result};

// ===================== CONSTANTS =====================

/// WGS84 semi-major axis (equatorial radius) in meters
pub const A_EQUATOR: f64 = 6_378_137.0;

/// WGS84 semi-minor axis (polar radius) in meters
pub const B_POLAR: f64 = 6_356_752.314245;

/// Solar apparent radius in degrees (angular semi-diameter)
pub const SOLAR_RADIUS_DEG: f64 = 0.266;

// ===================== LOCATION =====================

/// Observer position on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    /// Lawrence, Kansas.
    pub const LAWRENCE_KS: GeoLocation = GeoLocation { latitude: 38.9631672, longitude: -95.2422898 };

    /// Build a location, rejecting coordinates outside [-90, 90] x [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidLocation { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }
}

// ===================== GEOMETRY FUNCTIONS =====================

/// Calculate Earth radius at a given latitude using WGS84 ellipsoid model.
///
/// # Arguments
/// * `lat_deg` - Latitude in degrees (-90 to 90)
///
/// # Returns
/// Earth radius in meters at the specified latitude
pub fn earth_radius_wgs84(lat_deg: f64) -> f64 {
    let (sin, cos) = lat_deg.to_radians().sin_cos();
    let a2 = A_EQUATOR * A_EQUATOR;
    let b2 = B_POLAR * B_POLAR;
    let numerator = a2 * a2 * cos * cos + b2 * b2 * sin * sin;
    let denominator = (A_EQUATOR * cos).powi(2) + (B_POLAR * sin).powi(2);
    (numerator / denominator).sqrt()
}

/// Calculate horizon dip angle due to observer altitude.
///
/// Positive altitude gives a positive dip (apparent horizon below the
/// geometric one); a site below sea level gives a negative dip.
///
/// # Arguments
/// * `lat_deg` - Observer latitude in degrees
/// * `h` - Observer altitude in meters (can be negative)
///
/// # Returns
/// Horizon dip angle in degrees
pub fn horizon_dip_deg(lat_deg: f64, h: f64) -> f64 {
    if h.abs() < 1e-5 {
        return 0.0;
    }
    let r = earth_radius_wgs84(lat_deg);
    let ratio = (r / (r + h.abs())).clamp(-1.0, 1.0);
    let dip = ratio.acos().to_degrees();
    if h > 0.0 { dip } else { -dip }
}

// ===================== TESTS =====================
