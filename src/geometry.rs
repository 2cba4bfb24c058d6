//! Scene Geometry Module
//!
//! Converts sun positions into scene-space direction vectors and compass
//! headings. The scene is right-handed with the ground in the XZ plane and
//! Y pointing up.

use serde::Serialize;
use std::f64::consts::FRAC_PI_2;

use crate::provider::SunPosition;

// ===================== VECTOR =====================

/// A 3D vector in scene space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn scale(self, s: f64) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Unit vector in the same direction.
    ///
    /// A zero-length vector is returned unchanged.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > 0.0 { self.scale(1.0 / len) } else { self }
    }
}

// ===================== ANGLES =====================

pub fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad.to_degrees()
}

/// Wrap an angle in degrees into [0, 360).
///
/// Defined for negative inputs as well: `-90` maps to `270`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // A tiny negative input rounds up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

// ===================== CONVERSIONS =====================

/// Convert a sun position into a unit direction vector pointing at the sun.
///
/// The provider azimuth (south = 0, west positive) is rotated by +90° first,
/// so that azimuth 0 of the rotated frame lies on +X (east) and south on +Z.
///
/// # Arguments
/// * `sun` - Sun position in provider convention
///
/// # Returns
/// Unit vector; `y` is the sine of the altitude
pub fn to_direction_vector(sun: &SunPosition) -> Vec3 {
    let azimuth = sun.azimuth_rad + FRAC_PI_2;
    let (sin_alt, cos_alt) = sun.altitude_rad.sin_cos();
    Vec3::new(azimuth.cos() * cos_alt, sin_alt, azimuth.sin() * cos_alt)
}

/// Convert a provider azimuth (radians from south, west positive) into a
/// compass heading in degrees (0 = north, clockwise).
pub fn to_compass_heading(azimuth_rad: f64) -> f64 {
    normalize_degrees(rad_to_deg(azimuth_rad) + 180.0)
}

// ===================== TESTS =====================
