//! Error Types
//!
//! Failures that can occur while turning user input into a scene
//! configuration. The geometry functions themselves are infallible.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Latitude or longitude outside the valid range, or not a number.
    #[error("invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },
    /// Observer elevation outside -500..=11000 m.
    #[error("observer elevation must be between -500 and 11000 meters, got {0}")]
    InvalidElevation(f64),
    /// Panel heading or tilt outside the valid range.
    #[error("invalid panel orientation: heading {heading_deg}°, tilt {tilt_deg}°")]
    InvalidPanel { heading_deg: f64, tilt_deg: f64 },
    /// Sampling step must divide the day into at least one interval.
    #[error("sampling step must be between 1 and 1440 minutes, got {0}")]
    InvalidStep(u32),
    /// Date string could not be understood.
    #[error("invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },
    /// Time-of-day string could not be understood.
    #[error("invalid time '{0}': use HH:MM, HH:MM:SS, or HH:MM:SS.ns")]
    InvalidTime(String),
    /// The requested wall-clock time is skipped by a DST transition.
    #[error("the time {time} does not exist on {date} in {timezone} (DST gap)")]
    NonexistentLocalTime { date: String, time: String, timezone: String },
    #[error("unknown time zone '{0}'")]
    UnknownTimezone(String),
    /// Delta-T estimation or refraction setup rejected by the SPA library.
    #[error("solar position setup failed: {0}")]
    Solar(#[from] solar_positioning::Error),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
