//! Solar geometry and panel incidence for a house scene.
//!
//! Given a location, a date and a time of day, the engine answers where the
//! sun is (as a scene-space direction and a compass heading), how squarely it
//! hits a fixed solar panel, when the panel sees it best during the day, and
//! where on the horizon it rises and sets.

pub mod config;
pub mod error;
pub mod geo;
pub mod geometry;
pub mod incidence;
pub mod provider;
pub mod report;
pub mod sun_events;
pub mod sun_path;
pub mod time;

pub use config::{SceneConfig, TimeSelection};
pub use error::{Error, Result};
pub use geo::GeoLocation;
pub use geometry::{Vec3, normalize_degrees, to_compass_heading, to_direction_vector};
pub use incidence::{DailyPeak, PanelOrientation, daily_peak_incidence, incidence_factor};
pub use provider::{Atmosphere, SpaProvider, SunPosition, SunPositionProvider};
pub use report::SceneReport;
pub use sun_path::build_sun_path_samples;
