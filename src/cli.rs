//! Command-Line Interface Module
//!
//! Handles argument parsing and validation for the solar-house application.

use chrono::{DateTime, Utc};
use clap::Parser;

use solar_house::config::{
    MAX_ELEVATION_M, MIN_ELEVATION_M, SceneConfig, parse_date, parse_time_selection,
    select_timezone,
};
use solar_house::geo::GeoLocation;
use solar_house::incidence::{DEFAULT_PEAK_STEP_MINUTES, PanelOrientation};
use solar_house::provider::{Atmosphere, STANDARD_PRESSURE_HPA};
use solar_house::sun_path::DEFAULT_PATH_STEP_MINUTES;
use solar_house::time::MINUTES_PER_DAY;

// ===================== CLI =====================

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Observer latitude in decimal degrees (-90 to 90)
    #[arg(long, default_value_t = GeoLocation::LAWRENCE_KS.latitude, allow_hyphen_values = true,
          value_parser = parse_latitude, env = "SOLAR_HOUSE_LATITUDE")]
    pub latitude: f64,
    /// Observer longitude in decimal degrees (-180 to 180)
    #[arg(long, default_value_t = GeoLocation::LAWRENCE_KS.longitude, allow_hyphen_values = true,
          value_parser = parse_longitude, env = "SOLAR_HOUSE_LONGITUDE")]
    pub longitude: f64,
    /// Time zone to use ("system", "location", or IANA time zone name)
    #[arg(long, default_value = "system", env = "SOLAR_HOUSE_TIMEZONE")]
    pub timezone: String,
    /// Use UTC time zone
    #[arg(long)]
    pub utc: bool,

    /// Date for calculations (e.g., "2024-12-25" or "tomorrow"); defaults to today
    #[arg(long)]
    pub date: Option<String>,
    /// Evaluate the scene at a specific time (HH:MM[:SS[.fffffffff]] or "now")
    #[arg(long)]
    pub at: Option<String>,

    /// Observer altitude above mean sea level (meters, may be negative)
    /// Valid range: -500m (Dead Sea) to 11000m (Troposphere limit for ISA formula)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true, value_parser = parse_altitude,
          env = "SOLAR_HOUSE_ALTITUDE")]
    pub altitude: f64,
    /// Refraction and horizon model
    #[arg(long, default_value = "standard", value_parser = ["standard", "geometric", "physical"],
          env = "SOLAR_HOUSE_MODEL")]
    pub model: String,
    /// Ambient temperature in °C for refraction correction (physical model only)
    #[arg(long, default_value_t = 15.0, allow_hyphen_values = true)]
    pub temperature: f64,
    /// Atmospheric pressure in hPa for refraction correction (physical model only)
    /// Left at 1013.25, it is derived from --altitude instead
    #[arg(long, default_value_t = STANDARD_PRESSURE_HPA, value_parser = parse_pressure)]
    pub pressure: f64,

    // ===================== PANEL OPTIONS =====================
    /// Compass heading the panel faces (0 = north, 90 = east, 180 = south)
    #[arg(long, default_value_t = 155.0, value_parser = parse_heading,
          env = "SOLAR_HOUSE_PANEL_HEADING")]
    pub panel_heading: f64,
    /// Panel tilt angle in degrees (0 = flat/horizontal, 90 = vertical)
    #[arg(long, default_value_t = 24.0, value_parser = parse_tilt, env = "SOLAR_HOUSE_PANEL_TILT")]
    pub panel_tilt: f64,

    // ===================== SAMPLING OPTIONS =====================
    /// Minutes between samples of the daily peak search
    #[arg(long, default_value_t = DEFAULT_PEAK_STEP_MINUTES, value_parser = parse_step)]
    pub peak_step: u32,
    /// Minutes between points of the sun path
    #[arg(long, default_value_t = DEFAULT_PATH_STEP_MINUTES, value_parser = parse_step)]
    pub path_step: u32,

    // ===================== OUTPUT OPTIONS =====================
    /// List every sample of the daily incidence sweep
    #[arg(long)]
    pub curve: bool,
    /// List the sun path points
    #[arg(long)]
    pub path: bool,
    /// Print the report as JSON
    #[arg(long, env = "SOLAR_HOUSE_JSON")]
    pub json: bool,
    /// Refresh the "now" scene every N seconds
    #[arg(long, value_name = "SECONDS", value_parser = parse_interval, conflicts_with = "at")]
    pub watch: Option<u64>,
}

impl Args {
    /// Build the scene configuration for the current instant.
    ///
    /// Called again on every refresh so that "today" and the clock time
    /// advance.
    pub fn scene_config(&self, now: DateTime<Utc>) -> solar_house::Result<SceneConfig> {
        let location = GeoLocation::new(self.latitude, self.longitude)?;
        let tz = select_timezone(&self.timezone, self.utc, location)?;
        let date = parse_date(self.date.as_deref(), tz, now)?;
        let time = parse_time_selection(self.at.as_deref())?;
        let panel = PanelOrientation::new(self.panel_heading, self.panel_tilt)?;

        let atmosphere = match self.model.as_str() {
            "geometric" => Atmosphere::Geometric,
            "physical" => Atmosphere::Physical {
                pressure_hpa: self.pressure,
                temperature_c: self.temperature,
            },
            _ => Atmosphere::Standard,
        };

        let config = SceneConfig::new(location, tz, date)
            .with_time(time)
            .with_panel(panel)
            .with_elevation(self.altitude)
            .with_atmosphere(atmosphere)
            .with_steps(self.peak_step, self.path_step);
        config.validate()?;
        Ok(config)
    }
}

// ===================== CLI VALUE PARSERS =====================

fn parse_latitude(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(-90.0..=90.0).contains(&v) {
        return Err(format!("Latitude must be between -90 and 90, got {}", v));
    }
    Ok(v)
}

fn parse_longitude(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(-180.0..=180.0).contains(&v) {
        return Err(format!("Longitude must be between -180 and 180, got {}", v));
    }
    Ok(v)
}

fn parse_altitude(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(MIN_ELEVATION_M..=MAX_ELEVATION_M).contains(&v) {
        return Err(format!("Altitude must be between -500 and 11000 meters, got {}", v));
    }
    Ok(v)
}

fn parse_pressure(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if v <= 0.0 {
        return Err(format!("Pressure must be positive, got {}", v));
    }
    Ok(v)
}

fn parse_heading(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(0.0..=360.0).contains(&v) {
        return Err(format!("Heading must be between 0 and 360 degrees, got {}", v));
    }
    Ok(v)
}

fn parse_tilt(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(0.0..=90.0).contains(&v) {
        return Err(format!("Tilt must be between 0 and 90 degrees, got {}", v));
    }
    Ok(v)
}

fn parse_step(s: &str) -> Result<u32, String> {
    let v: u32 = s.parse().map_err(|_| format!("Invalid integer: {}", s))?;
    if !(1..=MINUTES_PER_DAY).contains(&v) {
        return Err(format!("Step must be between 1 and 1440 minutes, got {}", v));
    }
    Ok(v)
}

fn parse_interval(s: &str) -> Result<u64, String> {
    let v: u64 = s.parse().map_err(|_| format!("Invalid integer: {}", s))?;
    if v == 0 {
        return Err("Refresh interval must be at least 1 second".to_string());
    }
    Ok(v)
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use solar_house::TimeSelection;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("solar-house").chain(args.iter().copied()))
    }

    #[test]
    fn test_value_parsers() {
        assert!(parse_latitude("-91").is_err());
        assert_eq!(parse_latitude("-33.9").unwrap(), -33.9);
        assert!(parse_longitude("181").is_err());
        assert!(parse_altitude("11001").is_err());
        assert!(parse_tilt("90.5").is_err());
        assert!(parse_heading("-1").is_err());
        assert!(parse_step("0").is_err());
        assert!(parse_step("1441").is_err());
        assert_eq!(parse_step("15").unwrap(), 15);
        assert!(parse_interval("0").is_err());
    }

    #[test]
    fn test_scene_from_flags() {
        let args = parse(&[
            "--latitude", "59.91", "--longitude", "10.75", "--timezone", "Europe/Oslo",
            "--date", "2025-06-21", "--at", "12:00", "--panel-heading", "180",
            "--panel-tilt", "45", "--model", "geometric",
        ])
        .unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let cfg = args.scene_config(now).unwrap();

        assert_eq!(cfg.timezone, chrono_tz::Europe::Oslo);
        assert_eq!(cfg.date, NaiveDate::from_ymd_opt(2025, 6, 21).unwrap());
        assert!(matches!(cfg.time, TimeSelection::Fixed(_)));
        assert_eq!(cfg.panel, PanelOrientation { heading_deg: 180.0, tilt_deg: 45.0 });
        assert_eq!(cfg.atmosphere, Atmosphere::Geometric);
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let args = parse(&["--utc", "--date", "blursday"]).unwrap();
        assert!(args.scene_config(Utc::now()).is_err());
    }

    #[test]
    fn test_watch_conflicts_with_at() {
        assert!(parse(&["--watch", "30", "--at", "12:00"]).is_err());
        assert!(parse(&["--watch", "30"]).is_ok());
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        assert!(parse(&["--model", "noaa"]).is_err());
    }
}
