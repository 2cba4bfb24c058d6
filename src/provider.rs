//! Sun Position Provider Module
//!
//! The engine asks a [`SunPositionProvider`] where the sun is and when it
//! rises and sets. [`SpaProvider`] answers with the NREL SPA (Solar Position
//! Algorithm) and finds sunrise/sunset by bisection around solar transit.

use std::f64::consts::FRAC_PI_2;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::Serialize;
use solar_positioning::{
    Horizon, spa,
    time::DeltaT,
    types::{RefractionCorrection, SunriseResult},
};

use crate::error::Result;
use crate::geo::{GeoLocation, SOLAR_RADIUS_DEG, horizon_dip_deg};
use crate::time::resolve_local;

// ===================== TYPES =====================

/// Sun position in provider convention.
///
/// Azimuth is measured from south and increases westward; altitude is
/// positive above the horizon. Both in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunPosition {
    pub azimuth_rad: f64,
    pub altitude_rad: f64,
}

impl SunPosition {
    pub fn is_up(&self) -> bool {
        self.altitude_rad > 0.0
    }

    /// Convert from a north-based, clockwise azimuth and an elevation angle,
    /// both in degrees.
    pub fn from_north_azimuth_deg(azimuth_deg: f64, elevation_deg: f64) -> Self {
        Self {
            azimuth_rad: (azimuth_deg - 180.0).to_radians(),
            altitude_rad: elevation_deg.to_radians(),
        }
    }
}

/// Daily sun times. Sunrise and sunset are `None` during polar day or night.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTimes {
    pub sunrise: Option<DateTime<Tz>>,
    pub sunset: Option<DateTime<Tz>>,
    pub solar_noon: Option<DateTime<Tz>>,
}

/// Source of sun positions and daily sun times.
pub trait SunPositionProvider {
    /// Sun position at an instant, seen from `location`.
    fn position(&self, at: DateTime<Tz>, location: GeoLocation) -> SunPosition;

    /// Sunrise, sunset and solar noon for a local calendar day.
    fn times(&self, date: NaiveDate, tz: Tz, location: GeoLocation) -> SunTimes;
}

// ===================== ATMOSPHERE =====================

/// How refraction and the observer's horizon are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Atmosphere {
    /// Standard refraction, sunrise target lowered by the horizon dip
    #[default]
    Standard,
    /// Standard refraction, geometric horizon
    Geometric,
    /// Refraction from local pressure (hPa) and temperature (°C), with dip
    Physical { pressure_hpa: f64, temperature_c: f64 },
}

/// Sea-level standard pressure in hPa
pub const STANDARD_PRESSURE_HPA: f64 = 1013.25;

/// ISA barometric pressure at `altitude_m`.
pub fn isa_pressure_hpa(altitude_m: f64) -> f64 {
    STANDARD_PRESSURE_HPA * (1.0 - 2.25577e-5 * altitude_m).powf(5.25588)
}

// ===================== SPA PROVIDER =====================

/// SPA-backed provider for one observer elevation and epoch.
#[derive(Clone, Copy)]
pub struct SpaProvider {
    /// Observer altitude in meters
    pub elevation_m: f64,
    /// Delta-T correction for TT-UT1 difference
    pub delta_t: f64,
    /// Atmospheric refraction correction
    pub refr: Option<RefractionCorrection>,
    /// Horizon dip in degrees subtracted from the sunrise target
    pub dip_deg: f64,
}

impl SpaProvider {
    /// Build a provider whose Delta-T is estimated for `date`.
    ///
    /// # Errors
    /// Fails if Delta-T cannot be estimated for the year, or if the physical
    /// refraction parameters are rejected.
    pub fn for_date(
        date: NaiveDate,
        location: GeoLocation,
        elevation_m: f64,
        atmosphere: Atmosphere,
    ) -> Result<Self> {
        let delta_t = DeltaT::estimate_from_date(date.year(), date.month())?;
        let dip = horizon_dip_deg(location.latitude, elevation_m);

        let (refr, dip_deg) = match atmosphere {
            Atmosphere::Standard => (Some(RefractionCorrection::standard()), dip),
            Atmosphere::Geometric => (Some(RefractionCorrection::standard()), 0.0),
            Atmosphere::Physical { pressure_hpa, temperature_c } => {
                // Unchanged default pressure means "derive it from the elevation"
                let pressure = if (pressure_hpa - STANDARD_PRESSURE_HPA).abs() > f64::EPSILON {
                    pressure_hpa
                } else {
                    isa_pressure_hpa(elevation_m)
                };
                (Some(RefractionCorrection::new(pressure, temperature_c)?), dip)
            }
        };

        log::debug!(
            "SPA provider for {}: delta_t={:.2}s, elevation={}m, dip={:.3}°",
            date,
            delta_t,
            elevation_m,
            dip_deg
        );

        Ok(Self { elevation_m, delta_t, refr, dip_deg })
    }

    /// Sun elevation (degrees) that counts as sunrise/sunset.
    pub fn target_elevation_deg(&self) -> f64 {
        -SOLAR_RADIUS_DEG - self.dip_deg
    }

    fn spa_position(
        &self,
        t: DateTime<Tz>,
        location: GeoLocation,
    ) -> Option<solar_positioning::SolarPosition> {
        match spa::solar_position(
            t,
            location.latitude,
            location.longitude,
            self.elevation_m,
            self.delta_t,
            self.refr,
        ) {
            Ok(pos) => Some(pos),
            Err(err) => {
                log::error!("SPA rejected {} at {:?}: {}", t, location, err);
                None
            }
        }
    }

    /// Elevation minus target at a given time.
    fn elevation_error(&self, t: DateTime<Tz>, location: GeoLocation) -> f64 {
        self.spa_position(t, location)
            .map_or(f64::NAN, |p| p.elevation_angle() - self.target_elevation_deg())
    }

    /// Solve for the time when the sun crosses the target elevation using
    /// bisection.
    ///
    /// # Arguments
    /// * `a` - Start of search interval
    /// * `b` - End of search interval
    ///
    /// # Returns
    /// The crossing time, or None if the sun does not cross inside `[a, b]`
    pub fn solve_root(
        &self,
        mut a: DateTime<Tz>,
        mut b: DateTime<Tz>,
        location: GeoLocation,
    ) -> Option<DateTime<Tz>> {
        let mut fa = self.elevation_error(a, location);
        let fb = self.elevation_error(b, location);

        // Guard against NaN from invalid inputs
        if !fa.is_finite() || !fb.is_finite() {
            return None;
        }

        if fa.signum() == fb.signum() {
            return None;
        }

        for _ in 0..60 {
            let m = a + (b - a) / 2;
            let fm = self.elevation_error(m, location);

            if !fm.is_finite() {
                return None;
            }

            if fm.abs() < 1e-7 {
                return Some(m);
            }

            if fm.signum() == fa.signum() {
                a = m;
                fa = fm;
            } else {
                b = m;
            }
        }

        Some(a)
    }

    /// Solar transit for the local calendar day, anchored at local noon.
    pub fn transit(&self, date: NaiveDate, tz: Tz, location: GeoLocation) -> Option<DateTime<Tz>> {
        let anchor = resolve_local(tz, date.and_time(NaiveTime::from_hms_opt(12, 0, 0)?))?;
        let res = spa::sunrise_sunset_for_horizon(
            anchor,
            location.latitude,
            location.longitude,
            self.delta_t,
            Horizon::SunriseSunset,
        )
        .ok()?;

        Some(match res {
            SunriseResult::RegularDay { transit, .. } => transit,
            SunriseResult::AllDay { transit } => transit,
            SunriseResult::AllNight { transit } => transit,
        })
    }
}

impl SunPositionProvider for SpaProvider {
    fn position(&self, at: DateTime<Tz>, location: GeoLocation) -> SunPosition {
        match self.spa_position(at, location) {
            Some(pos) => SunPosition::from_north_azimuth_deg(pos.azimuth(), pos.elevation_angle()),
            // Only reachable with unvalidated coordinates; treat as night
            None => SunPosition { azimuth_rad: 0.0, altitude_rad: -FRAC_PI_2 },
        }
    }

    fn times(&self, date: NaiveDate, tz: Tz, location: GeoLocation) -> SunTimes {
        let Some(noon) = self.transit(date, tz, location) else {
            return SunTimes { sunrise: None, sunset: None, solar_noon: None };
        };

        let span = Duration::hours(12);
        let sunrise = self.solve_root(noon - span, noon, location);
        let sunset = self.solve_root(noon, noon + span, location);
        log::debug!("{}: sunrise {:?}, noon {}, sunset {:?}", date, sunrise, noon, sunset);

        SunTimes { sunrise, sunset, solar_noon: Some(noon) }
    }
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::America::Chicago;
    use chrono_tz::Europe::Oslo;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn provider(d: NaiveDate, loc: GeoLocation) -> SpaProvider {
        SpaProvider::for_date(d, loc, 0.0, Atmosphere::Standard).unwrap()
    }

    #[test]
    fn test_north_azimuth_conversion() {
        let east = SunPosition::from_north_azimuth_deg(90.0, 10.0);
        assert!((east.azimuth_rad + FRAC_PI_2).abs() < 1e-12);
        assert!(east.is_up());

        let south = SunPosition::from_north_azimuth_deg(180.0, -1.0);
        assert!(south.azimuth_rad.abs() < 1e-12);
        assert!(!south.is_up());
    }

    #[test]
    fn test_lawrence_noon_sun_is_due_south_and_high() {
        let loc = GeoLocation::LAWRENCE_KS;
        let d = date(2025, 6, 21);
        let spa = provider(d, loc);

        let noon = spa.transit(d, Chicago, loc).unwrap();
        // Longitude -95.24 puts transit around 13:20 CDT
        assert_eq!(noon.hour(), 13, "transit at {}", noon);

        let pos = spa.position(noon, loc);
        assert!(pos.azimuth_rad.abs() < 0.01, "azimuth {}", pos.azimuth_rad);
        let alt_deg = pos.altitude_rad.to_degrees();
        assert!(alt_deg > 73.0 && alt_deg < 76.0, "altitude {}", alt_deg);
    }

    #[test]
    fn test_lawrence_sunrise_sunset() {
        let loc = GeoLocation::LAWRENCE_KS;
        let d = date(2025, 6, 21);
        let times = provider(d, loc).times(d, Chicago, loc);

        let sunrise = times.sunrise.unwrap();
        let sunset = times.sunset.unwrap();
        // Roughly 05:55 and 20:50 CDT
        assert_eq!(sunrise.hour(), 5, "sunrise {}", sunrise);
        assert_eq!(sunset.hour(), 20, "sunset {}", sunset);
        assert!(sunrise < times.solar_noon.unwrap() && times.solar_noon.unwrap() < sunset);
    }

    #[test]
    fn test_polar_night_has_no_sun_times() {
        let loc = GeoLocation::new(78.22, 15.65).unwrap();
        let d = date(2025, 12, 21);
        let times = provider(d, loc).times(d, Oslo, loc);
        assert!(times.sunrise.is_none() && times.sunset.is_none());
    }

    #[test]
    fn test_polar_day_has_no_sun_times() {
        let loc = GeoLocation::new(78.22, 15.65).unwrap();
        let d = date(2025, 6, 21);
        let times = provider(d, loc).times(d, Oslo, loc);
        assert!(times.sunrise.is_none() && times.sunset.is_none());
    }

    #[test]
    fn test_elevated_observer_sees_earlier_sunrise() {
        let loc = GeoLocation::LAWRENCE_KS;
        let d = date(2025, 3, 20);
        let low = SpaProvider::for_date(d, loc, 0.0, Atmosphere::Standard).unwrap();
        let high = SpaProvider::for_date(d, loc, 2000.0, Atmosphere::Standard).unwrap();

        let sr_low = low.times(d, Chicago, loc).sunrise.unwrap();
        let sr_high = high.times(d, Chicago, loc).sunrise.unwrap();
        assert!(sr_high < sr_low, "{} should be before {}", sr_high, sr_low);

        // Geometric horizon ignores the dip
        let geo = SpaProvider::for_date(d, loc, 2000.0, Atmosphere::Geometric).unwrap();
        let sr_geo = geo.times(d, Chicago, loc).sunrise.unwrap();
        assert!((sr_geo - sr_low).num_seconds().abs() < 120);
    }

    #[test]
    fn test_physical_atmosphere_defaults_pressure_from_elevation() {
        let loc = GeoLocation::LAWRENCE_KS;
        let atm = Atmosphere::Physical { pressure_hpa: STANDARD_PRESSURE_HPA, temperature_c: 15.0 };
        assert!(SpaProvider::for_date(date(2025, 6, 21), loc, 1500.0, atm).is_ok());
        assert!(isa_pressure_hpa(1500.0) < 860.0 && isa_pressure_hpa(1500.0) > 840.0);
    }
}
