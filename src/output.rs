//! Output Formatting Module
//!
//! Provides formatting functions for terminal and JSON output.

use solar_house::geometry::Vec3;
use solar_house::report::{CurvePoint, DaylightReport, SceneReport};
use solar_house::time::format_minutes;

// ===================== TERMINAL OUTPUT =====================

/// Print the full scene report for a terminal.
///
/// # Arguments
/// * `report` - The evaluated scene
/// * `show_curve` - Also list every sample of the incidence sweep
/// * `show_path` - Also list the sun path points
pub fn print_report(report: &SceneReport, show_curve: bool, show_path: bool) {
    println!("Location : lat={:.6}, lon={:.6}", report.location.latitude, report.location.longitude);
    println!("Timezone : {}", report.timezone);
    println!("Date     : {}", report.date);
    println!("Time     : {}{}", report.time, if report.fixed_time { "" } else { " (now)" });
    println!();

    print_sun(report);
    println!();
    print_panel(report);
    println!();
    print_daylight(&report.daylight);
    println!();
    println!("Sun path : {} points above the horizon", report.sun_path.len());

    if show_curve && let Some(curve) = &report.curve {
        println!();
        print_curve(curve);
    }
    if show_path {
        println!();
        print_path(&report.sun_path);
    }
}

fn print_sun(report: &SceneReport) {
    let sun = &report.sun;
    println!("=== Sun ===");
    println!("  Altitude      : {:8.3}°{}", sun.altitude_deg, if sun.up { "" } else { " (below horizon)" });
    println!("  Heading       : {:8.3}°", sun.heading_deg);
    println!("  Direction     : {}", format_vec(&sun.direction));
}

fn print_panel(report: &SceneReport) {
    let panel = &report.panel;
    println!("=== Panel ===");
    println!(
        "Panel     : {:.0}° heading, {:.0}° tilt",
        panel.orientation.heading_deg, panel.orientation.tilt_deg
    );
    println!("  Normal        : {}", format_vec(&panel.normal));
    println!("  Incidence     : {:8.3}", panel.contributing_factor);
    if panel.contributing_factor != panel.incidence_factor {
        println!("  (geometric)   : {:8.3}", panel.incidence_factor);
    }
    println!("  Angle of inc. : {:8.2}°", panel.angle_of_incidence_deg);

    let peak = &report.daily_peak;
    match &peak.time {
        Some(t) => println!(
            "  Daily peak    : {:8.3} at {} ({:.2}°)",
            peak.factor,
            clock(t),
            peak.angle_of_incidence_deg
        ),
        None => println!("  Daily peak    : none (sun stays below the horizon)"),
    }
}

fn print_daylight(d: &DaylightReport) {
    println!("=== Daylight ===");
    match &d.sunrise {
        Some(e) => println!("Sunrise     : {}", clock(&e.time)),
        None => println!("Sunrise     : --"),
    }
    println!("  Heading   : {}", d.sunrise_heading);
    if let (Some(t), Some(alt)) = (&d.solar_noon, d.solar_noon_altitude_deg) {
        println!("Max Altitude: {:8.3}° at {}", alt, clock(t));
    }
    match &d.sunset {
        Some(e) => println!("Sunset      : {}", clock(&e.time)),
        None => println!("Sunset      : --"),
    }
    println!("  Heading   : {}", d.sunset_heading);

    if d.sunrise.is_none() && d.sunset.is_none() {
        match d.solar_noon_altitude_deg {
            Some(alt) if alt > 0.0 => println!("Polar Day (Midnight Sun)."),
            Some(_) => println!("Polar Night."),
            None => println!("Sun does not cross the horizon today."),
        }
        return;
    }

    println!("Daylight    : {}", format_minutes(d.daylight_minutes));
    if let Some(diff) = d.change_tomorrow_minutes {
        if diff == 0 {
            println!("Tomorrow day is same length");
        } else {
            println!(
                "Tomorrow day is {} {}",
                format_minutes(diff),
                if diff > 0 { "longer" } else { "shorter" }
            );
        }
    }
}

fn print_curve(curve: &[CurvePoint]) {
    println!("=== Incidence Curve ===");
    for p in curve.iter().filter(|p| p.sun_up) {
        println!("  {}  {:6.3}  {}", clock(&p.time), p.factor, bar(p.factor));
    }
}

fn print_path(path: &[Vec3]) {
    println!("=== Sun Path ===");
    for (i, p) in path.iter().enumerate() {
        println!("  {:3}  {}", i, format_vec(p));
    }
}

// ===================== JSON OUTPUT =====================

/// Print the report as pretty JSON.
///
/// # Errors
/// Returns an error if serialization fails
pub fn print_json(report: &SceneReport) -> solar_house::Result<()> {
    println!("{}", report.to_json()?);
    Ok(())
}

// ===================== HELPERS =====================

fn format_vec(v: &Vec3) -> String {
    format!("({:7.4}, {:7.4}, {:7.4})", v.x, v.y, v.z)
}

/// "HH:MM:SS" out of an RFC 3339 timestamp.
fn clock(rfc3339: &str) -> &str {
    rfc3339.get(11..19).unwrap_or(rfc3339)
}

fn bar(factor: f64) -> String {
    "#".repeat((factor.clamp(0.0, 1.0) * 40.0).round() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock() {
        assert_eq!(clock("2025-06-21T13:30:00-05:00"), "13:30:00");
        assert_eq!(clock("bogus"), "bogus");
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(0.0), "");
        assert_eq!(bar(1.0).len(), 40);
        assert_eq!(bar(0.5).len(), 20);
    }
}
