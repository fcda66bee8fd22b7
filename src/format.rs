//! Human-readable distance and duration strings.

use crate::types::RefinedDistance;

/// `"850 m"` below one kilometre, `"3.2 km"` otherwise.
pub fn format_distance(meters: u64) -> String {
    if meters < 1000 {
        format!("{meters} m")
    } else {
        format!("{:.1} km", meters as f64 / 1000.0)
    }
}

/// `"7 mins"`, `"1 min"`, `"1 hour 5 mins"`, `"2 hours"`.
///
/// Rounds to the nearest minute, never below one.
pub fn format_duration(seconds: u64) -> String {
    let total_minutes = ((seconds + 30) / 60).max(1);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    match (hours, minutes) {
        (0, m) => plural(m, "min"),
        (h, 0) => plural(h, "hour"),
        (h, m) => format!("{} {}", plural(h, "hour"), plural(m, "min")),
    }
}

fn plural(value: u64, unit: &str) -> String {
    if value == 1 {
        format!("{value} {unit}")
    } else {
        format!("{value} {unit}s")
    }
}

/// `"<distance> (<duration>), <name>"`.
pub fn format_line(distance: &RefinedDistance, name: &str) -> String {
    format!(
        "{} ({}), {}",
        format_distance(distance.distance_meters),
        format_duration(distance.duration_seconds),
        name
    )
}
