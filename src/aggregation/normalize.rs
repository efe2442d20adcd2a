// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Unit conversion, rounding and type filtering shared by the aggregators

use crate::constants::{defaults, units};
use crate::models::Activity;

/// Round to a fixed number of decimal places, ties going to the even digit
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

/// Round to two decimal places, the output precision of every derived quantity
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

pub fn meters_to_km(meters: f64) -> f64 {
    round2(meters / units::METERS_PER_KM)
}

pub fn seconds_to_hours(seconds: f64) -> f64 {
    round2(seconds / units::SECONDS_PER_HOUR)
}

pub fn seconds_to_minutes(seconds: f64) -> f64 {
    round2(seconds / units::SECONDS_PER_MINUTE)
}

/// Average speed in km/h, present only for a positive source speed
pub fn average_speed_kmh(speed_ms: Option<f64>) -> Option<f64> {
    speed_ms
        .filter(|s| *s > 0.0)
        .map(|s| round2(s * units::MS_TO_KMH))
}

/// Pace in minutes per km, present only for a strictly positive speed
pub fn pace_min_per_km(speed_ms: Option<f64>) -> Option<f64> {
    speed_ms
        .filter(|s| *s > 0.0)
        .map(|s| round2((units::METERS_PER_KM / s) / units::SECONDS_PER_MINUTE))
}

/// Whether a type filter means "keep everything"
pub fn is_unfiltered(type_filter: &str) -> bool {
    type_filter.is_empty() || type_filter == defaults::ALL_TYPES
}

/// Keep the activities whose type tag matches exactly
pub fn filter_by_type<'a>(activities: &'a [Activity], type_filter: &str) -> Vec<&'a Activity> {
    activities
        .iter()
        .filter(|a| is_unfiltered(type_filter) || a.activity_type == type_filter)
        .collect()
}

/// Render a number the way the narrative strings expect it
///
/// Shortest round-trip form with at least one fractional digit:
/// `19.0`, `2.25`, `0.05`.
pub fn decimal_display(value: f64) -> String {
    let rendered = format!("{}", value);
    if value.is_finite() && !rendered.contains('.') && !rendered.contains('e') {
        format!("{}.0", rendered)
    } else {
        rendered
    }
}

/// Format with thousands separators and no decimals (`12,345`)
pub fn thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}", sign, grouped)
}
