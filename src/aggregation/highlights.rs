// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ranked highlight lists and calendar drill-down projections

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use super::calendar::day_label;
use super::normalize::{
    average_speed_kmh, filter_by_type, meters_to_km, pace_min_per_km, round2, seconds_to_minutes,
};
use crate::config::HighlightRules;
use crate::constants::{strava, units};
use crate::models::{Activity, DateSource};

/// A single activity projected for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityHighlight {
    pub id: i64,
    pub name: String,
    pub date: String,
    pub distance_km: f64,
    pub elevation_m: f64,
    pub moving_time_minutes: f64,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub strava_url: String,
    pub average_speed_kmh: Option<f64>,
    pub pace_min_per_km: Option<f64>,
}

impl From<&Activity> for ActivityHighlight {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id,
            name: activity.name.clone(),
            date: day_label(activity.date()),
            distance_km: meters_to_km(activity.distance_m),
            elevation_m: round2(activity.elevation_gain_m),
            moving_time_minutes: seconds_to_minutes(activity.moving_time_s),
            activity_type: activity.activity_type.clone(),
            strava_url: strava::activity_url(activity.id),
            average_speed_kmh: average_speed_kmh(activity.average_speed),
            pace_min_per_km: pace_min_per_km(activity.average_speed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightSet {
    pub longest_activities: Vec<ActivityHighlight>,
    pub biggest_climbs: Vec<ActivityHighlight>,
    pub fastest_runs: Vec<ActivityHighlight>,
    pub fastest_rides: Vec<ActivityHighlight>,
    pub activity_type: String,
}

/// Rank the activities matching `type_filter` into four lists of at most
/// `top_n` entries
///
/// All sorts are stable: activities with equal keys keep their input order.
pub fn highlights(
    activities: &[Activity],
    top_n: usize,
    type_filter: &str,
    rules: &HighlightRules,
) -> HighlightSet {
    let filtered = filter_by_type(activities, type_filter);

    let longest = ranked(&filtered, top_n, |a, b| descending(a.distance_m, b.distance_m));
    let climbs = ranked(&filtered, top_n, |a, b| {
        descending(a.elevation_gain_m, b.elevation_gain_m)
    });

    let runs: Vec<&Activity> = filtered
        .iter()
        .copied()
        .filter(|a| a.activity_type == rules.run_type && a.distance_m > rules.run_min_distance_m)
        .collect();
    // Seconds per metre, smaller is faster
    let fastest_runs = ranked(&runs, top_n, |a, b| {
        run_pace(a).total_cmp(&run_pace(b))
    });

    let rides: Vec<&Activity> = filtered
        .iter()
        .copied()
        .filter(|a| a.activity_type == rules.ride_type && a.distance_m > rules.ride_min_distance_m)
        .collect();
    let fastest_rides = ranked(&rides, top_n, |a, b| {
        descending(ride_speed(a, rules), ride_speed(b, rules))
    });

    debug!(
        activities = filtered.len(),
        runs = runs.len(),
        rides = rides.len(),
        top_n,
        "Computed highlights"
    );

    HighlightSet {
        longest_activities: longest,
        biggest_climbs: climbs,
        fastest_runs,
        fastest_rides,
        activity_type: type_filter.to_string(),
    }
}

/// Activities started on `date`
///
/// Activities whose start time could not be resolved are never placed on a
/// calendar day.
pub fn activities_on_day(
    activities: &[Activity],
    date: NaiveDate,
    type_filter: &str,
) -> Vec<ActivityHighlight> {
    activities_in_period(activities, date, date, type_filter)
}

/// Activities started between `start` and `end`, both inclusive
pub fn activities_in_period(
    activities: &[Activity],
    start: NaiveDate,
    end: NaiveDate,
    type_filter: &str,
) -> Vec<ActivityHighlight> {
    filter_by_type(activities, type_filter)
        .into_iter()
        .filter(|a| a.date_source != DateSource::Fallback)
        .filter(|a| (start..=end).contains(&a.date()))
        .map(ActivityHighlight::from)
        .collect()
}

fn ranked<F>(activities: &[&Activity], top_n: usize, compare: F) -> Vec<ActivityHighlight>
where
    F: Fn(&Activity, &Activity) -> Ordering,
{
    let mut sorted = activities.to_vec();
    sorted.sort_by(|a, b| compare(a, b));
    sorted
        .into_iter()
        .take(top_n)
        .map(ActivityHighlight::from)
        .collect()
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

fn run_pace(activity: &Activity) -> f64 {
    activity.moving_time_s / activity.distance_m.max(1.0)
}

fn ride_speed(activity: &Activity, rules: &HighlightRules) -> f64 {
    let hours = activity.moving_time_s / units::SECONDS_PER_HOUR;
    (activity.distance_m / units::METERS_PER_KM) / hours.max(rules.ride_min_hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityRecord;

    fn activity(id: i64, kind: &str, distance: f64, time: f64, elevation: f64) -> Activity {
        let record = ActivityRecord {
            id,
            name: Some(format!("Activity {}", id)),
            activity_type: Some(kind.to_string()),
            start_date_local: Some("2024-05-04T09:30:00Z".to_string()),
            distance: Some(distance),
            moving_time: Some(time),
            total_elevation_gain: Some(elevation),
            average_speed: Some(if time > 0.0 { distance / time } else { 0.0 }),
            ..Default::default()
        };
        Activity::from_record(&record, chrono::NaiveDateTime::default())
    }

    fn ids(list: &[ActivityHighlight]) -> Vec<i64> {
        list.iter().map(|h| h.id).collect()
    }

    #[test]
    fn test_projection_fields() {
        let highlight = ActivityHighlight::from(&activity(42, "Run", 10000.0, 3000.0, 55.555));
        assert_eq!(highlight.date, "2024-05-04");
        assert_eq!(highlight.distance_km, 10.0);
        assert_eq!(highlight.elevation_m, 55.56);
        assert_eq!(highlight.moving_time_minutes, 50.0);
        assert_eq!(highlight.strava_url, "https://www.strava.com/activities/42");
        assert_eq!(highlight.average_speed_kmh, Some(12.0));
        assert_eq!(highlight.pace_min_per_km, Some(5.0));

        let json = serde_json::to_value(&highlight).unwrap();
        assert_eq!(json["type"], "Run");
    }

    #[test]
    fn test_longest_and_climbs_are_bounded_and_stable() {
        let activities = vec![
            activity(1, "Ride", 10000.0, 1800.0, 100.0),
            activity(2, "Ride", 30000.0, 3600.0, 100.0),
            activity(3, "Run", 10000.0, 3000.0, 300.0),
            activity(4, "Walk", 2000.0, 1200.0, 5.0),
        ];
        let set = highlights(&activities, 3, "All", &HighlightRules::default());
        assert_eq!(ids(&set.longest_activities), vec![2, 1, 3]);
        // 1 and 2 tie on elevation and keep input order
        assert_eq!(ids(&set.biggest_climbs), vec![3, 1, 2]);
    }

    #[test]
    fn test_run_distance_threshold_is_strict() {
        let activities = vec![
            activity(1, "Run", 3000.0, 600.0, 0.0),
            activity(2, "Run", 3001.0, 900.0, 0.0),
        ];
        let set = highlights(&activities, 5, "All", &HighlightRules::default());
        assert_eq!(ids(&set.fastest_runs), vec![2]);
    }

    #[test]
    fn test_ride_distance_threshold_is_strict() {
        let activities = vec![
            activity(1, "Ride", 5000.0, 600.0, 0.0),
            activity(2, "Ride", 5001.0, 900.0, 0.0),
        ];
        let set = highlights(&activities, 5, "All", &HighlightRules::default());
        assert_eq!(ids(&set.fastest_rides), vec![2]);
    }

    #[test]
    fn test_fastest_orderings() {
        let activities = vec![
            activity(1, "Run", 5000.0, 1500.0, 0.0),
            activity(2, "Run", 5000.0, 1200.0, 0.0),
            activity(3, "Ride", 20000.0, 3600.0, 0.0),
            activity(4, "Ride", 30000.0, 3600.0, 0.0),
            // Moving time under the hour floor counts as 0.1 h
            activity(5, "Ride", 6000.0, 60.0, 0.0),
        ];
        let set = highlights(&activities, 5, "All", &HighlightRules::default());
        assert_eq!(ids(&set.fastest_runs), vec![2, 1]);
        assert_eq!(ids(&set.fastest_rides), vec![5, 4, 3]);
    }

    #[test]
    fn test_type_filter_and_top_n_zero() {
        let activities = vec![
            activity(1, "Run", 5000.0, 1500.0, 0.0),
            activity(2, "Ride", 20000.0, 3600.0, 0.0),
        ];
        let rides = highlights(&activities, 5, "Ride", &HighlightRules::default());
        assert_eq!(ids(&rides.longest_activities), vec![2]);
        assert!(rides.fastest_runs.is_empty());

        let none = highlights(&activities, 0, "All", &HighlightRules::default());
        assert!(none.longest_activities.is_empty());
        assert!(none.fastest_rides.is_empty());
    }

    #[test]
    fn test_period_is_inclusive_and_skips_unknown_dates() {
        let mut early = activity(1, "Run", 5000.0, 1500.0, 0.0);
        early.start = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();
        let late = activity(2, "Run", 5000.0, 1500.0, 0.0);
        let mut undated = activity(3, "Run", 5000.0, 1500.0, 0.0);
        undated.date_source = DateSource::Fallback;
        let activities = vec![early, late, undated];

        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();
        assert_eq!(ids(&activities_in_period(&activities, start, end, "All")), vec![1, 2]);
        assert_eq!(ids(&activities_on_day(&activities, end, "All")), vec![2]);
        assert!(activities_on_day(&activities, end, "Ride").is_empty());
    }
}
