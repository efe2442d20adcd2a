// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Wrapped Report
//!
//! Composite end-of-year report for the current calendar year.
//!
//! ## Pipeline
//!
//! 1. Scope to the report year and the type filter. Everything below sees
//!    only the scoped activities.
//! 2. Totals, superlatives and distributions, all synchronous.
//! 3. Optional social enrichment through a [`KudosSource`]: a bounded
//!    number of sequential lookups whose failures are logged and skipped.
//! 4. Key-stat cards and narrative lines.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use super::calendar::{
    day_label, longest_streak, max_bucket, month_label, weekday_index, weekday_name, TimeOfDay,
};
use super::normalize::{
    decimal_display, is_unfiltered, meters_to_km, round2, round_to, seconds_to_hours,
    seconds_to_minutes, thousands,
};
use crate::config::EnrichmentLimits;
use crate::constants::{references, strava};
use crate::enrichment::KudosSource;
use crate::models::Activity;

/// An activity, or a synthetic aggregate of one day, as shown in the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedActivity {
    pub id: i64,
    pub name: String,
    pub date: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub distance_km: f64,
    pub elevation_m: f64,
    pub moving_time_minutes: f64,
    pub kudos_count: Option<u32>,
    pub strava_url: String,
}

impl From<&Activity> for WrappedActivity {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id,
            name: activity.name.clone(),
            date: day_label(activity.date()),
            activity_type: activity.activity_type.clone(),
            distance_km: meters_to_km(activity.distance_m),
            elevation_m: round2(activity.elevation_gain_m),
            moving_time_minutes: seconds_to_minutes(activity.moving_time_s),
            kudos_count: activity.kudos_count,
            strava_url: strava::activity_url(activity.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyStat {
    pub label: String,
    pub value: f64,
    pub unit: String,
    /// Value with thousands separators and no decimals, followed by the unit
    pub formatted: String,
}

impl KeyStat {
    fn new(label: &str, value: f64, unit: &str) -> Self {
        Self {
            label: label.to_string(),
            value,
            unit: unit.to_string(),
            formatted: format!("{} {}", thousands(value), unit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KudosTally {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub date: String,
    pub distance_km: f64,
    pub cumulative_distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyDistance {
    pub month: String,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOfDayCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    pub lat: f64,
    pub lng: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedReport {
    pub year: i32,
    pub key_stats: Vec<KeyStat>,
    pub total_distance_km: f64,
    pub total_time_hours: f64,
    pub total_elevation_m: f64,
    pub activities_count: usize,
    pub active_days: usize,
    pub longest_streak_days: u32,
    pub most_active_month: Option<String>,
    pub most_active_weekday: Option<String>,
    pub biggest_day: Option<WrappedActivity>,
    pub longest_activity: Option<WrappedActivity>,
    pub biggest_climb: Option<WrappedActivity>,
    pub most_kudos_activity: Option<WrappedActivity>,
    pub top_kudos_givers: Vec<KudosTally>,
    pub favourite_partners: Vec<KudosTally>,
    pub cumulative_distance: Vec<CumulativePoint>,
    pub monthly_distance: Vec<MonthlyDistance>,
    pub time_of_day_distribution: Vec<TimeOfDayCount>,
    pub heatmap_points: Vec<HeatmapPoint>,
    pub fun_lines: Vec<String>,
}

impl WrappedReport {
    /// Report for a year with no matching activities
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            key_stats: Vec::new(),
            total_distance_km: 0.0,
            total_time_hours: 0.0,
            total_elevation_m: 0.0,
            activities_count: 0,
            active_days: 0,
            longest_streak_days: 0,
            most_active_month: None,
            most_active_weekday: None,
            biggest_day: None,
            longest_activity: None,
            biggest_climb: None,
            most_kudos_activity: None,
            top_kudos_givers: Vec::new(),
            favourite_partners: Vec::new(),
            cumulative_distance: Vec::new(),
            monthly_distance: Vec::new(),
            time_of_day_distribution: Vec::new(),
            heatmap_points: Vec::new(),
            fun_lines: Vec::new(),
        }
    }
}

/// Build the report for the current calendar year
pub async fn build_wrapped(
    activities: &[Activity],
    type_filter: &str,
    limits: &EnrichmentLimits,
    kudos: Option<&dyn KudosSource>,
) -> WrappedReport {
    let today = chrono::Local::now().date_naive();
    build_wrapped_at(activities, type_filter, limits, kudos, today).await
}

/// Build the report for the calendar year of `today`
pub async fn build_wrapped_at(
    activities: &[Activity],
    type_filter: &str,
    limits: &EnrichmentLimits,
    kudos: Option<&dyn KudosSource>,
    today: NaiveDate,
) -> WrappedReport {
    let year = today.year();
    let scoped: Vec<&Activity> = activities
        .iter()
        .filter(|a| a.date().year() == year)
        .filter(|a| is_unfiltered(type_filter) || a.activity_type == type_filter)
        .collect();

    if scoped.is_empty() {
        debug!(year, activity_type = type_filter, "No activities for wrapped report");
        return WrappedReport::empty(year);
    }

    let total_distance: f64 = scoped.iter().map(|a| a.distance_m).sum();
    let total_elevation: f64 = scoped.iter().map(|a| a.elevation_gain_m).sum();
    let total_time: f64 = scoped.iter().map(|a| a.moving_time_s).sum();

    let mut day_distance: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut weekday_distance: BTreeMap<usize, f64> = BTreeMap::new();
    let mut month_distance: BTreeMap<String, f64> = BTreeMap::new();
    for activity in &scoped {
        let date = activity.date();
        *day_distance.entry(date).or_insert(0.0) += activity.distance_m;
        *weekday_distance.entry(weekday_index(date)).or_insert(0.0) += activity.distance_m;
        *month_distance.entry(month_label(date)).or_insert(0.0) += activity.distance_m;
    }

    let active_days: Vec<NaiveDate> = day_distance.keys().copied().collect();
    let most_active_month = max_bucket(&month_distance).map(|(label, _)| label);
    let most_active_weekday =
        max_bucket(&weekday_distance).map(|(index, _)| weekday_name(index).to_string());

    let (biggest_day_date, biggest_day_distance) = match max_bucket(&day_distance) {
        Some((date, distance)) => (Some(date), distance),
        None => (None, 0.0),
    };
    let biggest_day = biggest_day_date.map(|date| big_day(&scoped, date, biggest_day_distance));

    let longest_activity = first_max(&scoped, |a| a.distance_m).map(WrappedActivity::from);
    let biggest_climb = first_max(&scoped, |a| a.elevation_gain_m).map(WrappedActivity::from);

    let kudos_candidates: Vec<&Activity> =
        scoped.iter().copied().filter(|a| a.kudos() > 0).collect();
    let most_kudos_activity =
        first_max(&kudos_candidates, |a| f64::from(a.kudos())).map(WrappedActivity::from);

    let top_kudos_givers = match kudos {
        Some(source) if !kudos_candidates.is_empty() => {
            tally_kudos_givers(source, &kudos_candidates, limits).await
        }
        _ => Vec::new(),
    };

    let total_distance_km = meters_to_km(total_distance);
    let total_time_hours = seconds_to_hours(total_time);
    let total_elevation_m = round2(total_elevation);
    let activities_count = scoped.len();

    let key_stats = vec![
        KeyStat::new("Total distance", total_distance_km, "km"),
        KeyStat::new("Total elevation", total_elevation_m, "m"),
        KeyStat::new("Moving time", total_time_hours, "h"),
        KeyStat::new("Activities", activities_count as f64, "activities"),
    ];

    let mut fun_lines = vec![
        format!(
            "You travelled {} km in {} – that's {}% of Earth's circumference.",
            thousands(total_distance_km),
            year,
            decimal_display(round_to(
                total_distance_km / references::EARTH_CIRCUMFERENCE_KM * 100.0,
                1
            ))
        ),
        format!(
            "Your biggest day was {} km on {}.",
            decimal_display(meters_to_km(biggest_day_distance)),
            biggest_day_date.map(day_label).unwrap_or_else(|| "N/A".to_string())
        ),
        format!(
            "{} was your most active weekday.",
            most_active_weekday.as_deref().unwrap_or("Your week")
        ),
    ];
    if let Some(cheered) = &most_kudos_activity {
        fun_lines.push(format!(
            "You earned {} kudos on your most cheered activity.",
            cheered.kudos_count.unwrap_or(0)
        ));
    }

    debug!(
        year,
        activities = activities_count,
        active_days = active_days.len(),
        kudos_givers = top_kudos_givers.len(),
        "Computed wrapped report"
    );

    WrappedReport {
        year,
        key_stats,
        total_distance_km,
        total_time_hours,
        total_elevation_m,
        activities_count,
        active_days: active_days.len(),
        longest_streak_days: longest_streak(&active_days),
        most_active_month,
        most_active_weekday,
        biggest_day,
        longest_activity,
        biggest_climb,
        most_kudos_activity,
        favourite_partners: top_kudos_givers.clone(),
        top_kudos_givers,
        cumulative_distance: cumulative_distance(&day_distance),
        monthly_distance: month_distance
            .iter()
            .map(|(month, distance)| MonthlyDistance {
                month: month.clone(),
                distance_km: meters_to_km(*distance),
            })
            .collect(),
        time_of_day_distribution: time_of_day_distribution(&scoped),
        heatmap_points: heatmap_points(&scoped),
        fun_lines,
    }
}

/// Synthetic activity summing every activity of `date`
fn big_day(scoped: &[&Activity], date: NaiveDate, distance_m: f64) -> WrappedActivity {
    let day: Vec<&Activity> = scoped.iter().copied().filter(|a| a.date() == date).collect();
    let first = day.first();
    let id = first.map(|a| a.id).unwrap_or(0);

    WrappedActivity {
        id,
        name: format!("Big day {}", day_label(date)),
        date: day_label(date),
        activity_type: first
            .map(|a| a.activity_type.clone())
            .unwrap_or_else(|| crate::constants::defaults::ACTIVITY_TYPE.to_string()),
        distance_km: meters_to_km(distance_m),
        elevation_m: round2(day.iter().map(|a| a.elevation_gain_m).sum()),
        moving_time_minutes: seconds_to_minutes(day.iter().map(|a| a.moving_time_s).sum()),
        kudos_count: Some(day.iter().map(|a| a.kudos()).sum()),
        strava_url: strava::activity_url(id),
    }
}

/// First activity holding the maximum key
fn first_max<'a, F>(activities: &[&'a Activity], key: F) -> Option<&'a Activity>
where
    F: Fn(&Activity) -> f64,
{
    let mut best: Option<(&'a Activity, f64)> = None;
    for &activity in activities {
        let value = key(activity);
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((activity, value)),
        }
    }
    best.map(|(activity, _)| activity)
}

/// Running distance per active day
///
/// The running total is kept in metres and rounded per point, so the last
/// point equals the report's total distance.
fn cumulative_distance(day_distance: &BTreeMap<NaiveDate, f64>) -> Vec<CumulativePoint> {
    let mut running = 0.0;
    day_distance
        .iter()
        .map(|(date, distance)| {
            running += distance;
            CumulativePoint {
                date: day_label(*date),
                distance_km: meters_to_km(*distance),
                cumulative_distance_km: meters_to_km(running),
            }
        })
        .collect()
}

fn time_of_day_distribution(scoped: &[&Activity]) -> Vec<TimeOfDayCount> {
    TimeOfDay::ALL
        .iter()
        .map(|bucket| TimeOfDayCount {
            label: bucket.label().to_string(),
            count: scoped.iter().filter(|a| TimeOfDay::of(a.start) == *bucket).count(),
        })
        .collect()
}

/// Start coordinates rounded to two decimals, counted in first-seen order
fn heatmap_points(scoped: &[&Activity]) -> Vec<HeatmapPoint> {
    let mut index: HashMap<(i64, i64), usize> = HashMap::new();
    let mut points: Vec<HeatmapPoint> = Vec::new();

    for (lat, lng) in scoped.iter().filter_map(|a| a.start_latlng) {
        let key = (
            (lat * 100.0).round_ties_even() as i64,
            (lng * 100.0).round_ties_even() as i64,
        );
        match index.get(&key) {
            Some(&position) => points[position].count += 1,
            None => {
                index.insert(key, points.len());
                points.push(HeatmapPoint {
                    lat: key.0 as f64 / 100.0,
                    lng: key.1 as f64 / 100.0,
                    count: 1,
                });
            }
        }
    }

    points
}

/// Look up kudos givers on the most-kudoed activities and rank them
async fn tally_kudos_givers(
    source: &dyn KudosSource,
    candidates: &[&Activity],
    limits: &EnrichmentLimits,
) -> Vec<KudosTally> {
    let mut ranked = candidates.to_vec();
    ranked.sort_by(|a, b| b.kudos().cmp(&a.kudos()));

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut tallies: Vec<KudosTally> = Vec::new();

    for activity in ranked.into_iter().take(limits.max_lookups) {
        let givers = match source.kudos_givers(activity.id).await {
            Ok(givers) => givers,
            Err(e) => {
                warn!(activity.id = activity.id, error = %e, "Skipping kudos lookup");
                continue;
            }
        };

        for giver in givers {
            let name = giver.display_name();
            match index.get(&name) {
                Some(&position) => tallies[position].count += 1,
                None => {
                    index.insert(name.clone(), tallies.len());
                    tallies.push(KudosTally { name, count: 1 });
                }
            }
        }
    }

    // Stable, so equal counts stay in first-seen order
    tallies.sort_by(|a, b| b.count.cmp(&a.count));
    tallies.truncate(limits.top_givers);
    tallies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::{EnrichmentError, KudosGiver};
    use crate::models::ActivityRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn activity(id: i64, start: &str, distance: f64, elevation: f64, kudos: Option<u32>) -> Activity {
        let record = ActivityRecord {
            id,
            name: Some(format!("Activity {}", id)),
            activity_type: Some("Ride".to_string()),
            start_date_local: Some(start.to_string()),
            distance: Some(distance),
            moving_time: Some(3600.0),
            total_elevation_gain: Some(elevation),
            kudos_count: kudos,
            ..Default::default()
        };
        Activity::from_record(&record, chrono::NaiveDateTime::default())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn giver(first: &str, last: &str) -> KudosGiver {
        KudosGiver {
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
        }
    }

    /// Records every lookup and answers from a fixed table
    struct ScriptedKudos {
        calls: Mutex<Vec<i64>>,
        answers: HashMap<i64, Vec<KudosGiver>>,
    }

    #[async_trait]
    impl KudosSource for ScriptedKudos {
        async fn kudos_givers(&self, activity_id: i64) -> Result<Vec<KudosGiver>, EnrichmentError> {
            self.calls.lock().unwrap().push(activity_id);
            self.answers
                .get(&activity_id)
                .cloned()
                .ok_or(EnrichmentError::LookupFailed {
                    activity_id,
                    reason: "not found".to_string(),
                })
        }
    }

    #[tokio::test]
    async fn test_empty_year_has_default_report() {
        let activities = vec![activity(1, "2023-12-31T10:00:00Z", 5000.0, 10.0, Some(3))];
        let source = ScriptedKudos {
            calls: Mutex::new(Vec::new()),
            answers: HashMap::new(),
        };
        let report =
            build_wrapped_at(&activities, "All", &EnrichmentLimits::default(), Some(&source), today())
                .await;
        assert_eq!(report, WrappedReport::empty(2024));
        assert!(source.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_big_day_aggregates_the_day() {
        let activities = vec![
            activity(7, "2024-03-02T08:00:00Z", 30000.0, 200.0, Some(2)),
            activity(8, "2024-03-02T15:00:00Z", 25000.0, 150.0, None),
            activity(9, "2024-03-05T08:00:00Z", 40000.0, 500.0, Some(9)),
        ];
        let report =
            build_wrapped_at(&activities, "All", &EnrichmentLimits::default(), None, today()).await;

        let big = report.biggest_day.expect("biggest day");
        assert_eq!(big.name, "Big day 2024-03-02");
        assert_eq!(big.id, 7);
        assert_eq!(big.distance_km, 55.0);
        assert_eq!(big.elevation_m, 350.0);
        assert_eq!(big.moving_time_minutes, 120.0);
        assert_eq!(big.kudos_count, Some(2));

        assert_eq!(report.longest_activity.map(|a| a.id), Some(9));
        assert_eq!(report.biggest_climb.map(|a| a.id), Some(9));
        assert_eq!(report.most_kudos_activity.map(|a| a.id), Some(9));
        assert_eq!(report.fun_lines[1], "Your biggest day was 55.0 km on 2024-03-02.");
        assert_eq!(report.fun_lines[3], "You earned 9 kudos on your most cheered activity.");
    }

    #[tokio::test]
    async fn test_no_kudos_means_no_cheered_line() {
        let activities = vec![activity(1, "2024-01-01T08:00:00Z", 5000.0, 0.0, Some(0))];
        let report =
            build_wrapped_at(&activities, "All", &EnrichmentLimits::default(), None, today()).await;
        assert!(report.most_kudos_activity.is_none());
        assert_eq!(report.fun_lines.len(), 3);
        // 2024-01-01 is a Monday
        assert_eq!(report.fun_lines[2], "Mon was your most active weekday.");
    }

    #[tokio::test]
    async fn test_enrichment_tally_and_failures() {
        let activities = vec![
            activity(1, "2024-01-01T08:00:00Z", 5000.0, 0.0, Some(4)),
            activity(2, "2024-01-02T08:00:00Z", 5000.0, 0.0, Some(10)),
            activity(3, "2024-01-03T08:00:00Z", 5000.0, 0.0, Some(1)),
            activity(4, "2024-01-04T08:00:00Z", 5000.0, 0.0, None),
        ];
        let mut answers = HashMap::new();
        answers.insert(2, vec![giver("Bo", "B"), giver("Al", "A"), giver("", "")]);
        answers.insert(1, vec![giver("Al", "A"), giver("Cy", "C")]);
        // Activity 3 has no answer and fails
        let source = ScriptedKudos {
            calls: Mutex::new(Vec::new()),
            answers,
        };

        let report =
            build_wrapped_at(&activities, "All", &EnrichmentLimits::default(), Some(&source), today())
                .await;

        assert_eq!(*source.calls.lock().unwrap(), vec![2, 1, 3]);
        let names: Vec<(&str, usize)> = report
            .top_kudos_givers
            .iter()
            .map(|t| (t.name.as_str(), t.count))
            .collect();
        assert_eq!(names, vec![("Al A", 2), ("Bo B", 1), ("Friend", 1)]);
        assert_eq!(report.favourite_partners, report.top_kudos_givers);
    }

    #[tokio::test]
    async fn test_lookups_are_bounded() {
        let activities: Vec<Activity> = (1..=8)
            .map(|i| activity(i, "2024-02-01T08:00:00Z", 1000.0, 0.0, Some(i as u32)))
            .collect();
        let source = ScriptedKudos {
            calls: Mutex::new(Vec::new()),
            answers: HashMap::new(),
        };
        let report =
            build_wrapped_at(&activities, "All", &EnrichmentLimits::default(), Some(&source), today())
                .await;
        assert_eq!(*source.calls.lock().unwrap(), vec![8, 7, 6, 5, 4]);
        assert!(report.top_kudos_givers.is_empty());
    }

    #[tokio::test]
    async fn test_cumulative_series_ends_at_total() {
        let activities = vec![
            activity(1, "2024-01-01T08:00:00Z", 1005.0, 0.0, None),
            activity(2, "2024-01-02T08:00:00Z", 1005.0, 0.0, None),
            activity(3, "2024-01-03T08:00:00Z", 1005.0, 0.0, None),
        ];
        let report =
            build_wrapped_at(&activities, "All", &EnrichmentLimits::default(), None, today()).await;

        let series = &report.cumulative_distance;
        assert_eq!(series.len(), 3);
        assert!(series
            .windows(2)
            .all(|w| w[0].cumulative_distance_km <= w[1].cumulative_distance_km));
        assert_eq!(
            series.last().map(|p| p.cumulative_distance_km),
            Some(report.total_distance_km)
        );
    }

    #[tokio::test]
    async fn test_distributions() {
        let mut with_coords = activity(1, "2024-01-01T06:00:00Z", 1000.0, 0.0, None);
        with_coords.start_latlng = Some((51.5012, -0.1419));
        let mut same_cell = activity(2, "2024-01-01T12:00:00Z", 1000.0, 0.0, None);
        same_cell.start_latlng = Some((51.4988, -0.1421));
        let mut other_cell = activity(3, "2024-02-01T19:00:00Z", 1000.0, 0.0, None);
        other_cell.start_latlng = Some((48.8566, 2.3522));
        let no_coords = activity(4, "2024-02-01T23:30:00Z", 1000.0, 0.0, None);

        let activities = vec![with_coords, same_cell, other_cell, no_coords];
        let report =
            build_wrapped_at(&activities, "All", &EnrichmentLimits::default(), None, today()).await;

        let buckets: Vec<(&str, usize)> = report
            .time_of_day_distribution
            .iter()
            .map(|b| (b.label.as_str(), b.count))
            .collect();
        assert_eq!(
            buckets,
            vec![("Morning", 1), ("Afternoon", 1), ("Evening", 1), ("Night", 1)]
        );

        assert_eq!(report.heatmap_points.len(), 2);
        assert_eq!(report.heatmap_points[0].lat, 51.5);
        assert_eq!(report.heatmap_points[0].lng, -0.14);
        assert_eq!(report.heatmap_points[0].count, 2);
        assert_eq!(report.heatmap_points[1].lat, 48.86);

        let months: Vec<&str> = report.monthly_distance.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02"]);
    }

    #[tokio::test]
    async fn test_heatmap_cells_round_ties_to_even() {
        let mut first = activity(1, "2024-01-01T06:00:00Z", 1000.0, 0.0, None);
        first.start_latlng = Some((0.125, 2.375));
        let mut second = activity(2, "2024-01-02T06:00:00Z", 1000.0, 0.0, None);
        second.start_latlng = Some((0.12, 2.38));

        let activities = vec![first, second];
        let report =
            build_wrapped_at(&activities, "All", &EnrichmentLimits::default(), None, today()).await;

        assert_eq!(report.heatmap_points.len(), 1);
        assert_eq!(report.heatmap_points[0].lat, 0.12);
        assert_eq!(report.heatmap_points[0].lng, 2.38);
        assert_eq!(report.heatmap_points[0].count, 2);
    }

    #[tokio::test]
    async fn test_key_stats_formatting() {
        let activities = vec![activity(1, "2024-01-01T08:00:00Z", 1_234_567.0, 8848.0, None)];
        let report =
            build_wrapped_at(&activities, "All", &EnrichmentLimits::default(), None, today()).await;
        let formatted: Vec<&str> = report.key_stats.iter().map(|k| k.formatted.as_str()).collect();
        assert_eq!(formatted, vec!["1,235 km", "8,848 m", "1 h", "1 activities"]);
        assert_eq!(
            report.fun_lines[0],
            "You travelled 1,235 km in 2024 – that's 3.1% of Earth's circumference."
        );
    }
}
