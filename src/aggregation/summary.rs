// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Year-to-date totals, active days, best month and most epic day

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::calendar::{days_elapsed_in_year, longest_streak, max_bucket, month_label};
use super::normalize::{filter_by_type, meters_to_km, round2, seconds_to_hours};
use crate::config::{ActivityCountPolicy, SummaryConfig};
use crate::models::Activity;

/// Totals and headline figures for the filtered activities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryView {
    pub total_distance_km: f64,
    pub total_elevation_m: f64,
    pub total_time_hours: f64,
    pub activities_count: usize,
    /// Distinct calendar days with at least one activity
    pub active_days: usize,
    /// Active days as a share of the days elapsed this year
    pub active_days_percent: f64,
    pub best_month: Option<String>,
    pub best_month_distance_km: Option<f64>,
    pub longest_streak_days: u32,
    pub most_epic_day_date: Option<String>,
    pub most_epic_day_distance_km: Option<f64>,
    pub activity_type: String,
}

impl SummaryView {
    fn empty(activities_count: usize, activity_type: &str) -> Self {
        Self {
            total_distance_km: 0.0,
            total_elevation_m: 0.0,
            total_time_hours: 0.0,
            activities_count,
            active_days: 0,
            active_days_percent: 0.0,
            best_month: None,
            best_month_distance_km: None,
            longest_streak_days: 0,
            most_epic_day_date: None,
            most_epic_day_distance_km: None,
            activity_type: activity_type.to_string(),
        }
    }
}

/// Summarize activities against the current wall-clock date
///
/// The active-day percentage depends on the day this runs: the same data
/// yields a smaller percentage later in the year.
pub fn summarize(activities: &[Activity], type_filter: &str, config: &SummaryConfig) -> SummaryView {
    summarize_at(activities, type_filter, config, chrono::Local::now().date_naive())
}

/// Summarize activities as of `today`
pub fn summarize_at(
    activities: &[Activity],
    type_filter: &str,
    config: &SummaryConfig,
    today: NaiveDate,
) -> SummaryView {
    let filtered = filter_by_type(activities, type_filter);
    let activities_count = match config.count_policy {
        ActivityCountPolicy::Filtered => filtered.len(),
        ActivityCountPolicy::Unfiltered => activities.len(),
    };

    if filtered.is_empty() {
        // Zero activities are reported as zero under either policy
        return SummaryView::empty(0, type_filter);
    }

    let total_distance: f64 = filtered.iter().map(|a| a.distance_m).sum();
    let total_elevation: f64 = filtered.iter().map(|a| a.elevation_gain_m).sum();
    let total_time: f64 = filtered.iter().map(|a| a.moving_time_s).sum();

    let mut monthly_distance: BTreeMap<String, f64> = BTreeMap::new();
    let mut day_distance: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for activity in &filtered {
        let date = activity.date();
        *monthly_distance.entry(month_label(date)).or_insert(0.0) += activity.distance_m;
        *day_distance.entry(date).or_insert(0.0) += activity.distance_m;
    }

    let unique_days: BTreeSet<NaiveDate> = day_distance.keys().copied().collect();
    let sorted_days: Vec<NaiveDate> = unique_days.into_iter().collect();
    let days_elapsed = days_elapsed_in_year(today);

    let (best_month, best_month_distance) = match max_bucket(&monthly_distance) {
        Some((label, distance)) => (Some(label), distance),
        None => (None, 0.0),
    };
    let (epic_day, epic_distance) = match max_bucket(&day_distance) {
        Some((date, distance)) => (Some(date), distance),
        None => (None, 0.0),
    };

    debug!(
        activities = filtered.len(),
        active_days = sorted_days.len(),
        activity_type = type_filter,
        "Computed summary"
    );

    SummaryView {
        total_distance_km: meters_to_km(total_distance),
        total_elevation_m: round2(total_elevation),
        total_time_hours: seconds_to_hours(total_time),
        activities_count,
        active_days: sorted_days.len(),
        active_days_percent: round2(sorted_days.len() as f64 / days_elapsed as f64 * 100.0),
        best_month,
        best_month_distance_km: (best_month_distance > 0.0).then(|| meters_to_km(best_month_distance)),
        longest_streak_days: longest_streak(&sorted_days),
        most_epic_day_date: epic_day.map(|d| d.format("%Y-%m-%d").to_string()),
        most_epic_day_distance_km: (epic_distance > 0.0).then(|| meters_to_km(epic_distance)),
        activity_type: type_filter.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityRecord;

    fn activity(id: i64, kind: &str, date: &str, distance: f64, time: f64, elevation: f64) -> Activity {
        let record = ActivityRecord {
            id,
            activity_type: Some(kind.to_string()),
            start_date_local: Some(format!("{}T08:00:00Z", date)),
            distance: Some(distance),
            moving_time: Some(time),
            total_elevation_gain: Some(elevation),
            ..Default::default()
        };
        Activity::from_record(&record, chrono::NaiveDateTime::default())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn test_empty_input_yields_zero_summary() {
        let summary = summarize_at(&[], "All", &SummaryConfig::default(), today());
        assert_eq!(summary.activities_count, 0);
        assert_eq!(summary.total_distance_km, 0.0);
        assert_eq!(summary.active_days, 0);
        assert_eq!(summary.longest_streak_days, 0);
        assert!(summary.best_month.is_none());
        assert!(summary.most_epic_day_date.is_none());
        assert_eq!(summary.activity_type, "All");
    }

    #[test]
    fn test_totals_and_headlines() {
        let activities = vec![
            activity(1, "Run", "2024-01-01", 5000.0, 1500.0, 50.0),
            activity(2, "Run", "2024-01-02", 4000.0, 1000.0, 20.0),
            activity(3, "Ride", "2024-01-03", 10000.0, 1200.0, 130.5),
            activity(4, "Ride", "2024-01-03", 2000.0, 300.0, 0.0),
        ];

        let summary = summarize_at(&activities, "All", &SummaryConfig::default(), today());
        assert_eq!(summary.total_distance_km, 21.0);
        assert_eq!(summary.total_elevation_m, 200.5);
        assert_eq!(summary.total_time_hours, 1.11);
        assert_eq!(summary.activities_count, 4);
        assert_eq!(summary.active_days, 3);
        // 3 of 10 days elapsed
        assert_eq!(summary.active_days_percent, 30.0);
        assert_eq!(summary.best_month.as_deref(), Some("2024-01"));
        assert_eq!(summary.best_month_distance_km, Some(21.0));
        assert_eq!(summary.longest_streak_days, 3);
        assert_eq!(summary.most_epic_day_date.as_deref(), Some("2024-01-03"));
        assert_eq!(summary.most_epic_day_distance_km, Some(12.0));
    }

    #[test]
    fn test_count_policy_filtered_and_unfiltered() {
        let activities = vec![
            activity(1, "Run", "2024-01-01", 5000.0, 1500.0, 0.0),
            activity(2, "Ride", "2024-01-02", 9000.0, 1500.0, 0.0),
            activity(3, "Ride", "2024-01-04", 9000.0, 1500.0, 0.0),
        ];

        let filtered = summarize_at(&activities, "Run", &SummaryConfig::default(), today());
        assert_eq!(filtered.activities_count, 1);
        assert_eq!(filtered.total_distance_km, 5.0);

        let legacy = SummaryConfig {
            count_policy: ActivityCountPolicy::Unfiltered,
        };
        let unfiltered = summarize_at(&activities, "Run", &legacy, today());
        assert_eq!(unfiltered.activities_count, 3);
        // Totals are always computed over the filtered records
        assert_eq!(unfiltered.total_distance_km, 5.0);

        // With no type filter both policies agree
        let all_filtered = summarize_at(&activities, "All", &SummaryConfig::default(), today());
        let all_unfiltered = summarize_at(&activities, "All", &legacy, today());
        assert_eq!(all_filtered.activities_count, all_unfiltered.activities_count);
    }

    #[test]
    fn test_unknown_type_is_empty_not_error() {
        let activities = vec![activity(1, "Run", "2024-01-01", 5000.0, 1500.0, 0.0)];
        let summary = summarize_at(&activities, "Swim", &SummaryConfig::default(), today());
        assert_eq!(summary.activities_count, 0);
        assert_eq!(summary.activity_type, "Swim");
    }

    #[test]
    fn test_percentage_depends_on_processing_date() {
        let activities = vec![activity(1, "Run", "2024-01-01", 5000.0, 1500.0, 0.0)];
        let early = summarize_at(&activities, "All", &SummaryConfig::default(), today());
        let late = summarize_at(
            &activities,
            "All",
            &SummaryConfig::default(),
            NaiveDate::from_ymd_opt(2024, 4, 9).unwrap(),
        );
        assert_eq!(early.active_days_percent, 10.0);
        assert_eq!(late.active_days_percent, 1.0);
    }

    #[test]
    fn test_zero_distance_month_reports_no_distance() {
        let activities = vec![activity(1, "Workout", "2024-01-05", 0.0, 1800.0, 0.0)];
        let summary = summarize_at(&activities, "All", &SummaryConfig::default(), today());
        assert_eq!(summary.best_month.as_deref(), Some("2024-01"));
        assert!(summary.best_month_distance_km.is_none());
        assert_eq!(summary.most_epic_day_date.as_deref(), Some("2024-01-05"));
        assert!(summary.most_epic_day_distance_km.is_none());
    }
}
