// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Trend Aggregator
//!
//! Weekly, monthly and daily time series plus weekday statistics.
//!
//! Every filtered activity lands in exactly one week, one month and one day
//! bucket, so the counts of each series sum to the number of filtered
//! activities. Series are ordered by label, which sorts chronologically
//! because labels are zero padded.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::calendar::{day_label, month_label, week_label, weekday_index, weekday_name};
use super::normalize::{filter_by_type, meters_to_km, round2, seconds_to_hours, seconds_to_minutes};
use crate::models::Activity;

/// One week or month of activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub label: String,
    pub distance_km: f64,
    pub moving_time_hours: f64,
    pub elevation_m: f64,
    pub activities_count: usize,
    /// Contributing activity ids, in input order
    pub activity_ids: Vec<i64>,
}

/// One calendar day of activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: String,
    pub distance_km: f64,
    pub moving_time_minutes: f64,
    pub activities_count: usize,
    pub activity_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayStat {
    pub weekday: String,
    pub count: usize,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub weekly: Vec<TrendPoint>,
    pub monthly: Vec<TrendPoint>,
    pub daily: Vec<DailyPoint>,
    /// Observed weekdays only, Monday first
    pub weekday_stats: Vec<WeekdayStat>,
    pub most_active_weekday: Option<String>,
    pub activity_type: String,
}

/// Running sums of one bucket
#[derive(Debug, Default)]
struct Bucket {
    distance_m: f64,
    moving_time_s: f64,
    elevation_m: f64,
    count: usize,
    activity_ids: Vec<i64>,
}

impl Bucket {
    fn add(&mut self, activity: &Activity) {
        self.distance_m += activity.distance_m;
        self.moving_time_s += activity.moving_time_s;
        self.elevation_m += activity.elevation_gain_m;
        self.count += 1;
        self.activity_ids.push(activity.id);
    }

    fn into_trend_point(self, label: String) -> TrendPoint {
        TrendPoint {
            label,
            distance_km: meters_to_km(self.distance_m),
            moving_time_hours: seconds_to_hours(self.moving_time_s),
            elevation_m: round2(self.elevation_m),
            activities_count: self.count,
            activity_ids: self.activity_ids,
        }
    }

    fn into_daily_point(self, date: String) -> DailyPoint {
        DailyPoint {
            date,
            distance_km: meters_to_km(self.distance_m),
            moving_time_minutes: seconds_to_minutes(self.moving_time_s),
            activities_count: self.count,
            activity_ids: self.activity_ids,
        }
    }
}

/// Build the time series for the activities matching `type_filter`
pub fn trends(activities: &[Activity], type_filter: &str) -> TrendSeries {
    let filtered = filter_by_type(activities, type_filter);

    let mut weekly: BTreeMap<String, Bucket> = BTreeMap::new();
    let mut monthly: BTreeMap<String, Bucket> = BTreeMap::new();
    let mut daily: BTreeMap<String, Bucket> = BTreeMap::new();
    let mut weekdays: BTreeMap<usize, (usize, f64)> = BTreeMap::new();

    for activity in &filtered {
        let date = activity.date();
        weekly.entry(week_label(date)).or_default().add(activity);
        monthly.entry(month_label(date)).or_default().add(activity);
        daily.entry(day_label(date)).or_default().add(activity);

        let entry = weekdays.entry(weekday_index(date)).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += activity.distance_m;
    }

    let weekday_stats: Vec<WeekdayStat> = weekdays
        .into_iter()
        .map(|(index, (count, distance))| WeekdayStat {
            weekday: weekday_name(index).to_string(),
            count,
            distance_km: meters_to_km(distance),
        })
        .collect();

    debug!(
        activities = filtered.len(),
        weeks = weekly.len(),
        months = monthly.len(),
        days = daily.len(),
        "Computed trends"
    );

    TrendSeries {
        weekly: weekly
            .into_iter()
            .map(|(label, bucket)| bucket.into_trend_point(label))
            .collect(),
        monthly: monthly
            .into_iter()
            .map(|(label, bucket)| bucket.into_trend_point(label))
            .collect(),
        daily: daily
            .into_iter()
            .map(|(label, bucket)| bucket.into_daily_point(label))
            .collect(),
        most_active_weekday: most_active_weekday(&weekday_stats),
        weekday_stats,
        activity_type: type_filter.to_string(),
    }
}

/// Weekday with the most distance, then the most activities
///
/// Ties keep the earliest weekday.
fn most_active_weekday(stats: &[WeekdayStat]) -> Option<String> {
    let mut best: Option<&WeekdayStat> = None;
    for stat in stats {
        let better = match best {
            None => true,
            Some(top) => {
                stat.distance_km > top.distance_km
                    || (stat.distance_km == top.distance_km && stat.count > top.count)
            }
        };
        if better {
            best = Some(stat);
        }
    }
    best.map(|stat| stat.weekday.clone())
}
