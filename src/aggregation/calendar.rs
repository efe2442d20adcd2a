// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Calendar bucketing keys, time-of-day buckets and streak detection

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::calendar::WEEKDAY_NAMES;

/// ISO-8601 week label, e.g. `2025-W01` for 2024-12-30
pub fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// Month label, e.g. `2024-03`
pub fn month_label(date: NaiveDate) -> String {
    format!("{}-{:02}", date.year(), date.month())
}

/// Day label, e.g. `2024-03-07`
pub fn day_label(date: NaiveDate) -> String {
    format!("{}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Weekday index with Monday = 0 and Sunday = 6
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// Display name (`Mon`..`Sun`) of a weekday index
pub fn weekday_name(index: usize) -> &'static str {
    WEEKDAY_NAMES[index % WEEKDAY_NAMES.len()]
}

/// Number of days from January 1 of `today`'s year through `today`
pub fn days_elapsed_in_year(today: NaiveDate) -> i64 {
    i64::from(today.ordinal())
}

/// Part of the day an activity started in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// All buckets in display order
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    /// Bucket of a local hour: Morning [5,11), Afternoon [11,17),
    /// Evening [17,22), Night otherwise
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=10 => TimeOfDay::Morning,
            11..=16 => TimeOfDay::Afternoon,
            17..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn of(start: NaiveDateTime) -> Self {
        Self::from_hour(start.hour())
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
        }
    }
}

/// Longest run of consecutive calendar days
///
/// `days` must be strictly ascending and distinct. An empty slice has a
/// streak of zero.
pub fn longest_streak(days: &[NaiveDate]) -> u32 {
    let Some(first) = days.first() else {
        return 0;
    };

    let mut longest = 1;
    let mut current = 1;
    let mut previous = *first;

    for &day in &days[1..] {
        if day == previous + Duration::days(1) {
            current += 1;
        } else {
            longest = longest.max(current);
            current = 1;
        }
        previous = day;
    }

    longest.max(current)
}

/// Pick the bucket with the largest value
///
/// Ties resolve to the smallest key, so the result does not depend on
/// iteration order.
pub fn max_bucket<K: Ord + Clone>(buckets: &BTreeMap<K, f64>) -> Option<(K, f64)> {
    let mut best: Option<(&K, f64)> = None;
    for (key, &value) in buckets {
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((key, value)),
        }
    }
    best.map(|(key, value)| (key.clone(), value))
}
