// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Narrative comparisons derived from a summary

use serde::{Deserialize, Serialize};

use super::normalize::{decimal_display as d, round_to};
use super::summary::SummaryView;
use crate::constants::references::{
    BEN_NEVIS_M, EARTH_CIRCUMFERENCE_KM, EVEREST_M, PARIS_BERLIN_KM, WORKDAY_HOURS,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactSet {
    pub facts: Vec<String>,
}

/// Turn summary totals into human-scale comparisons
///
/// A summary with no activities yields no facts.
pub fn facts(summary: &SummaryView) -> FactSet {
    if summary.activities_count == 0 {
        return FactSet::default();
    }

    let distance = summary.total_distance_km;
    let elevation = summary.total_elevation_m;
    let hours = summary.total_time_hours;

    let facts = vec![
        format!(
            "You travelled {} km, roughly the distance from Paris to Berlin (878 km) {} times.",
            d(distance),
            d(round_to(distance / PARIS_BERLIN_KM, 1))
        ),
        format!(
            "That's {}% of Earth's circumference (≈40,075 km).",
            d(round_to(distance / EARTH_CIRCUMFERENCE_KM * 100.0, 2))
        ),
        format!(
            "You climbed {} m, which is {}× Mount Everest.",
            d(elevation),
            d(round_to(elevation / EVEREST_M, 2))
        ),
        format!("Or {}× Ben Nevis!", d(round_to(elevation / BEN_NEVIS_M, 2))),
        format!(
            "You spent {} hours moving — that's {} full workdays.",
            d(hours),
            d(round_to(hours / WORKDAY_HOURS, 1))
        ),
        format!(
            "Active on {}% of days this year.",
            d(summary.active_days_percent)
        ),
    ];

    FactSet { facts }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(distance: f64, elevation: f64, hours: f64, percent: f64, count: usize) -> SummaryView {
        SummaryView {
            total_distance_km: distance,
            total_elevation_m: elevation,
            total_time_hours: hours,
            activities_count: count,
            active_days: 0,
            active_days_percent: percent,
            best_month: None,
            best_month_distance_km: None,
            longest_streak_days: 0,
            most_epic_day_date: None,
            most_epic_day_distance_km: None,
            activity_type: "All".to_string(),
        }
    }

    #[test]
    fn test_no_activities_no_facts() {
        assert!(facts(&summary(100.0, 10.0, 5.0, 1.0, 0)).facts.is_empty());
    }

    #[test]
    fn test_fact_texts() {
        let set = facts(&summary(878.0, 8848.0, 16.0, 25.5, 12));
        assert_eq!(set.facts.len(), 6);
        assert_eq!(
            set.facts[0],
            "You travelled 878.0 km, roughly the distance from Paris to Berlin (878 km) 1.0 times."
        );
        assert_eq!(set.facts[1], "That's 2.19% of Earth's circumference (≈40,075 km).");
        assert_eq!(set.facts[2], "You climbed 8848.0 m, which is 1.0× Mount Everest.");
        assert_eq!(set.facts[3], "Or 6.58× Ben Nevis!");
        assert_eq!(
            set.facts[4],
            "You spent 16.0 hours moving — that's 2.0 full workdays."
        );
        assert_eq!(set.facts[5], "Active on 25.5% of days this year.");
    }

    #[test]
    fn test_small_totals_keep_two_decimals() {
        let set = facts(&summary(12.34, 0.0, 0.5, 0.27, 1));
        assert_eq!(
            set.facts[0],
            "You travelled 12.34 km, roughly the distance from Paris to Berlin (878 km) 0.0 times."
        );
        assert_eq!(set.facts[1], "That's 0.03% of Earth's circumference (≈40,075 km).");
        assert_eq!(set.facts[3], "Or 0.0× Ben Nevis!");
    }
}
