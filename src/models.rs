// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Input records as delivered by the activity source, and their
//! normalized form consumed by the aggregation engine.
//!
//! ## Design Principles
//!
//! - **Closed contract**: every field the engine reads is named here; there
//!   is no open-ended key/value bag.
//! - **Defaults in one place**: [`Activity::from_record`] is the only
//!   place where a missing field is replaced by a default.
//! - **Observable degradation**: a record whose start time could not be
//!   resolved carries [`DateSource::Fallback`] instead of failing.
//!
//! ## Core Models
//!
//! - [`ActivityRecord`]: one activity as returned by the Strava API
//! - [`Activity`]: the normalized activity used by every aggregator

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::constants::defaults;

/// A single activity as returned by the activity source
///
/// Field names follow the Strava activity summary so that API payloads
/// deserialize directly. Everything except the identifier is optional.
///
/// # Examples
///
/// ```rust
/// use year_in_review::models::ActivityRecord;
///
/// let record: ActivityRecord = serde_json::from_str(r#"{
///     "id": 12345,
///     "name": "Morning Run",
///     "type": "Run",
///     "start_date_local": "2024-03-01T07:30:00Z",
///     "distance": 5000.0,
///     "moving_time": 1500
/// }"#).unwrap();
///
/// assert_eq!(record.activity_type.as_deref(), Some("Run"));
/// assert!(record.start_latlng.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Provider identifier of the activity; zero when missing or null
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    /// Display name given by the athlete
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form activity type tag ("Run", "Ride", ...)
    #[serde(rename = "type", default)]
    pub activity_type: Option<String>,
    /// Start time in the athlete's local time zone
    #[serde(default)]
    pub start_date_local: Option<String>,
    /// Start time in UTC
    #[serde(default)]
    pub start_date: Option<String>,
    /// Distance in meters
    #[serde(default)]
    pub distance: Option<f64>,
    /// Moving time in seconds
    #[serde(default)]
    pub moving_time: Option<f64>,
    /// Elevation gain in meters
    #[serde(default)]
    pub total_elevation_gain: Option<f64>,
    /// Average speed in meters per second
    #[serde(default)]
    pub average_speed: Option<f64>,
    /// Number of kudos received
    #[serde(default)]
    pub kudos_count: Option<u32>,
    /// Start coordinate as `[latitude, longitude]`
    #[serde(default)]
    pub start_latlng: Option<Vec<f64>>,
    /// Number of athletes who took part
    #[serde(default)]
    pub athlete_count: Option<u32>,
}

/// Treat an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// How the start timestamp of an [`Activity`] was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// Parsed from `start_date_local`
    Local,
    /// Parsed from `start_date`
    Utc,
    /// Neither timestamp was usable; the processing time was substituted
    Fallback,
}

/// A normalized activity
///
/// Built once per record by [`Activity::from_record`] and held read-only by
/// the aggregators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub name: String,
    pub activity_type: String,
    /// Local wall-clock start time
    pub start: NaiveDateTime,
    pub date_source: DateSource,
    pub distance_m: f64,
    pub moving_time_s: f64,
    pub elevation_gain_m: f64,
    /// Average speed in m/s, as reported by the source
    pub average_speed: Option<f64>,
    pub kudos_count: Option<u32>,
    /// Start coordinate (latitude, longitude)
    pub start_latlng: Option<(f64, f64)>,
    pub athlete_count: Option<u32>,
}

impl Activity {
    /// Normalize a raw record, substituting defaults for missing fields
    ///
    /// `now` is used only when no start timestamp can be resolved.
    pub fn from_record(record: &ActivityRecord, now: NaiveDateTime) -> Self {
        let (start, date_source) = resolve_start(record, now);

        let start_latlng = match record.start_latlng.as_deref() {
            Some([lat, lng, ..]) => Some((*lat, *lng)),
            _ => None,
        };

        Self {
            id: record.id,
            name: record
                .name
                .clone()
                .unwrap_or_else(|| defaults::ACTIVITY_NAME.to_string()),
            activity_type: record
                .activity_type
                .clone()
                .unwrap_or_else(|| defaults::ACTIVITY_TYPE.to_string()),
            start,
            date_source,
            distance_m: record.distance.unwrap_or(0.0),
            moving_time_s: record.moving_time.unwrap_or(0.0),
            elevation_gain_m: record.total_elevation_gain.unwrap_or(0.0),
            average_speed: record.average_speed,
            kudos_count: record.kudos_count,
            start_latlng,
            athlete_count: record.athlete_count,
        }
    }

    /// Normalize a batch of records against the current local time
    pub fn from_records(records: &[ActivityRecord]) -> Vec<Self> {
        let now = chrono::Local::now().naive_local();
        records.iter().map(|r| Self::from_record(r, now)).collect()
    }

    /// Calendar day of the local start time
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Kudos received, treating a missing count as zero
    pub fn kudos(&self) -> u32 {
        self.kudos_count.unwrap_or(0)
    }
}

fn resolve_start(record: &ActivityRecord, now: NaiveDateTime) -> (NaiveDateTime, DateSource) {
    let (raw, source) = match (&record.start_date_local, &record.start_date) {
        (Some(local), _) if !local.is_empty() => (local.as_str(), DateSource::Local),
        (_, Some(utc)) if !utc.is_empty() => (utc.as_str(), DateSource::Utc),
        _ => return (now, DateSource::Fallback),
    };

    match parse_timestamp(raw) {
        Some(start) => (start, source),
        None => {
            debug!(activity.id = record.id, timestamp = raw, "Unparseable start time, using now");
            (now, DateSource::Fallback)
        }
    }
}

/// Parse a start timestamp into its wall-clock components
///
/// Accepts RFC 3339 (offset or `Z`), naive ISO date-times and bare dates.
/// The offset of an RFC 3339 value is discarded: Strava encodes local
/// times with a `Z` suffix.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}
