// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Social Enrichment
//!
//! Capability used by the wrapped report to learn who gave kudos on an
//! activity. The aggregation engine only sees this trait; the Strava-backed
//! implementation lives in [`crate::providers::strava`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants::defaults;

/// Someone who gave kudos on an activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KudosGiver {
    #[serde(default, alias = "firstname")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastname")]
    pub last_name: Option<String>,
}

impl KudosGiver {
    /// `"{first} {last}"` with surrounding whitespace removed, or a
    /// placeholder when both parts are empty
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let trimmed = name.trim();
        if trimmed.is_empty() {
            defaults::KUDOS_GIVER_NAME.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// Enrichment failures. Always recovered by the caller.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Kudos lookup failed for activity {activity_id}: {reason}")]
    LookupFailed { activity_id: i64, reason: String },

    #[error("Kudos lookup not authorized")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(String),
}

/// Source of kudos givers for a single activity
#[async_trait]
pub trait KudosSource: Send + Sync {
    async fn kudos_givers(&self, activity_id: i64) -> Result<Vec<KudosGiver>, EnrichmentError>;
}
