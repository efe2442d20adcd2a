// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Application constants and environment-based configuration values.
//! This module provides both hardcoded constants and environment variable configuration.

use std::env;

/// Defaults substituted during normalization
pub mod defaults {
    /// Display name for an activity without one
    pub const ACTIVITY_NAME: &str = "Activity";

    /// Type tag for an activity without one
    pub const ACTIVITY_TYPE: &str = "Ride";

    /// Type filter value meaning "no filtering"
    pub const ALL_TYPES: &str = "All";

    /// Giver name used when a kudos giver has no name
    pub const KUDOS_GIVER_NAME: &str = "Friend";
}

/// Unit conversion factors
pub mod units {
    pub const METERS_PER_KM: f64 = 1000.0;
    pub const SECONDS_PER_HOUR: f64 = 3600.0;
    pub const SECONDS_PER_MINUTE: f64 = 60.0;
    /// m/s to km/h
    pub const MS_TO_KMH: f64 = 3.6;
}

/// Reference quantities used by the narrative facts
pub mod references {
    /// Paris to Berlin, in km
    pub const PARIS_BERLIN_KM: f64 = 878.0;
    /// Earth's equatorial circumference, in km
    pub const EARTH_CIRCUMFERENCE_KM: f64 = 40075.0;
    /// Mount Everest, in m
    pub const EVEREST_M: f64 = 8848.0;
    /// Ben Nevis, in m
    pub const BEN_NEVIS_M: f64 = 1345.0;
    /// Length of a workday, in hours
    pub const WORKDAY_HOURS: f64 = 8.0;
}

/// Calendar labels
pub mod calendar {
    /// Weekday display names, Monday first
    pub const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
}

/// Strava endpoints
pub mod strava {
    /// Base of the public activity detail page
    pub const ACTIVITY_PAGE_BASE: &str = "https://www.strava.com/activities";
    pub const API_BASE: &str = "https://www.strava.com/api/v3";
    pub const AUTH_URL: &str = "https://www.strava.com/oauth/authorize";
    pub const TOKEN_URL: &str = "https://www.strava.com/oauth/token";
    /// Scope required to read private activities
    pub const SCOPE: &str = "activity:read_all";
    /// Page size used when listing activities
    pub const ACTIVITIES_PER_PAGE: u32 = 100;
    /// Timeout for token requests, in seconds
    pub const TOKEN_TIMEOUT_SECS: u64 = 20;
    /// Timeout for data requests, in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Detail page URL of an activity
    pub fn activity_url(id: i64) -> String {
        format!("{}/{}", ACTIVITY_PAGE_BASE, id)
    }
}

/// HTTP session settings
pub mod session {
    /// Name of the cookie carrying the session identifier
    pub const COOKIE_NAME: &str = "review_session";

    /// Sessions idle for longer than this are dropped when a new one is created
    pub const MAX_IDLE_HOURS: i64 = 24;
}

/// Environment-based configuration
pub mod env_config {
    use super::env;

    /// Get HTTP server port from environment or default
    pub fn http_port() -> u16 {
        env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .unwrap_or(8000)
    }

    /// Get Strava client ID from environment
    pub fn strava_client_id() -> Option<String> {
        env::var("STRAVA_CLIENT_ID").ok()
    }

    /// Get Strava client secret from environment
    pub fn strava_client_secret() -> Option<String> {
        env::var("STRAVA_CLIENT_SECRET").ok()
    }

    /// Get Strava redirect URI from environment
    pub fn strava_redirect_uri() -> Option<String> {
        env::var("STRAVA_REDIRECT_URI").ok()
    }

    /// Get Strava API base URL from environment or default
    pub fn strava_api_base() -> String {
        env::var("STRAVA_API_BASE").unwrap_or_else(|_| super::strava::API_BASE.to_string())
    }

    /// Get Strava auth URL from environment or default
    pub fn strava_auth_url() -> String {
        env::var("STRAVA_AUTH_URL").unwrap_or_else(|_| super::strava::AUTH_URL.to_string())
    }

    /// Get Strava token URL from environment or default
    pub fn strava_token_url() -> String {
        env::var("STRAVA_TOKEN_URL").unwrap_or_else(|_| super::strava::TOKEN_URL.to_string())
    }

    /// Get the frontend URL the OAuth callback redirects to
    pub fn frontend_url() -> String {
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173/".to_string())
    }

    /// Get log level from environment or default
    pub fn log_level() -> String {
        env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_url() {
        assert_eq!(strava::activity_url(42), "https://www.strava.com/activities/42");
    }

    #[test]
    fn test_weekday_names_start_monday() {
        assert_eq!(calendar::WEEKDAY_NAMES[0], "Mon");
        assert_eq!(calendar::WEEKDAY_NAMES[6], "Sun");
    }

    #[test]
    fn test_env_defaults() {
        env::remove_var("STRAVA_API_BASE");
        assert_eq!(env_config::strava_api_base(), "https://www.strava.com/api/v3");
        assert!(env_config::strava_token_url().ends_with("/oauth/token"));
    }
}
