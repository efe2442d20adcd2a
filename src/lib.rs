// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Year in Review
//!
//! Turns a year of Strava activities into a personal review: totals and
//! streaks, weekly and monthly trends, ranked highlights, narrative facts
//! and a "wrapped" report with social stats.
//!
//! ## Features
//!
//! - **Aggregation engine**: pure, synchronous views over normalized activities
//! - **Wrapped report**: superlatives, distributions and optional kudos enrichment
//! - **Strava client**: OAuth2 code flow, token refresh, paginated activity retrieval
//! - **HTTP API**: cookie sessions and JSON endpoints for a web frontend
//!
//! ## Architecture
//!
//! - **Models**: raw activity records and their normalized form
//! - **Aggregation**: summary, trends, highlights, facts and wrapped report
//! - **Enrichment**: the kudos capability the wrapped report depends on
//! - **Providers**: Strava-backed activity retrieval and kudos lookups
//! - **Session / Routes**: in-memory session store and warp endpoints
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use year_in_review::aggregation::{facts, summarize};
//! use year_in_review::config::ReviewConfig;
//! use year_in_review::models::{Activity, ActivityRecord};
//!
//! fn main() -> anyhow::Result<()> {
//!     let raw = std::fs::read_to_string("activities.json")?;
//!     let records: Vec<ActivityRecord> = serde_json::from_str(&raw)?;
//!     let activities = Activity::from_records(&records);
//!
//!     let config = ReviewConfig::load(None)?;
//!     let summary = summarize(&activities, "Run", &config.summary);
//!     for line in facts(&summary).facts {
//!         println!("{}", line);
//!     }
//!     Ok(())
//! }
//! ```

/// Derived views: summary, trends, highlights, facts, wrapped report
pub mod aggregation;

/// Configuration management and persistence
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Kudos lookups used to enrich the wrapped report
pub mod enrichment;

/// Production logging and structured output
pub mod logging;

/// Activity records and their normalized form
pub mod models;

/// OAuth2 client for the Strava token endpoint
pub mod oauth2_client;

/// Activity and kudos providers
pub mod providers;

/// HTTP routes for sessions, OAuth and review views
pub mod routes;

/// In-memory per-session state
pub mod session;
