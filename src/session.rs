// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Session Store
//!
//! In-memory per-browser state: Strava tokens, the fetched activities and
//! the most recently computed views.
//!
//! ## Design Principles
//!
//! - **Explicit handle**: the store is created by the server and passed to
//!   the routes; there is no global instance.
//! - **Explicit lifecycle**: a session exists only after `init_session`;
//!   every other operation on an unknown id is a no-op or `None`.
//! - **Bounded growth**: sessions idle for longer than a cutoff are dropped
//!   by `evict_idle`. Idle time counts from the last activity fetch, or from
//!   creation when nothing was fetched.
//! - **Cheap clones**: cloning the store clones the `Arc`, not the data.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::aggregation::{FactSet, HighlightSet, SummaryView, TrendSeries, WrappedReport};
use crate::models::{Activity, ActivityRecord};
use crate::oauth2_client::OAuth2Token;

/// Last computed view of each kind
#[derive(Debug, Clone, Default)]
pub struct CachedViews {
    pub summary: Option<SummaryView>,
    pub trends: Option<TrendSeries>,
    pub highlights: Option<HighlightSet>,
    pub facts: Option<FactSet>,
    pub wrapped: Option<WrappedReport>,
}

/// A view computed for a session, ready to be cached
#[derive(Debug, Clone)]
pub enum CachedView {
    Summary(SummaryView),
    Trends(TrendSeries),
    Highlights(HighlightSet),
    Facts(FactSet),
    Wrapped(WrappedReport),
}

#[derive(Debug, Clone, Default)]
pub struct SessionEntry {
    pub tokens: Option<OAuth2Token>,
    pub activities: Vec<Activity>,
    pub last_fetched: Option<DateTime<Utc>>,
    pub views: CachedViews,
    pub created_at: Option<DateTime<Utc>>,
}

impl SessionEntry {
    fn last_active(&self) -> Option<DateTime<Utc>> {
        self.last_fetched.or(self.created_at)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session. An existing session is left untouched.
    pub async fn init_session(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        if !sessions.contains_key(session_id) {
            let entry = SessionEntry {
                created_at: Some(Utc::now()),
                ..Default::default()
            };
            sessions.insert(session_id.to_string(), entry);
            debug!(session_id, "Session created");
        }
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    pub async fn set_tokens(&self, session_id: &str, tokens: OAuth2Token) {
        if let Some(entry) = self.sessions.write().await.get_mut(session_id) {
            entry.tokens = Some(tokens);
        }
    }

    pub async fn tokens(&self, session_id: &str) -> Option<OAuth2Token> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .and_then(|entry| entry.tokens.clone())
    }

    /// Normalize and store freshly fetched records, stamping the fetch time
    ///
    /// Previously cached views are discarded.
    pub async fn set_activities(&self, session_id: &str, records: &[ActivityRecord]) {
        let activities = Activity::from_records(records);
        if let Some(entry) = self.sessions.write().await.get_mut(session_id) {
            entry.activities = activities;
            entry.last_fetched = Some(Utc::now());
            entry.views = CachedViews::default();
        }
    }

    /// Stored activities; empty for an unknown session
    pub async fn activities(&self, session_id: &str) -> Vec<Activity> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|entry| entry.activities.clone())
            .unwrap_or_default()
    }

    pub async fn last_fetched(&self, session_id: &str) -> Option<DateTime<Utc>> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .and_then(|entry| entry.last_fetched)
    }

    pub async fn cache_view(&self, session_id: &str, view: CachedView) {
        if let Some(entry) = self.sessions.write().await.get_mut(session_id) {
            let views = &mut entry.views;
            match view {
                CachedView::Summary(v) => views.summary = Some(v),
                CachedView::Trends(v) => views.trends = Some(v),
                CachedView::Highlights(v) => views.highlights = Some(v),
                CachedView::Facts(v) => views.facts = Some(v),
                CachedView::Wrapped(v) => views.wrapped = Some(v),
            }
        }
    }

    pub async fn cached_views(&self, session_id: &str) -> Option<CachedViews> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|entry| entry.views.clone())
    }

    /// Drop sessions with no activity since `now - max_idle`
    ///
    /// Returns the number of sessions removed.
    pub async fn evict_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> usize {
        let cutoff = now - max_idle;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_active().map_or(true, |seen| seen >= cutoff));
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, "Idle sessions evicted");
        }
        evicted
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
