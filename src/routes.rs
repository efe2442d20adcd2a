// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! HTTP routes for the session, the Strava OAuth flow and the review views

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{info, warn};
use warp::http::{StatusCode, Uri};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::aggregation::{
    activities_in_period, activities_on_day, build_wrapped, facts, highlights, summarize, trends,
    ActivityHighlight, FactSet, HighlightSet, SummaryView, TrendSeries, WrappedReport,
};
use crate::config::{Config, ReviewConfig};
use crate::constants::{defaults, session::{COOKIE_NAME, MAX_IDLE_HOURS}};
use crate::logging::AppLogger;
use crate::models::{parse_timestamp, Activity};
use crate::oauth2_client::OAuth2Token;
use crate::providers::strava::{StravaClient, StravaError, StravaKudosSource};
use crate::providers::ActivitySource;
use crate::session::{CachedView, SessionStore};

/// Error reply of every handler
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, detail)
    }

    fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }
}

impl warp::reject::Reject for ApiError {}

impl From<StravaError> for ApiError {
    fn from(error: StravaError) -> Self {
        let status = match error {
            StravaError::MissingConfig => StatusCode::INTERNAL_SERVER_ERROR,
            StravaError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, error.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthUrlResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    #[serde(default = "default_activity_type")]
    pub activity_type: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub start: String,
    pub end: String,
    #[serde(default = "default_activity_type")]
    pub activity_type: String,
}

fn default_activity_type() -> String {
    defaults::ALL_TYPES.to_string()
}

/// Handlers for every endpoint, sharing one session store
#[derive(Clone)]
pub struct ReviewRoutes {
    sessions: SessionStore,
    strava: Option<StravaClient>,
    review: Arc<ReviewConfig>,
    frontend_url: String,
}

impl ReviewRoutes {
    pub fn new(config: &Config, review: ReviewConfig, sessions: SessionStore) -> Self {
        Self {
            sessions,
            strava: config.strava.as_ref().map(StravaClient::new),
            review: Arc::new(review),
            frontend_url: config.server.frontend_url.clone(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Return the caller's session, creating one (and its cookie) if needed
    pub async fn session(&self, cookie: Option<String>) -> Response {
        if let Some(session_id) = cookie {
            if self.sessions.contains(&session_id).await {
                return warp::reply::json(&SessionResponse { session_id }).into_response();
            }
        }

        self.sessions
            .evict_idle(Utc::now(), Duration::hours(MAX_IDLE_HOURS))
            .await;
        let session_id = uuid::Uuid::new_v4().to_string();
        self.sessions.init_session(&session_id).await;
        info!(session.id = %session_id, "New session");

        let cookie = format!("{}={}; HttpOnly; SameSite=Lax; Path=/", COOKIE_NAME, session_id);
        warp::reply::with_header(
            warp::reply::json(&SessionResponse { session_id }),
            "set-cookie",
            cookie,
        )
        .into_response()
    }

    pub fn auth_url(&self) -> Result<AuthUrlResponse, ApiError> {
        let url = self.strava_client()?.authorization_url()?;
        Ok(AuthUrlResponse { url })
    }

    /// Finish the OAuth flow: store tokens, load this year's activities and
    /// send the browser back to the frontend
    pub async fn callback(&self, cookie: Option<String>, code: &str) -> Result<Response, ApiError> {
        let session_id = self.require_session(cookie).await?;
        let client = self.strava_client()?;

        let tokens = client.exchange_code(code).await.map_err(|e| {
            AppLogger::log_oauth_event(&session_id, "code_exchange", false);
            ApiError::bad_request(e.to_string())
        })?;
        AppLogger::log_oauth_event(&session_id, "code_exchange", true);
        self.sessions.set_tokens(&session_id, tokens.clone()).await;

        let after = start_of_year_timestamp(Utc::now().date_naive());
        let records = client
            .activities_since(&tokens.access_token, after)
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        self.sessions.set_activities(&session_id, &records).await;
        info!(session.id = %session_id, provider = client.provider_name(), count = records.len(), "Activities loaded");

        let uri: Uri = self
            .frontend_url
            .parse()
            .map_err(|_| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Invalid frontend URL"))?;
        Ok(warp::redirect::temporary(uri).into_response())
    }

    pub async fn summary(&self, cookie: Option<String>, activity_type: &str) -> Result<SummaryView, ApiError> {
        let (session_id, activities) = self.session_activities(cookie).await?;
        let view = summarize(&activities, activity_type, &self.review.summary);
        AppLogger::log_view_computed(&session_id, "summary", activity_type, activities.len());
        self.sessions.cache_view(&session_id, CachedView::Summary(view.clone())).await;
        Ok(view)
    }

    pub async fn trends(&self, cookie: Option<String>, activity_type: &str) -> Result<TrendSeries, ApiError> {
        let (session_id, activities) = self.session_activities(cookie).await?;
        let view = trends(&activities, activity_type);
        AppLogger::log_view_computed(&session_id, "trends", activity_type, activities.len());
        self.sessions.cache_view(&session_id, CachedView::Trends(view.clone())).await;
        Ok(view)
    }

    pub async fn highlights(&self, cookie: Option<String>, activity_type: &str) -> Result<HighlightSet, ApiError> {
        let (session_id, activities) = self.session_activities(cookie).await?;
        let rules = &self.review.highlights;
        let view = highlights(&activities, rules.top_n, activity_type, rules);
        AppLogger::log_view_computed(&session_id, "highlights", activity_type, activities.len());
        self.sessions.cache_view(&session_id, CachedView::Highlights(view.clone())).await;
        Ok(view)
    }

    pub async fn facts(&self, cookie: Option<String>, activity_type: &str) -> Result<FactSet, ApiError> {
        let (session_id, activities) = self.session_activities(cookie).await?;
        let view = facts(&summarize(&activities, activity_type, &self.review.summary));
        AppLogger::log_view_computed(&session_id, "facts", activity_type, activities.len());
        self.sessions.cache_view(&session_id, CachedView::Facts(view.clone())).await;
        Ok(view)
    }

    pub async fn wrapped(&self, cookie: Option<String>, activity_type: &str) -> Result<WrappedReport, ApiError> {
        let session_id = self.require_session(cookie).await?;
        let tokens = self.fresh_tokens(&session_id).await?;
        let activities = self.sessions.activities(&session_id).await;

        let kudos = StravaKudosSource::new(self.strava_client()?.clone(), tokens.access_token);
        let view = build_wrapped(&activities, activity_type, &self.review.enrichment, Some(&kudos)).await;

        AppLogger::log_view_computed(&session_id, "wrapped", activity_type, activities.len());
        self.sessions.cache_view(&session_id, CachedView::Wrapped(view.clone())).await;
        Ok(view)
    }

    /// Activities of one day. A malformed date matches nothing.
    pub async fn day(
        &self,
        cookie: Option<String>,
        date: &str,
        activity_type: &str,
    ) -> Result<Vec<ActivityHighlight>, ApiError> {
        let (_, activities) = self.session_activities(cookie).await?;
        Ok(match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(date) => activities_on_day(&activities, date, activity_type),
            Err(_) => Vec::new(),
        })
    }

    pub async fn period(&self, cookie: Option<String>, query: &PeriodQuery) -> Result<Vec<ActivityHighlight>, ApiError> {
        let (_, activities) = self.session_activities(cookie).await?;
        let (start, end) = match (parse_timestamp(&query.start), parse_timestamp(&query.end)) {
            (Some(start), Some(end)) => (start.date(), end.date()),
            _ => return Err(ApiError::bad_request("Invalid date format")),
        };
        Ok(activities_in_period(&activities, start, end, &query.activity_type))
    }

    async fn require_session(&self, cookie: Option<String>) -> Result<String, ApiError> {
        match cookie {
            Some(session_id) if self.sessions.contains(&session_id).await => Ok(session_id),
            _ => Err(ApiError::unauthorized("Session not found")),
        }
    }

    /// Session tokens, refreshed and stored back when expired
    async fn fresh_tokens(&self, session_id: &str) -> Result<OAuth2Token, ApiError> {
        let tokens = self
            .sessions
            .tokens(session_id)
            .await
            .ok_or_else(|| ApiError::unauthorized("Not connected to Strava"))?;

        if !tokens.is_expired() {
            return Ok(tokens);
        }

        let fresh = self.strava_client()?.ensure_fresh_token(&tokens).await.map_err(|e| {
            AppLogger::log_oauth_event(session_id, "token_refresh", false);
            ApiError::from(e)
        })?;
        AppLogger::log_oauth_event(session_id, "token_refresh", true);
        self.sessions.set_tokens(session_id, fresh.clone()).await;
        Ok(fresh)
    }

    async fn session_activities(&self, cookie: Option<String>) -> Result<(String, Vec<Activity>), ApiError> {
        let session_id = self.require_session(cookie).await?;
        self.fresh_tokens(&session_id).await?;
        let activities = self.sessions.activities(&session_id).await;
        Ok((session_id, activities))
    }

    fn strava_client(&self) -> Result<&StravaClient, ApiError> {
        self.strava
            .as_ref()
            .ok_or_else(|| ApiError::from(StravaError::MissingConfig))
    }

    /// Every route, with rejections turned into JSON error replies
    pub fn filter(&self) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
        let session_cookie = || warp::cookie::optional::<String>(COOKIE_NAME);

        let session = warp::path!("api" / "session")
            .and(warp::get())
            .and(session_cookie())
            .and(with_routes(self.clone()))
            .then(|cookie: Option<String>, routes: ReviewRoutes| async move {
                routes.session(cookie).await
            });

        let auth_url = warp::path!("api" / "auth" / "strava" / "url")
            .and(warp::get())
            .and(with_routes(self.clone()))
            .and_then(|routes: ReviewRoutes| async move {
                json_or_reject(routes.auth_url())
            });

        let callback = warp::path!("auth" / "strava" / "callback")
            .and(warp::get())
            .and(session_cookie())
            .and(warp::query::<CallbackQuery>())
            .and(with_routes(self.clone()))
            .and_then(|cookie: Option<String>, query: CallbackQuery, routes: ReviewRoutes| async move {
                routes.callback(cookie, &query.code).await.map_err(warp::reject::custom)
            });

        let summary = warp::path!("api" / "summary")
            .and(warp::get())
            .and(session_cookie())
            .and(warp::query::<ViewQuery>())
            .and(with_routes(self.clone()))
            .and_then(|cookie: Option<String>, query: ViewQuery, routes: ReviewRoutes| async move {
                json_or_reject(routes.summary(cookie, &query.activity_type).await)
            });

        let trends = warp::path!("api" / "trends")
            .and(warp::get())
            .and(session_cookie())
            .and(warp::query::<ViewQuery>())
            .and(with_routes(self.clone()))
            .and_then(|cookie: Option<String>, query: ViewQuery, routes: ReviewRoutes| async move {
                json_or_reject(routes.trends(cookie, &query.activity_type).await)
            });

        let highlights = warp::path!("api" / "highlights")
            .and(warp::get())
            .and(session_cookie())
            .and(warp::query::<ViewQuery>())
            .and(with_routes(self.clone()))
            .and_then(|cookie: Option<String>, query: ViewQuery, routes: ReviewRoutes| async move {
                json_or_reject(routes.highlights(cookie, &query.activity_type).await)
            });

        let facts = warp::path!("api" / "facts")
            .and(warp::get())
            .and(session_cookie())
            .and(warp::query::<ViewQuery>())
            .and(with_routes(self.clone()))
            .and_then(|cookie: Option<String>, query: ViewQuery, routes: ReviewRoutes| async move {
                json_or_reject(routes.facts(cookie, &query.activity_type).await)
            });

        let wrapped = warp::path!("api" / "wrapped")
            .and(warp::get())
            .and(session_cookie())
            .and(warp::query::<ViewQuery>())
            .and(with_routes(self.clone()))
            .and_then(|cookie: Option<String>, query: ViewQuery, routes: ReviewRoutes| async move {
                json_or_reject(routes.wrapped(cookie, &query.activity_type).await)
            });

        let day = warp::path!("api" / "day" / String)
            .and(warp::get())
            .and(session_cookie())
            .and(warp::query::<ViewQuery>())
            .and(with_routes(self.clone()))
            .and_then(
                |date: String, cookie: Option<String>, query: ViewQuery, routes: ReviewRoutes| async move {
                    json_or_reject(routes.day(cookie, &date, &query.activity_type).await)
                },
            );

        let period = warp::path!("api" / "period")
            .and(warp::get())
            .and(session_cookie())
            .and(warp::query::<PeriodQuery>())
            .and(with_routes(self.clone()))
            .and_then(|cookie: Option<String>, query: PeriodQuery, routes: ReviewRoutes| async move {
                json_or_reject(routes.period(cookie, &query).await)
            });

        let health = warp::path("health").and(warp::get()).map(|| {
            warp::reply::json(&serde_json::json!({"status": "ok", "service": "year-in-review"}))
        });

        session
            .or(auth_url)
            .or(callback)
            .or(summary)
            .or(trends)
            .or(highlights)
            .or(facts)
            .or(wrapped)
            .or(day)
            .or(period)
            .or(health)
            .recover(handle_rejection)
    }

    /// Serve every route on `port` until the process exits
    pub async fn serve(self, port: u16, allowed_origin: &str) -> Result<()> {
        let origin = url::Url::parse(allowed_origin)
            .with_context(|| format!("Invalid allowed origin: {}", allowed_origin))?
            .origin();
        if !origin.is_tuple() {
            anyhow::bail!("Allowed origin must be scheme://host[:port]: {}", allowed_origin);
        }

        let cors = warp::cors()
            .allow_origin(origin.ascii_serialization().as_str())
            .allow_credentials(true)
            .allow_headers(vec!["content-type"])
            .allow_methods(vec!["GET", "OPTIONS"]);

        let log = warp::log::custom(|request| {
            AppLogger::log_api_request(
                request.method().as_str(),
                request.path(),
                request.status().as_u16(),
                request.elapsed().as_millis() as u64,
            );
        });

        info!("HTTP server ready on port {}", port);
        warp::serve(self.filter().with(cors).with(log))
            .run(([127, 0, 0, 1], port))
            .await;

        Ok(())
    }
}

fn with_routes(routes: ReviewRoutes) -> impl Filter<Extract = (ReviewRoutes,), Error = Infallible> + Clone {
    warp::any().map(move || routes.clone())
}

fn json_or_reject<T: Serialize>(result: Result<T, ApiError>) -> Result<warp::reply::Json, Rejection> {
    result
        .map(|value| warp::reply::json(&value))
        .map_err(warp::reject::custom)
}

/// Unix timestamp of January 1, 00:00 UTC, of `today`'s year
pub fn start_of_year_timestamp(today: NaiveDate) -> i64 {
    today
        .with_ordinal(1)
        .unwrap_or(today)
        .and_time(NaiveTime::MIN)
        .and_utc()
        .timestamp()
}

/// Turn rejections into `{"detail": ...}` replies
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, detail) = if let Some(api_error) = err.find::<ApiError>() {
        (api_error.status, api_error.detail.clone())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".to_string())
    } else {
        warn!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
    };

    let json = warp::reply::json(&serde_json::json!({ "detail": detail }));
    Ok(warp::reply::with_status(json, status))
}
