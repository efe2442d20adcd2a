// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

use super::ActivitySource;
use crate::config::StravaConfig;
use crate::constants::strava;
use crate::enrichment::{EnrichmentError, KudosGiver, KudosSource};
use crate::models::ActivityRecord;
use crate::oauth2_client::{OAuth2Client, OAuth2Config, OAuth2Error, OAuth2Token};

#[derive(Debug, thiserror::Error)]
pub enum StravaError {
    #[error("Strava API credentials are not configured")]
    MissingConfig,

    #[error("Unauthorized when calling the Strava API")]
    Unauthorized,

    #[error("Strava API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error(transparent)]
    OAuth(#[from] OAuth2Error),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Client for the Strava OAuth and activity endpoints
#[derive(Clone)]
pub struct StravaClient {
    client: Client,
    oauth: OAuth2Client,
    api_base: String,
}

impl StravaClient {
    pub fn new(config: &StravaConfig) -> Self {
        Self {
            client: Client::new(),
            oauth: OAuth2Client::new(OAuth2Config::from(config)),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn authorization_url(&self) -> Result<String, StravaError> {
        Ok(self.oauth.get_authorization_url()?)
    }

    pub async fn exchange_code(&self, code: &str) -> Result<OAuth2Token, StravaError> {
        let token = self.oauth.exchange_code(code).await?;
        info!("Exchanged Strava authorization code");
        Ok(token)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<OAuth2Token, StravaError> {
        let token = self.oauth.refresh_token(refresh_token).await?;
        info!("Strava token refreshed successfully");
        Ok(token)
    }

    /// Refresh `tokens` if they have expired, otherwise return them unchanged
    pub async fn ensure_fresh_token(&self, tokens: &OAuth2Token) -> Result<OAuth2Token, StravaError> {
        if !tokens.is_expired() {
            return Ok(tokens.clone());
        }
        let refresh = tokens.refresh_token.as_deref().ok_or(StravaError::Unauthorized)?;
        self.refresh_token(refresh).await
    }

    /// Fetch every activity started after `after`, one page at a time until
    /// an empty page
    pub async fn fetch_activities(
        &self,
        access_token: &str,
        after: i64,
    ) -> Result<Vec<ActivityRecord>, StravaError> {
        let url = format!("{}/athlete/activities", self.api_base);
        let mut activities = Vec::new();
        let mut page: u32 = 1;

        loop {
            let response = self
                .client
                .get(&url)
                .bearer_auth(access_token)
                .query(&[
                    ("after", after.to_string()),
                    ("per_page", strava::ACTIVITIES_PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ])
                .timeout(Duration::from_secs(strava::REQUEST_TIMEOUT_SECS))
                .send()
                .await?;

            let batch: Vec<ActivityRecord> = check_status(response).await?.json().await?;
            if batch.is_empty() {
                break;
            }
            debug!(page, count = batch.len(), "Fetched activity page");
            activities.extend(batch);
            page += 1;
        }

        info!(count = activities.len(), pages = page - 1, "Fetched Strava activities");
        Ok(activities)
    }

    /// Athletes who gave kudos on one activity
    pub async fn fetch_activity_kudos(
        &self,
        access_token: &str,
        activity_id: i64,
    ) -> Result<Vec<KudosGiver>, StravaError> {
        let response = self
            .client
            .get(format!("{}/activities/{}/kudos", self.api_base, activity_id))
            .bearer_auth(access_token)
            .timeout(Duration::from_secs(strava::REQUEST_TIMEOUT_SECS))
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StravaError> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(StravaError::Unauthorized),
        status if status.is_success() => Ok(response),
        status => Err(StravaError::Api {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        }),
    }
}

#[async_trait]
impl ActivitySource for StravaClient {
    async fn activities_since(&self, access_token: &str, after: i64) -> anyhow::Result<Vec<ActivityRecord>> {
        Ok(self.fetch_activities(access_token, after).await?)
    }

    fn provider_name(&self) -> &'static str {
        "Strava"
    }
}

/// Kudos lookups on behalf of one connected session
pub struct StravaKudosSource {
    client: StravaClient,
    access_token: String,
}

impl StravaKudosSource {
    pub fn new(client: StravaClient, access_token: impl Into<String>) -> Self {
        Self {
            client,
            access_token: access_token.into(),
        }
    }
}

#[async_trait]
impl KudosSource for StravaKudosSource {
    async fn kudos_givers(&self, activity_id: i64) -> Result<Vec<KudosGiver>, EnrichmentError> {
        self.client
            .fetch_activity_kudos(&self.access_token, activity_id)
            .await
            .map_err(|e| match e {
                StravaError::Unauthorized => EnrichmentError::Unauthorized,
                StravaError::Http(e) => EnrichmentError::Network(e.to_string()),
                other => EnrichmentError::LookupFailed {
                    activity_id,
                    reason: other.to_string(),
                },
            })
    }
}
