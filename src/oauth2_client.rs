// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! OAuth2 authorization-code flow against the Strava token endpoint

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::config::StravaConfig;
use crate::constants::strava;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl From<&StravaConfig> for OAuth2Config {
    fn from(config: &StravaConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: vec![strava::SCOPE.to_string()],
        }
    }
}

/// Tokens held for a connected session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuth2Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Expiry as a Unix timestamp, in seconds
    pub expires_at: Option<i64>,
}

impl OAuth2Token {
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// A token without an expiry never expires
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at < now)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OAuth2Error {
    #[error("Invalid authorization URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Token endpoint rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct OAuth2Client {
    config: OAuth2Config,
    client: reqwest::Client,
}

impl OAuth2Client {
    pub fn new(config: OAuth2Config) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn get_authorization_url(&self) -> Result<String, OAuth2Error> {
        let mut url = Url::parse(&self.config.auth_url)?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(","));

        Ok(url.to_string())
    }

    pub async fn exchange_code(&self, code: &str) -> Result<OAuth2Token, OAuth2Error> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];

        let response = self.post_token_request(&params).await?;
        Ok(response.into_token(None))
    }

    /// Exchange a refresh token for a new access token
    ///
    /// Strava may omit the refresh token from the reply, in which case the
    /// one passed in stays valid.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<OAuth2Token, OAuth2Error> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = self.post_token_request(&params).await?;
        Ok(response.into_token(Some(refresh_token)))
    }

    async fn post_token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse, OAuth2Error> {
        let response = self
            .client
            .post(&self.config.token_url)
            .timeout(Duration::from_secs(strava::TOKEN_TIMEOUT_SECS))
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuth2Error::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_token(self, previous_refresh: Option<&str>) -> OAuth2Token {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|seconds| Utc::now().timestamp() + seconds));

        OAuth2Token {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string)),
            expires_at,
        }
    }
}
