// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration management for the year-in-review server

pub mod review_config;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::env_config;

pub use review_config::{
    ActivityCountPolicy, EnrichmentLimits, HighlightRules, ReviewConfig, SummaryConfig,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub strava: Option<StravaConfig>,
    #[serde(default)]
    pub server: ServerConfig,
}

/// OAuth client settings for the Strava API
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StravaConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    #[serde(default = "env_config::strava_api_base")]
    pub api_base: String,
    #[serde(default = "env_config::strava_auth_url")]
    pub auth_url: String,
    #[serde(default = "env_config::strava_token_url")]
    pub token_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Where the OAuth callback sends the browser once activities are loaded
    pub frontend_url: String,
    /// Origin allowed by CORS
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: env_config::http_port(),
            frontend_url: env_config::frontend_url(),
            allowed_origin: "http://localhost:5173".to_string(),
        }
    }
}

fn default_config_path() -> String {
    dirs::config_dir()
        .map(|p| p.join("year-in-review/config.toml"))
        .unwrap_or_else(|| "config.toml".into())
        .to_string_lossy()
        .to_string()
}

impl Config {
    pub fn load(path: Option<String>) -> Result<Self> {
        let config_path = path.unwrap_or_else(default_config_path);

        if Path::new(&config_path).exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            toml::from_str(&content)
                .context("Failed to parse config file")
        } else {
            dotenv::dotenv().ok();
            Ok(Self::from_env())
        }
    }

    /// Build configuration from environment variables only
    pub fn from_env() -> Self {
        let strava = match (
            env_config::strava_client_id(),
            env_config::strava_client_secret(),
            env_config::strava_redirect_uri(),
        ) {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => Some(StravaConfig {
                client_id,
                client_secret,
                redirect_uri,
                api_base: env_config::strava_api_base(),
                auth_url: env_config::strava_auth_url(),
                token_url: env_config::strava_token_url(),
            }),
            _ => None,
        };

        Self {
            strava,
            server: ServerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper function to create a temporary config file
    fn create_temp_config_file(content: &str) -> (TempDir, String) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, content).expect("Failed to write temp config");
        (temp_dir, config_path.to_string_lossy().to_string())
    }

    #[test]
    fn test_config_load_from_file() {
        let config_content = r#"
[strava]
client_id = "file_client_id"
client_secret = "file_client_secret"
redirect_uri = "http://localhost:8000/auth/strava/callback"

[server]
port = 9000
frontend_url = "http://localhost:3000/"
"#;

        let (_temp_dir, config_path) = create_temp_config_file(config_content);
        let config = Config::load(Some(config_path)).expect("Failed to load config");

        let strava = config.strava.expect("strava section");
        assert_eq!(strava.client_id, "file_client_id");
        assert!(strava.token_url.ends_with("/oauth/token"));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.frontend_url, "http://localhost:3000/");
        assert_eq!(config.server.allowed_origin, "http://localhost:5173");
    }

    #[test]
    fn test_config_load_missing_env_vars() {
        let _guard = ENV_MUTEX.lock().unwrap();

        let original_client_id = std::env::var("STRAVA_CLIENT_ID").ok();
        std::env::remove_var("STRAVA_CLIENT_ID");

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nonexistent_config.toml");
        let config = Config::load(Some(config_path.to_string_lossy().to_string()))
            .expect("Failed to load empty config");

        assert!(config.strava.is_none());

        if let Some(val) = original_client_id {
            std::env::set_var("STRAVA_CLIENT_ID", val);
        }
    }

    #[test]
    fn test_config_from_env() {
        let _guard = ENV_MUTEX.lock().unwrap();

        std::env::set_var("STRAVA_CLIENT_ID", "env_id");
        std::env::set_var("STRAVA_CLIENT_SECRET", "env_secret");
        std::env::set_var("STRAVA_REDIRECT_URI", "http://localhost/cb");

        let config = Config::from_env();
        let strava = config.strava.expect("strava config from env");
        assert_eq!(strava.client_id, "env_id");
        assert_eq!(strava.redirect_uri, "http://localhost/cb");

        std::env::remove_var("STRAVA_CLIENT_ID");
        std::env::remove_var("STRAVA_CLIENT_SECRET");
        std::env::remove_var("STRAVA_REDIRECT_URI");
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let (_temp_dir, config_path) = create_temp_config_file("this is not valid toml [[[");

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to parse config file"));
    }
}
