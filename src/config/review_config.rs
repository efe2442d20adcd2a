// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Aggregation engine parameters: ranking rules, enrichment limits, count policy

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default location of the engine configuration file
pub const DEFAULT_REVIEW_CONFIG_FILE: &str = "review_config.toml";

/// Main engine configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub highlights: HighlightRules,
    #[serde(default)]
    pub enrichment: EnrichmentLimits,
}

/// Which record count a summary reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCountPolicy {
    /// Count of records left after the type filter
    #[default]
    Filtered,
    /// Count of every input record, regardless of the type filter
    Unfiltered,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default)]
    pub count_policy: ActivityCountPolicy,
}

/// Ranking and eligibility rules for the highlight lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightRules {
    /// Length of every ranked list
    pub top_n: usize,
    /// Type tag eligible for the fastest-run list
    pub run_type: String,
    /// A run must be strictly longer than this to rank as fastest
    pub run_min_distance_m: f64,
    /// Type tag eligible for the fastest-ride list
    pub ride_type: String,
    /// A ride must be strictly longer than this to rank as fastest
    pub ride_min_distance_m: f64,
    /// Floor on the moving-time divisor of ride speed, in hours
    pub ride_min_hours: f64,
}

/// Bounds on the social enrichment step of the wrapped report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentLimits {
    /// Most-kudoed activities looked up, at most one request each
    pub max_lookups: usize,
    /// Length of the top kudos-giver list
    pub top_givers: usize,
}

impl Default for HighlightRules {
    fn default() -> Self {
        Self {
            top_n: 5,
            run_type: "Run".to_string(),
            run_min_distance_m: 3000.0,
            ride_type: "Ride".to_string(),
            ride_min_distance_m: 5000.0,
            ride_min_hours: 0.1,
        }
    }
}

impl Default for EnrichmentLimits {
    fn default() -> Self {
        Self {
            max_lookups: 5,
            top_givers: 3,
        }
    }
}

impl ReviewConfig {
    /// Load engine configuration from file or use defaults
    pub fn load(path: Option<String>) -> Result<Self> {
        // Try explicit path first
        if let Some(config_path) = path {
            return Self::load_from_file(&config_path);
        }

        if Path::new(DEFAULT_REVIEW_CONFIG_FILE).exists() {
            return Self::load_from_file(DEFAULT_REVIEW_CONFIG_FILE);
        }

        // Fall back to embedded defaults
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read review config file: {}", path))?;

        let config: ReviewConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse review config file: {}", path))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_review_config() {
        let config = ReviewConfig::default();

        assert_eq!(config.summary.count_policy, ActivityCountPolicy::Filtered);
        assert_eq!(config.highlights.top_n, 5);
        assert_eq!(config.highlights.run_min_distance_m, 3000.0);
        assert_eq!(config.highlights.ride_min_distance_m, 5000.0);
        assert_eq!(config.highlights.ride_min_hours, 0.1);
        assert_eq!(config.enrichment.max_lookups, 5);
        assert_eq!(config.enrichment.top_givers, 3);
    }

    #[test]
    fn test_config_file_loading() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(
            temp_file,
            r#"
[summary]
count_policy = "unfiltered"

[highlights]
top_n = 3
run_min_distance_m = 5000.0
        "#
        )?;

        let path = temp_file.path().to_string_lossy().to_string();
        let config = ReviewConfig::load_from_file(&path)?;

        assert_eq!(config.summary.count_policy, ActivityCountPolicy::Unfiltered);
        assert_eq!(config.highlights.top_n, 3);
        assert_eq!(config.highlights.run_min_distance_m, 5000.0);
        // Unspecified fields keep their defaults
        assert_eq!(config.highlights.ride_min_distance_m, 5000.0);
        assert_eq!(config.enrichment, EnrichmentLimits::default());

        Ok(())
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "highlights = [[[").unwrap();
        let path = temp_file.path().to_string_lossy().to_string();

        let err = ReviewConfig::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse review config file"));
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        assert!(ReviewConfig::load(Some("/nonexistent/review_config.toml".to_string())).is_err());
    }
}
