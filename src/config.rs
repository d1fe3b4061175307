//! Configuration loading from TOML.
//!
//! Every section has defaults, so the tool runs without a config file.
//! A file only needs the keys it wants to override.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

pub const DEFAULT_FIVETHIRTYEIGHT_URL: &str =
    "https://projects.fivethirtyeight.com/2020-general-data/presidential_state_toplines_2020.csv";
pub const DEFAULT_PREDICTIT_URL: &str = "https://www.predictit.org/api/marketdata/all/";

/// Label PredictIt's "DC" is rewritten to. Must match the forecast feed byte
/// for byte; kept as published, not corrected.
pub const DEFAULT_DISTRICT_LABEL: &str = "District of Colombia";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub sources: SourcesConfig,
    pub report: ReportConfig,
    pub normalization: NormalizationConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    pub fivethirtyeight_url: String,
    pub predictit_url: String,
    /// Per-request timeout. Not a retry policy.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            fivethirtyeight_url: DEFAULT_FIVETHIRTYEIGHT_URL.to_string(),
            predictit_url: DEFAULT_PREDICTIT_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("forecast-diff/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReportConfig {
    /// How many of the largest divergences to list.
    pub top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top_n: 5 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NormalizationConfig {
    pub district_label: String,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            district_label: DEFAULT_DISTRICT_LABEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    /// A file that exists but doesn't parse is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.sources.fivethirtyeight_url, DEFAULT_FIVETHIRTYEIGHT_URL);
        assert_eq!(cfg.sources.predictit_url, DEFAULT_PREDICTIT_URL);
        assert_eq!(cfg.sources.timeout_secs, 30);
        assert_eq!(cfg.report.top_n, 5);
        assert_eq!(cfg.normalization.district_label, "District of Colombia");
    }

    #[test]
    fn test_partial_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[report]\ntop_n = 10\n\n[normalization]\ndistrict_label = \"District of Columbia\""
        )
        .unwrap();

        let cfg = AppConfig::load(file.path()).unwrap();
        assert_eq!(cfg.report.top_n, 10);
        assert_eq!(cfg.normalization.district_label, "District of Columbia");
        // Untouched sections keep their defaults
        assert_eq!(cfg.sources.predictit_url, DEFAULT_PREDICTIT_URL);
        assert_eq!(cfg.sources.timeout_secs, 30);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_or_default(dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.report.top_n, 5);
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[report\ntop_n = ").unwrap();
        assert!(AppConfig::load_or_default(file.path()).is_err());
    }
}
