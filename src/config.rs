//! Client configuration.
//!
//! Values come from a JSON file or from the environment (`.env` is honoured),
//! with command-line flags applied on top by `main`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::ocr::http::DEFAULT_ENDPOINT;
use crate::submission::BusyPolicy;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Where the recognition service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub busy_policy: BusyPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            busy_policy: BusyPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Read `INEC_OCR_URL`, `INEC_OCR_TIMEOUT_SECS` and `INEC_OCR_BUSY_POLICY`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("INEC_OCR_URL") {
            config.base_url = url;
        }
        if let Some(secs) = lookup("INEC_OCR_TIMEOUT_SECS") {
            config.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("INEC_OCR_TIMEOUT_SECS is not a number: {:?}", secs))?;
        }
        if let Some(policy) = lookup("INEC_OCR_BUSY_POLICY") {
            config.busy_policy = policy.parse().map_err(anyhow::Error::msg)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;

        let config: ClientConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;

        config.validate()?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Apply command-line overrides, held to the same rules as the other sources.
    pub fn apply_overrides(&mut self, url: Option<String>, timeout_secs: Option<u64>) -> Result<()> {
        if let Some(url) = url {
            self.base_url = url;
        }
        if let Some(secs) = timeout_secs {
            self.timeout_secs = secs;
        }
        self.validate()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout must be at least one second");
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            anyhow::bail!("base URL must start with http:// or https://: {}", self.base_url);
        }
        Ok(())
    }
}
