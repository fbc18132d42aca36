//! Widget configuration
//!
//! Values resolve in order: built-in defaults, an optional TOML file, the
//! `PHYSICIAN_COMPLETE_API_URL` environment variable, then whatever the host
//! overrides explicitly (command-line flags).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding the search API base URI
pub const API_URL_ENV: &str = "PHYSICIAN_COMPLETE_API_URL";

pub const DEFAULT_API_BASE_URI: &str = "http://www.bloomapi.com/api/";
pub const DEFAULT_QUIET_PERIOD_MS: u64 = 500;
pub const DEFAULT_LIMIT: usize = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// What leaving the dropdown with the mouse does to the highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MouseLeave {
    /// Clear the visual active marker, keep the stored highlight
    #[default]
    ClearMarker,
    /// Clear both the marker and the stored highlight
    ClearHighlight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub api_base_uri: String,
    /// Fixed practice zip prefix prepended to every query
    pub zip_code: Option<String>,
    pub quiet_period_ms: u64,
    pub limit: usize,
    pub request_timeout_secs: u64,
    /// Drop fetch outcomes that belong to an older request than the newest one sent
    pub discard_stale_responses: bool,
    pub mouse_leave: MouseLeave,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base_uri: DEFAULT_API_BASE_URI.to_string(),
            zip_code: None,
            quiet_period_ms: DEFAULT_QUIET_PERIOD_MS,
            limit: DEFAULT_LIMIT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            discard_stale_responses: true,
            mouse_leave: MouseLeave::default(),
        }
    }
}

impl WidgetConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Apply environment overrides, read through `lookup` (normally
    /// `std::env::var`)
    pub fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.api_base_uri = url;
        }
        self
    }

    pub fn with_api_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.api_base_uri = uri.into();
        self
    }

    pub fn with_zip_code(mut self, zip: impl Into<String>) -> Self {
        self.zip_code = Some(zip.into());
        self
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Zip filter, ignoring blank values
    pub fn zip_filter(&self) -> Option<&str> {
        self.zip_code
            .as_deref()
            .map(str::trim)
            .filter(|z| !z.is_empty())
    }

    /// Base URI with a guaranteed trailing slash
    pub fn normalized_base_uri(&self) -> String {
        let trimmed = self.api_base_uri.trim();
        if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        }
    }

    pub fn validate(&self) -> Result<()> {
        let uri = self.normalized_base_uri();
        url::Url::parse(&uri).map_err(|source| Error::InvalidBaseUri { uri, source })?;
        if self.limit == 0 {
            return Err(Error::Config("limit must be at least 1".to_string()));
        }
        Ok(())
    }
}
