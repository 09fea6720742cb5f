//! Query service configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ChatError, ChatResult};

/// Environment variable holding the query service base URL.
pub const API_URL_ENV: &str = "NODE_API";
/// Environment variable overriding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "SHEETCHAT_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the query service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    api_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from `NODE_API` and `SHEETCHAT_TIMEOUT_SECS`.
    pub fn from_env() -> ChatResult<Self> {
        let base_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ChatError::Config(format!("{} is not set", API_URL_ENV)))?;

        let mut config = Self::new(base_url.trim());
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                ChatError::Config(format!("{} must be a number of seconds, got '{}'", TIMEOUT_ENV, raw))
            })?;
            config.timeout = timeout_from_secs(secs, TIMEOUT_ENV)?;
        }
        Ok(config)
    }

    /// Load from `<workspace_root>/.sheetchat/settings.json`.
    pub fn from_settings(workspace_root: &Path) -> ChatResult<Self> {
        let settings_path = workspace_root.join(".sheetchat").join("settings.json");
        let content = std::fs::read_to_string(&settings_path).map_err(|e| {
            ChatError::Config(format!("cannot read {}: {}", settings_path.display(), e))
        })?;
        let settings: SettingsFile = serde_json::from_str(&content).map_err(|e| {
            ChatError::Config(format!("invalid {}: {}", settings_path.display(), e))
        })?;

        let api_url = settings
            .api_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                ChatError::Config(format!("{} has no apiUrl", settings_path.display()))
            })?;

        let mut config = Self::new(api_url.trim());
        if let Some(secs) = settings.timeout_secs {
            config.timeout = timeout_from_secs(secs, "timeoutSecs")?;
        }
        Ok(config)
    }

    /// Settings file first, environment as fallback.
    pub fn load(workspace_root: &Path) -> ChatResult<Self> {
        Self::from_settings(workspace_root).or_else(|err| {
            debug!(%err, "No usable settings file, falling back to environment");
            Self::from_env()
        })
    }

    /// Full URL of an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// A zero timeout would fail every request, so it is rejected.
fn timeout_from_secs(secs: u64, source: &str) -> ChatResult<Duration> {
    if secs == 0 {
        return Err(ChatError::Config(format!("{} must be at least 1 second", source)));
    }
    Ok(Duration::from_secs(secs))
}
