//! Credential and endpoint configuration
//!
//! Loaded from `config.toml` (or a `.yaml`/`.yml` file with the same layout):
//!
//! ```toml
//! [app]
//! token = "AAAA..."
//! legacy = false
//!
//! [users]
//! alice = "session-token"
//!
//! [api]
//! base_url = "https://api.twitter.com"
//! version = "1.1"
//! suffix = ".json"
//! ```

use crate::error::{Error, Result};
use crate::http::ClientContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Config file used when none is given
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Version segment used for the v2 API
pub const API_V2_VERSION: &str = "2";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete credential file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application credentials
    pub app: AppSection,

    /// Session tokens keyed by user name
    #[serde(default)]
    pub users: BTreeMap<String, String>,

    /// Endpoint layout
    #[serde(default)]
    pub api: ApiSection,
}

/// `[app]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSection {
    /// Application bearer token
    pub token: String,

    /// Use the short legacy CSRF token format
    #[serde(default)]
    pub legacy: bool,
}

/// `[api]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    /// Scheme and host of the API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Default version path segment
    #[serde(default = "default_version")]
    pub version: String,

    /// Suffix appended to every endpoint
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            version: default_version(),
            suffix: default_suffix(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.twitter.com".to_string()
}

fn default_version() -> String {
    "1.1".to_string()
}

fn default_suffix() -> String {
    ".json".to_string()
}

// ============================================================================
// Loading
// ============================================================================

impl AppConfig {
    /// Load a config file; `.yaml`/`.yml` files are parsed as YAML, anything else as TOML
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file '{}': {e}", path.display()))
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Parse TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.app.token.trim().is_empty() {
            return Err(Error::missing_field("app.token"));
        }

        let base = Url::parse(&self.api.base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "api.base_url",
                format!("unsupported scheme '{}'", base.scheme()),
            ));
        }

        Ok(())
    }

    // ========================================================================
    // Derived values
    // ========================================================================

    /// Session token for a user; `None` when no user is given
    pub fn session_token(&self, user: Option<&str>) -> Result<Option<String>> {
        let Some(user) = user else {
            return Ok(None);
        };

        match self.users.get(user) {
            Some(token) => Ok(Some(token.clone())),
            None => Err(Error::config(format!(
                "Unknown user '{user}'; add it to the [users] section"
            ))),
        }
    }

    /// Build the immutable client context for a run
    pub fn client_context(&self, user: Option<&str>, timeout: Duration) -> Result<ClientContext> {
        Ok(ClientContext::builder(&self.app.token)
            .legacy_csrf(self.app.legacy)
            .session_token(self.session_token(user)?)
            .timeout(timeout)
            .build())
    }

    /// Resolve an endpoint to a full URL
    ///
    /// `statuses/user_timeline` and `statuses/user_timeline.json` both become
    /// `{base_url}/{version}/statuses/user_timeline{suffix}`. Absolute
    /// `http(s)://` URLs are used as given.
    pub fn endpoint_url(&self, endpoint: &str, api_v2: bool) -> Result<String> {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Url::parse(endpoint)?;
            return Ok(endpoint.to_string());
        }

        let name = endpoint.trim_matches('/');
        let name = name.strip_suffix(".json").unwrap_or(name);
        if name.is_empty() {
            return Err(Error::invalid_value("endpoint", "endpoint is empty"));
        }

        let version = if api_v2 {
            API_V2_VERSION
        } else {
            self.api.version.as_str()
        };

        let url = format!(
            "{}/{}/{}{}",
            self.api.base_url.trim_end_matches('/'),
            version.trim_matches('/'),
            name,
            self.api.suffix
        );
        Url::parse(&url)?;
        Ok(url)
    }
}
