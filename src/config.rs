//! Client configuration: defaults, JSON file, environment

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AccessError, Result};
use crate::model::IncludePublicPolicy;

pub const DEFAULT_AUTHORIZATION_URL: &str = "http://localhost:8005/authorization/v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const ENV_AUTHORIZATION_URL: &str = "DOCACCESS_AUTHORIZATION_URL";
pub const ENV_TIMEOUT_MS: &str = "DOCACCESS_TIMEOUT_MS";
pub const ENV_INCLUDE_PUBLIC: &str = "DOCACCESS_INCLUDE_PUBLIC";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base url of the authorization service, without trailing slash
    pub authorization_url: String,
    pub timeout_ms: u64,
    /// Public grants policy for `findMyResourceGroups`
    pub include_public: IncludePublicPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            authorization_url: DEFAULT_AUTHORIZATION_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            include_public: IncludePublicPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Read a JSON config file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by the `DOCACCESS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let mut config = ClientConfig::default();
        if let Some(url) = lookup(ENV_AUTHORIZATION_URL) {
            config.authorization_url = url;
        }
        if let Some(ms) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = ms
                .trim()
                .parse()
                .map_err(|_| AccessError::Config(format!("{} is not a number: {:?}", ENV_TIMEOUT_MS, ms)))?;
        }
        if let Some(policy) = lookup(ENV_INCLUDE_PUBLIC) {
            config.include_public = parse_policy(&policy)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.authorization_url.trim();
        if url.is_empty() {
            return Err(AccessError::Config("authorization url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AccessError::Config(format!("authorization url must be http(s): {}", url)));
        }
        if self.timeout_ms == 0 {
            return Err(AccessError::Config("timeout must be positive".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Full url of a service route
    pub fn endpoint(&self, route: &str) -> String {
        format!("{}/{}", self.authorization_url.trim_end_matches('/'), route.trim_start_matches('/'))
    }
}

fn parse_policy(raw: &str) -> Result<IncludePublicPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "include" | "0" => Ok(IncludePublicPolicy::Include),
        "include_except_advertized" | "1" => Ok(IncludePublicPolicy::IncludeExceptAdvertized),
        "exclude" | "2" => Ok(IncludePublicPolicy::Exclude),
        other => Err(AccessError::Config(format!("unknown public policy {:?}", other))),
    }
}
