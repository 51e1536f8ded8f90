use std::env;
use std::fmt;

use crate::errors::{FetchError, FetchResult};

pub const USERNAME_VAR: &str = "BLUESKY_USERNAME";
pub const APP_PASSWORD_VAR: &str = "BLUESKY_APP_PASSWORD";
pub const API_URL_VAR: &str = "BLUESKY_API_URL";
pub const DEFAULT_DOMAIN_VAR: &str = "BLUESKY_DEFAULT_DOMAIN";

pub const DEFAULT_API_URL: &str = "https://bsky.social";
pub const DEFAULT_DOMAIN: &str = "bsky.social";

/// Account credentials used to create a session
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
        }
    }

    pub fn from_env() -> FetchResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build credentials from any variable source. Unset and blank values are both rejected.
    pub fn from_lookup<F>(lookup: F) -> FetchResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let identifier = required_var(&lookup, USERNAME_VAR)?;
        let password = required_var(&lookup, APP_PASSWORD_VAR)?;

        Ok(Self {
            identifier,
            password,
        })
    }
}

// The app password must never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn required_var<F>(lookup: &F, name: &str) -> FetchResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(FetchError::Configuration {
            var: name.to_string(),
        }),
    }
}

/// Immutable settings for a [`crate::ProfileImageResolver`]
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub api_url: String,
    pub default_domain: String,
}

impl Config {
    pub fn new(credentials: Credentials, api_url: impl Into<String>) -> Self {
        Self {
            credentials,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            default_domain: DEFAULT_DOMAIN.to_string(),
        }
    }

    pub fn from_env() -> FetchResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> FetchResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_lookup(&lookup)?;

        let api_url = lookup(API_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let default_domain = lookup(DEFAULT_DOMAIN_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DOMAIN.to_string());

        let config = Self::new(credentials, api_url.trim());
        Ok(config.with_default_domain(default_domain))
    }

    pub fn with_default_domain(mut self, domain: impl Into<String>) -> Self {
        self.default_domain = domain.into();
        self
    }

    /// Point at another XRPC host. A blank URL keeps the current one.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        let api_url = api_url.trim();
        if !api_url.is_empty() {
            self.api_url = api_url.trim_end_matches('/').to_string();
        }
        self
    }

    /// Full URL of an XRPC method on the configured host
    pub fn xrpc_url(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.api_url, nsid)
    }
}
