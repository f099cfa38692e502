//! Client configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Result, TorznabError};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// HTTP Basic credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    /// Creates a new credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Credentials are only sent when both halves are present.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for a [`Client`](crate::Client).
///
/// In proxy mode `host` is the base URL of the aggregation service
/// (e.g. `http://localhost:9117`). In direct mode it is the tracker's
/// Torznab API root (e.g. `https://tracker.example.com/api/torznab`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Upstream base URL.
    pub host: String,
    /// API key sent as the `apikey` query parameter.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Talk to a single tracker instead of an aggregation proxy.
    #[serde(default)]
    pub direct_mode: bool,
    /// Optional HTTP Basic credentials.
    #[serde(default)]
    pub basic_auth: Option<BasicAuth>,
    /// Verify the upstream TLS certificate.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_verify_tls() -> bool {
    true
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    /// Creates a proxy-mode configuration for the given host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: None,
            direct_mode: false,
            basic_auth: None,
            verify_tls: true,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Switches between direct and proxy addressing.
    pub fn with_direct_mode(mut self, direct_mode: bool) -> Self {
        self.direct_mode = direct_mode;
        self
    }

    /// Sets HTTP Basic credentials.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some(BasicAuth::new(username, password));
        self
    }

    /// Enables or disables TLS certificate verification.
    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    /// Sets the request timeout in seconds. Zero keeps the default.
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the request timeout, falling back to the default for zero.
    pub fn timeout_duration(&self) -> Duration {
        if self.timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.timeout)
        }
    }

    /// Returns the API key if one is configured and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    /// Returns the credentials to send, if complete.
    pub fn credentials(&self) -> Option<&BasicAuth> {
        self.basic_auth.as_ref().filter(|auth| auth.is_complete())
    }

    /// Parses and checks the host URL.
    pub fn host_url(&self) -> Result<Url> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(TorznabError::Configuration("host is empty".to_string()));
        }

        let url = Url::parse(host)
            .map_err(|e| TorznabError::Configuration(format!("invalid host {:?}: {}", host, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(TorznabError::Configuration(format!(
                "unsupported host scheme: {}",
                url.scheme()
            )));
        }
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(TorznabError::Configuration(format!(
                "host {:?} cannot be used as a base URL",
                host
            )));
        }

        Ok(url)
    }
}
