//! Error types for the Torznab client.

use std::fmt;

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, TorznabError>;

/// Errors that can occur while talking to a Torznab endpoint.
#[derive(Error, Debug)]
pub enum TorznabError {
    /// Malformed host or URL, or the HTTP client could not be built.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The request could not be completed within the retry budget.
    #[error("request to {url} failed after {attempts} attempt(s): {source}")]
    Transport {
        url: String,
        attempts: u32,
        #[source]
        source: TransportFailure,
    },

    /// The call context was cancelled or its deadline passed.
    #[error("request to {url} {reason}")]
    Cancelled { url: String, reason: CancelReason },

    /// The response body is not the expected document.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: DecodeError,
    },

    /// The upstream answered with a Torznab error document.
    #[error("{url} returned torznab error {code}: {description}")]
    Api {
        url: String,
        code: u32,
        description: String,
    },

    /// A non-success status whose body carries no Torznab error.
    #[error("{url} returned unexpected status {status}")]
    UnexpectedStatus { url: String, status: u16 },
}

impl TorznabError {
    /// Returns true if the call was aborted by its context.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns the URL the failing request was addressed to, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Configuration(_) => None,
            Self::Transport { url, .. }
            | Self::Cancelled { url, .. }
            | Self::Decode { url, .. }
            | Self::Api { url, .. }
            | Self::UnexpectedStatus { url, .. } => Some(url),
        }
    }
}

impl From<url::ParseError> for TorznabError {
    fn from(err: url::ParseError) -> Self {
        Self::Configuration(format!("URL parsing error: {}", err))
    }
}

/// The last failure observed by the transport before it gave up.
#[derive(Error, Debug)]
pub enum TransportFailure {
    /// Connection, TLS or timeout failure.
    #[error("{0}")]
    Network(#[source] reqwest::Error),

    /// The server kept answering with a 5xx status.
    #[error("server error status {0}")]
    Status(u16),

    /// The response body could not be read.
    #[error("reading body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Why a call context stopped a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The cancellation token fired.
    Cancelled,
    /// The deadline passed.
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("was cancelled"),
            Self::DeadlineExceeded => f.write_str("exceeded its deadline"),
        }
    }
}

/// A response body that does not parse as the expected XML document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the decoder's description of the problem.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<quick_xml::Error> for DecodeError {
    fn from(err: quick_xml::Error) -> Self {
        Self::new(format!("malformed XML: {}", err))
    }
}
