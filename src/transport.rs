//! HTTP transport with bounded retries.
//!
//! [`Transport`] executes one logical request against a resolved URL:
//!
//! - a transport-level failure is retried unless the call context is done;
//! - a response below 500 completes the call, 4xx included;
//! - a 5xx response is drained and retried;
//! - the request body is captured once and replayed on every attempt.
//!
//! Responses that are not handed back to the caller are drained with
//! [`drain`] so their connection returns to the pool.

use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::address::redacted;
use crate::{
    BasicAuth, CallContext, CancelReason, ClientConfig, Result, SearchParams, TorznabError,
    TransportFailure,
};

/// Default number of attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default fixed delay between attempts.
const DEFAULT_DELAY: Duration = Duration::from_secs(3);

/// Default upper bound of the random jitter added to the delay.
const DEFAULT_MAX_JITTER: Duration = Duration::from_secs(1);

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Retry budget and inter-attempt delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy. `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32, delay: Duration, max_jitter: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            max_jitter,
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Maximum attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait before the next attempt: fixed delay plus jitter.
    pub fn next_delay(&self) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.delay;
        }
        self.delay + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

/// Shared HTTP transport. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    credentials: Option<BasicAuth>,
    retry: RetryPolicy,
}

impl Transport {
    /// Builds the underlying HTTP client from the configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("torznab-client/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout_duration())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| TorznabError::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, config.credentials().cloned()))
    }

    /// Wraps an existing reqwest client.
    pub fn with_client(client: Client, credentials: Option<BasicAuth>) -> Self {
        Self {
            client,
            credentials,
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Issues a GET.
    pub async fn get(&self, ctx: &CallContext, url: Url) -> Result<Response> {
        self.execute(ctx, Method::GET, url, None).await
    }

    /// Issues a POST with `params` as a URL-encoded form body.
    pub async fn post_form(&self, ctx: &CallContext, url: Url, params: &SearchParams) -> Result<Response> {
        let body = params.to_form_body().into_bytes();
        self.execute(ctx, Method::POST, url, Some(body)).await
    }

    /// Runs the retry loop for one logical request.
    async fn execute(
        &self,
        ctx: &CallContext,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            if let Some(reason) = ctx.done() {
                return Err(cancelled(&url, reason));
            }

            let request = self.build_request(&method, &url, body.as_deref());
            debug!("{} {} (attempt {})", method, redacted(&url), attempt);

            let failure = match ctx.run(request.send()).await {
                Err(reason) => return Err(cancelled(&url, reason)),
                Ok(Ok(response)) if is_retryable_status(response.status()) => {
                    let status = response.status().as_u16();
                    // A 5xx body is never consumed; release the connection
                    // before the next attempt.
                    let _ = ctx.run(drain(Some(response))).await;
                    TransportFailure::Status(status)
                }
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(err)) => TransportFailure::Network(err.without_url()),
            };

            // The failure may be the context expiring mid-flight.
            if let Some(reason) = ctx.done() {
                return Err(cancelled(&url, reason));
            }

            if attempt >= max_attempts {
                return Err(TorznabError::Transport {
                    url: redacted(&url),
                    attempts: attempt,
                    source: failure,
                });
            }

            let delay = self.retry.next_delay();
            warn!(
                "{}: attempt {} of {} failed ({}), retrying in {}ms",
                redacted(&url),
                attempt,
                max_attempts,
                failure,
                delay.as_millis()
            );

            if let Err(reason) = ctx.run(tokio::time::sleep(delay)).await {
                return Err(cancelled(&url, reason));
            }
        }
    }

    fn build_request(&self, method: &Method, url: &Url, body: Option<&[u8]>) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method.clone(), url.clone());

        if let Some(auth) = &self.credentials {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
                .body(body.to_vec());
        }

        request
    }
}

/// Any status of 500 or above, including non-standard codes past 599.
fn is_retryable_status(status: StatusCode) -> bool {
    status.as_u16() >= 500
}

fn cancelled(url: &Url, reason: CancelReason) -> TorznabError {
    TorznabError::Cancelled {
        url: redacted(url),
        reason,
    }
}

/// Reads and discards the rest of a response body.
///
/// `None` is a no-op. Read errors are logged and swallowed: the connection
/// is simply not reused.
pub async fn drain(response: Option<Response>) {
    let Some(mut response) = response else {
        return;
    };

    let mut discarded = 0usize;
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => discarded += chunk.len(),
            Ok(None) => break,
            Err(e) => {
                debug!("Failed to drain response body: {}", e);
                break;
            }
        }
    }

    if discarded > 0 {
        debug!("Drained {} unread response bytes", discarded);
    }
}
