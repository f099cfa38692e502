//! Per-call cancellation and deadlines.

use std::future::{pending, Future};
use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::CancelReason;

/// Cancellation signal and optional deadline governing one client call.
///
/// Every suspension point of a request (sending, reading the body, waiting
/// between retries) is raced against the context, so a cancelled call
/// unwinds promptly instead of finishing a blocked I/O operation.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline(Instant::now() + timeout)
    }

    /// A context cancelled through `token`.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self::background().token(token)
    }

    /// Sets the deadline, keeping the earlier one if already set.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Sets the cancellation token.
    pub fn token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Returns the deadline, if any.
    pub fn deadline_at(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns why the context is done, or `None` while it is still live.
    pub fn done(&self) -> Option<CancelReason> {
        if self.token.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Some(CancelReason::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(CancelReason::DeadlineExceeded);
        }
        None
    }

    /// Runs `fut` until it completes or the context is done.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, CancelReason> {
        let cancelled = async {
            match &self.token {
                Some(token) => token.cancelled().await,
                None => pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(CancelReason::Cancelled),
            _ = expired => Err(CancelReason::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}
