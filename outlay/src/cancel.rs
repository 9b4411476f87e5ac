//! Cooperative cancellation for storage calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Shared cancellation flag plus an optional deadline.
///
/// Clones share the flag, so a token handed to a storage call can be
/// cancelled from another thread.
///
/// ```
/// use std::time::Duration;
/// use outlay::CancelToken;
///
/// let token = CancelToken::new().with_timeout(Duration::from_secs(5));
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.check().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that is never cancelled and has no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort after `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Abort at `deadline`.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Apply `timeout` only if the token has no deadline yet.
    #[must_use]
    pub fn or_timeout(self, timeout: Option<Duration>) -> Self {
        match (self.deadline, timeout) {
            (None, Some(timeout)) => self.with_timeout(timeout),
            _ => self,
        }
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Whether work should stop, for either reason.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.is_cancelled() || self.is_expired()
    }

    /// `Err(Cancelled)` or `Err(Timeout)` once the token is aborted.
    ///
    /// Cancellation wins when both apply.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else if self.is_expired() {
            Err(Error::Timeout)
        } else {
            Ok(())
        }
    }

    /// Error to report for a storage call that was interrupted.
    pub(crate) fn abort_error(&self) -> Error {
        if !self.is_cancelled() && self.is_expired() {
            Error::Timeout
        } else {
            Error::Cancelled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_passes() {
        let token = CancelToken::new();
        assert!(token.check().is_ok());
        assert!(!token.is_aborted());
        assert_eq!(token.deadline(), None);
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        other.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_expired_deadline_times_out() {
        let token = CancelToken::new().with_deadline(Instant::now());
        assert!(token.is_expired());
        assert!(matches!(token.check(), Err(Error::Timeout)));
        assert!(matches!(token.abort_error(), Error::Timeout));
    }

    #[test]
    fn test_cancel_wins_over_timeout() {
        let token = CancelToken::new().with_deadline(Instant::now());
        token.cancel();
        assert!(matches!(token.check(), Err(Error::Cancelled)));
        assert!(matches!(token.abort_error(), Error::Cancelled));
    }

    #[test]
    fn test_or_timeout_keeps_existing_deadline() {
        let deadline = Instant::now() + Duration::from_secs(60);
        let token = CancelToken::new()
            .with_deadline(deadline)
            .or_timeout(Some(Duration::from_millis(1)));
        assert_eq!(token.deadline(), Some(deadline));

        let token = CancelToken::new().or_timeout(Some(Duration::from_secs(60)));
        assert!(token.deadline().is_some());
        assert!(token.check().is_ok());

        assert_eq!(CancelToken::new().or_timeout(None).deadline(), None);
    }
}
