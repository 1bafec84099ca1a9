use ferrous_fanmerge_domain::DomainError;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Cancellation scope for one query.
///
/// A context ends either when its token is cancelled (explicitly or through a
/// parent) or when its deadline passes. Derived contexts never outlive their parent.
#[derive(Debug, Clone)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Root context: never expires on its own.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Child context bounded by `window` from now and by the parent's own deadline.
    pub fn with_timeout(&self, window: Duration) -> Self {
        let candidate = Instant::now() + window;
        let deadline = match self.deadline {
            Some(parent) if parent < candidate => parent,
            _ => candidate,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Child context that can be cancelled without touching the parent.
    pub fn with_cancel(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancels this context when the returned guard is dropped.
    pub fn cancel_on_drop(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Why the context ended, or `None` while it is still live.
    pub fn err(&self) -> Option<DomainError> {
        if self.token.is_cancelled() {
            return Some(DomainError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(DomainError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context ends and yields the cause.
    pub async fn done(&self) -> DomainError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.token.cancelled() => DomainError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => DomainError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                DomainError::Cancelled
            }
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}
