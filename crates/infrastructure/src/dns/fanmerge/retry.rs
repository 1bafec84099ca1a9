use super::attempt::AttemptResult;
use ferrous_fanmerge_application::ports::UpstreamClient;
use ferrous_fanmerge_application::{DnsRequest, RequestContext};
use ferrous_fanmerge_domain::DomainError;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace, warn, Level};

/// How often and how patiently one upstream is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound on calls; 0 keeps retrying until the context ends.
    pub attempts: u32,
    pub attempt_delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, attempt_delay: Duration) -> Self {
        Self {
            attempts,
            attempt_delay,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.attempts == 0
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100))
    }
}

/// Log level for a failed upstream call.
/// Context ends are trace, transport failures debug, everything else warn.
pub(crate) fn failure_level(error: &DomainError) -> Level {
    if error.is_context_error() {
        Level::TRACE
    } else if error.is_transport_error() {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Call `upstream` until it answers, the attempt budget runs out, or `ctx` ends.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        upstream: &dyn UpstreamClient,
        request: &DnsRequest,
    ) -> AttemptResult {
        let started_at = Instant::now();
        let endpoint: Arc<str> = Arc::from(upstream.endpoint());
        let mut attempt: u32 = 0;

        loop {
            if let Some(cause) = ctx.err() {
                debug!(upstream = %endpoint, %cause, attempt, "Giving up on upstream");
                return AttemptResult::failure(endpoint, cause, started_at);
            }

            match upstream.request(ctx, request).await {
                Ok(reply) => {
                    debug!(
                        upstream = %endpoint,
                        attempt,
                        rcode = %reply.response_code(),
                        "Upstream answered"
                    );
                    return AttemptResult::success(endpoint, reply, started_at);
                }
                Err(e) => {
                    let level = failure_level(&e);
                    if level == Level::WARN {
                        warn!(upstream = %endpoint, attempt, error = %e, "Upstream attempt failed");
                    } else if level == Level::DEBUG {
                        debug!(upstream = %endpoint, attempt, error = %e, "Upstream attempt failed");
                    } else {
                        trace!(upstream = %endpoint, attempt, error = %e, "Upstream attempt interrupted");
                    }
                }
            }

            if !self.policy.is_unbounded() {
                attempt += 1;
                if attempt >= self.policy.attempts {
                    break;
                }
            }

            tokio::select! {
                _ = ctx.done() => {}
                _ = tokio::time::sleep(self.policy.attempt_delay) => {}
            }
        }

        debug!(upstream = %endpoint, attempts = attempt, "Attempt limit reached");
        AttemptResult::failure(endpoint, DomainError::AttemptLimitReached, started_at)
    }
}
