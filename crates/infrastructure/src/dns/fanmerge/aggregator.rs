use super::attempt::AttemptResult;
use super::normalizer::normalize;
use super::retry::failure_level;
use ferrous_fanmerge_application::RequestContext;
use hickory_proto::op::ResponseCode;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn, Level};

/// Fold `incoming` into the running result.
///
/// Rules, first match wins:
/// 1. no incoming: keep running
/// 2. no running: take incoming
/// 3. incoming failed: keep running
/// 4. running failed: drop both (a later step starts over from rule 2)
/// 5. incoming has no reply: keep running
/// 6. running has no reply: take incoming
/// 7. both NOERROR: append incoming answers after running answers
/// 8. otherwise: drop both
///
/// Every kept or combined result is normalized. The fold is neither
/// associative nor commutative, so the outcome depends on arrival order.
pub fn merge(running: Option<AttemptResult>, incoming: Option<AttemptResult>) -> Option<AttemptResult> {
    let Some(incoming) = incoming else {
        return normalize(running);
    };
    let Some(mut running) = running else {
        return normalize(Some(incoming));
    };

    if incoming.is_failure() {
        match incoming.error.as_ref().map(failure_level) {
            Some(level) if level == Level::WARN => {
                warn!(upstream = %incoming.endpoint, error = ?incoming.error, "Discarding failed result");
            }
            Some(level) if level == Level::TRACE => {
                trace!(upstream = %incoming.endpoint, error = ?incoming.error, "Discarding failed result");
            }
            _ => {
                debug!(upstream = %incoming.endpoint, error = ?incoming.error, "Discarding failed result");
            }
        }
        return normalize(Some(running));
    }
    // Rule 4 deliberately discards incoming's reply as well.
    if running.is_failure() {
        debug!(
            upstream = %incoming.endpoint,
            previous = %running.endpoint,
            "Merged result had failed, resetting"
        );
        return None;
    }
    if incoming.reply.is_none() {
        return normalize(Some(running));
    }
    if running.reply.is_none() {
        return normalize(Some(incoming));
    }

    let (Some(left), Some(mut right)) = (running.reply.as_mut(), incoming.reply) else {
        return None;
    };
    if left.response_code() == ResponseCode::NoError && right.response_code() == ResponseCode::NoError
    {
        left.add_answers(right.take_answers());
        return normalize(Some(running));
    }

    debug!(
        upstream = %incoming.endpoint,
        left = %left.response_code(),
        right = %right.response_code(),
        "Non-success reply voids the merge"
    );
    None
}

/// Left fold of `merge` over results in the order they were observed.
pub fn fold_results<I>(results: I) -> Option<AttemptResult>
where
    I: IntoIterator<Item = AttemptResult>,
{
    results
        .into_iter()
        .fold(None, |running, incoming| merge(running, Some(incoming)))
}

/// Consumes attempt results as workers report them and keeps the running merge.
pub struct ResponseAggregator {
    expected: usize,
}

impl ResponseAggregator {
    pub fn new(expected: usize) -> Self {
        Self { expected }
    }

    /// Returns once `expected` results were folded, the channel closed, or `ctx`
    /// ended, whichever comes first. Whatever was merged so far is returned.
    pub async fn collect(
        &self,
        ctx: &RequestContext,
        results: &mut mpsc::Receiver<AttemptResult>,
    ) -> Option<AttemptResult> {
        let mut remaining = self.expected;
        let mut merged = None;

        while remaining > 0 {
            tokio::select! {
                cause = ctx.done() => {
                    debug!(%cause, outstanding = remaining, "Fan-out window closed");
                    return merged;
                }
                next = results.recv() => match next {
                    Some(result) => {
                        remaining -= 1;
                        debug!(
                            upstream = %result.endpoint,
                            failed = result.is_failure(),
                            answers = result.answer_count(),
                            elapsed_ms = result.started_at.elapsed().as_millis() as u64,
                            "Upstream reported"
                        );
                        merged = merge(merged, Some(result));
                    }
                    None => {
                        debug!(outstanding = remaining, "Result channel closed early");
                        return merged;
                    }
                },
            }
        }

        merged
    }
}
