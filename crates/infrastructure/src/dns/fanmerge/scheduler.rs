use super::aggregator::ResponseAggregator;
use super::attempt::AttemptResult;
use super::retry::RetryExecutor;
use ferrous_fanmerge_application::ports::UpstreamClient;
use ferrous_fanmerge_application::{DnsRequest, RequestContext};
use ferrous_fanmerge_domain::DomainError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// What the fan-out produced for one query.
#[derive(Debug)]
pub struct FanoutOutcome {
    pub merged: Option<AttemptResult>,
    /// Why the fan-out window had ended when the coordinator returned, if it had.
    pub expired: Option<DomainError>,
}

/// Runs one worker per upstream and feeds their results to the aggregator.
pub struct FanoutScheduler {
    upstreams: Arc<[Arc<dyn UpstreamClient>]>,
    retry: RetryExecutor,
    window: Duration,
}

impl FanoutScheduler {
    pub fn new(
        upstreams: Arc<[Arc<dyn UpstreamClient>]>,
        retry: RetryExecutor,
        window: Duration,
    ) -> Self {
        Self {
            upstreams,
            retry,
            window,
        }
    }

    pub fn upstream_count(&self) -> usize {
        self.upstreams.len()
    }

    pub async fn run(&self, parent: &RequestContext, request: &DnsRequest) -> FanoutOutcome {
        let ctx = parent.with_timeout(self.window);
        // Workers still in flight when we return observe cancellation and stop.
        let _teardown = ctx.cancel_on_drop();

        let count = self.upstreams.len();
        debug!(upstreams = count, name = %request.name(), "Fanning out query");

        let (work_tx, work_rx) = mpsc::channel::<Arc<dyn UpstreamClient>>(count.max(1));
        let work_rx = Arc::new(Mutex::new(work_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<AttemptResult>(count.max(1));
        let request = Arc::new(request.clone());
        let mut tasks = JoinSet::new();

        let upstreams = Arc::clone(&self.upstreams);
        tasks.spawn(async move {
            for upstream in upstreams.iter() {
                if work_tx.send(Arc::clone(upstream)).await.is_err() {
                    break;
                }
            }
            // Dropping the sender closes the queue once every upstream is fed.
        });

        for worker in 0..count {
            let work_rx = Arc::clone(&work_rx);
            let result_tx = result_tx.clone();
            let ctx = ctx.clone();
            let request = Arc::clone(&request);
            let retry = self.retry;

            tasks.spawn(async move {
                loop {
                    let next = work_rx.lock().await.recv().await;
                    let Some(upstream) = next else {
                        break;
                    };
                    let result = retry.execute(&ctx, upstream.as_ref(), &request).await;
                    if result_tx.send(result).await.is_err() {
                        debug!(worker, "Coordinator gone, dropping late result");
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        let merged = ResponseAggregator::new(count)
            .collect(&ctx, &mut result_rx)
            .await;
        let expired = ctx.err();

        if let Some(ref cause) = expired {
            warn!(name = %request.name(), %cause, "Fan-out ended before every upstream reported");
        }

        // Dropping the set aborts workers that are still waiting on an upstream.
        drop(tasks);

        FanoutOutcome { merged, expired }
    }
}
