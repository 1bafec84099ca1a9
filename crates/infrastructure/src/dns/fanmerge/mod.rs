//! Fan-out / merge handler
//!
//! One query is sent to every configured upstream at once. Each upstream is
//! retried independently, results are folded as they arrive, and the merged,
//! normalized reply is written back before the fan-out window closes.

pub mod aggregator;
pub mod attempt;
pub mod emitter;
pub mod normalizer;
pub mod retry;
pub mod scheduler;

pub use aggregator::{fold_results, merge, ResponseAggregator};
pub use attempt::AttemptResult;
pub use emitter::ReplyEmitter;
pub use normalizer::{normalize, normalize_answers, AnswerCategory};
pub use retry::{RetryExecutor, RetryPolicy};
pub use scheduler::{FanoutOutcome, FanoutScheduler};

use super::filter::EligibilityFilter;
use super::upstream::NetworkUpstream;
use async_trait::async_trait;
use ferrous_fanmerge_application::ports::{next_or_failure, DnsHandler, ReplyWriter, UpstreamClient};
use ferrous_fanmerge_application::{DnsRequest, RequestContext};
use ferrous_fanmerge_domain::{DomainError, FanmergeConfig, NetworkKind, UpstreamEndpoint};
use hickory_proto::op::ResponseCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const HANDLER_NAME: &str = "fanmerge";

/// Immutable snapshot of the plugin settings, shared by every query.
#[derive(Debug, Clone)]
pub struct FanmergeSettings {
    /// Transport for endpoints without an explicit scheme
    pub net: NetworkKind,

    /// Per-attempt timeout handed to network upstreams
    pub timeout: Duration,

    pub retry: RetryPolicy,

    /// Overall window for one fanned-out query
    pub window: Duration,

    pub from: String,

    pub except: Vec<String>,

    /// Certificate name expected from TLS upstreams
    pub tls_server_name: Option<String>,
}

impl Default for FanmergeSettings {
    fn default() -> Self {
        Self::from(&FanmergeConfig::default())
    }
}

impl From<&FanmergeConfig> for FanmergeSettings {
    fn from(config: &FanmergeConfig) -> Self {
        Self {
            net: config.net,
            timeout: Duration::from_millis(config.timeout_ms),
            retry: RetryPolicy::new(
                config.attempts,
                Duration::from_millis(config.attempt_delay_ms),
            ),
            window: Duration::from_millis(config.deadline_ms),
            from: config.from.clone(),
            except: config.except.clone(),
            tls_server_name: config.tls_server_name.clone(),
        }
    }
}

impl FanmergeSettings {
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    pub fn with_except(mut self, except: Vec<String>) -> Self {
        self.except = except;
        self
    }
}

pub struct FanmergeBuilder {
    settings: FanmergeSettings,
    upstreams: Vec<Arc<dyn UpstreamClient>>,
    next: Option<Arc<dyn DnsHandler>>,
}

impl FanmergeBuilder {
    pub fn new(settings: FanmergeSettings) -> Self {
        Self {
            settings,
            upstreams: Vec::new(),
            next: None,
        }
    }

    pub fn with_upstream(mut self, upstream: Arc<dyn UpstreamClient>) -> Self {
        self.upstreams.push(upstream);
        self
    }

    pub fn with_upstreams<I>(mut self, upstreams: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn UpstreamClient>>,
    {
        self.upstreams.extend(upstreams);
        self
    }

    /// Network clients for each endpoint, using the settings' default transport and timeout.
    pub fn with_endpoints(mut self, endpoints: &[UpstreamEndpoint]) -> Self {
        for endpoint in endpoints {
            let network = endpoint.network_or(self.settings.net);
            self.upstreams.push(Arc::new(
                NetworkUpstream::new(endpoint.addr, network, self.settings.timeout)
                    .with_tls_server_name(self.settings.tls_server_name.clone()),
            ));
        }
        self
    }

    pub fn with_next(mut self, next: Arc<dyn DnsHandler>) -> Self {
        self.next = Some(next);
        self
    }

    pub fn build(self) -> Result<Fanmerge, DomainError> {
        if self.upstreams.is_empty() {
            return Err(DomainError::NoUpstreams);
        }

        let settings = self.settings;
        info!(
            upstreams = self.upstreams.len(),
            attempts = settings.retry.attempts,
            window_ms = settings.window.as_millis() as u64,
            from = %settings.from,
            excluded = settings.except.len(),
            "Building fanmerge handler"
        );

        let filter = EligibilityFilter::new(&settings.from, &settings.except);
        let scheduler = FanoutScheduler::new(
            self.upstreams.into(),
            RetryExecutor::new(settings.retry),
            settings.window,
        );

        Ok(Fanmerge {
            scheduler,
            filter,
            next: self.next,
        })
    }
}

/// Chain handler that fans eligible queries out and merges the answers.
pub struct Fanmerge {
    scheduler: FanoutScheduler,
    filter: EligibilityFilter,
    next: Option<Arc<dyn DnsHandler>>,
}

impl Fanmerge {
    pub fn builder(settings: FanmergeSettings) -> FanmergeBuilder {
        FanmergeBuilder::new(settings)
    }

    pub fn upstream_count(&self) -> usize {
        self.scheduler.upstream_count()
    }
}

#[async_trait]
impl DnsHandler for Fanmerge {
    fn name(&self) -> &str {
        HANDLER_NAME
    }

    async fn serve_dns(
        &self,
        ctx: &RequestContext,
        writer: &dyn ReplyWriter,
        request: &DnsRequest,
    ) -> Result<ResponseCode, DomainError> {
        let name = request.name();
        if !self.filter.matches(&name) {
            debug!(%name, "Not eligible, passing to next handler");
            return next_or_failure(HANDLER_NAME, self.next.as_ref(), ctx, writer, request).await;
        }

        let outcome = self.scheduler.run(ctx, request).await;
        ReplyEmitter::emit(outcome, request, writer).await
    }
}
