use ferrous_fanmerge_domain::DomainError;
use hickory_proto::op::{Message, ResponseCode};
use std::sync::Arc;
use tokio::time::Instant;

/// Outcome of one retry-wrapped run against one upstream.
///
/// The same shape doubles as the running merged result while replies are folded.
#[derive(Debug, Clone)]
pub struct AttemptResult {
    pub endpoint: Arc<str>,
    pub reply: Option<Message>,
    /// Taken once, when the first attempt started.
    pub started_at: Instant,
    pub error: Option<DomainError>,
}

impl AttemptResult {
    pub fn success(endpoint: Arc<str>, reply: Message, started_at: Instant) -> Self {
        Self {
            endpoint,
            reply: Some(reply),
            started_at,
            error: None,
        }
    }

    pub fn failure(endpoint: Arc<str>, error: DomainError, started_at: Instant) -> Self {
        Self {
            endpoint,
            reply: None,
            started_at,
            error: Some(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    pub fn response_code(&self) -> Option<ResponseCode> {
        self.reply.as_ref().map(Message::response_code)
    }

    pub fn answer_count(&self) -> usize {
        self.reply.as_ref().map_or(0, |m| m.answers().len())
    }
}
