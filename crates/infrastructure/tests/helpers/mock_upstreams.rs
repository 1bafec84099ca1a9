#![allow(dead_code)]
use async_trait::async_trait;
use ferrous_fanmerge_application::ports::{ReplyWriter, UpstreamClient};
use ferrous_fanmerge_application::{DnsRequest, RequestContext};
use ferrous_fanmerge_domain::DomainError;
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::Record;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Mock UpstreamClient
// ============================================================================

#[derive(Clone)]
enum Behaviour {
    Answer {
        rcode: ResponseCode,
        answers: Vec<Record>,
    },
    Fail(DomainError),
    /// Replies with a transaction ID the requester never used.
    WrongId,
    /// Never answers; returns only when the context ends.
    Hang,
}

/// Upstream em memória com comportamento programável
pub struct MockUpstream {
    label: String,
    delay: Duration,
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl MockUpstream {
    fn with_behaviour(label: &str, behaviour: Behaviour) -> Self {
        Self {
            label: label.to_string(),
            delay: Duration::ZERO,
            behaviour,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn answering(label: &str, answers: Vec<Record>) -> Self {
        Self::with_rcode(label, ResponseCode::NoError, answers)
    }

    pub fn with_rcode(label: &str, rcode: ResponseCode, answers: Vec<Record>) -> Self {
        Self::with_behaviour(label, Behaviour::Answer { rcode, answers })
    }

    pub fn failing(label: &str) -> Self {
        Self::with_behaviour(
            label,
            Behaviour::Fail(DomainError::TransportTimeout {
                server: label.to_string(),
            }),
        )
    }

    pub fn failing_with(label: &str, error: DomainError) -> Self {
        Self::with_behaviour(label, Behaviour::Fail(error))
    }

    pub fn wrong_id(label: &str) -> Self {
        Self::with_behaviour(label, Behaviour::WrongId)
    }

    pub fn hanging(label: &str) -> Self {
        Self::with_behaviour(label, Behaviour::Hang)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn reply_to(request: &DnsRequest, rcode: ResponseCode, answers: &[Record]) -> Message {
        let mut reply = request.message().clone();
        reply
            .set_message_type(MessageType::Response)
            .set_recursion_available(true)
            .set_response_code(rcode);
        reply.add_answers(answers.to_vec());
        reply
    }
}

#[async_trait]
impl UpstreamClient for MockUpstream {
    async fn request(
        &self,
        ctx: &RequestContext,
        request: &DnsRequest,
    ) -> Result<Message, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::select! {
                cause = ctx.done() => return Err(cause),
                _ = tokio::time::sleep(self.delay) => {}
            }
        }

        match &self.behaviour {
            Behaviour::Answer { rcode, answers } => Ok(Self::reply_to(request, *rcode, answers)),
            Behaviour::Fail(error) => Err(error.clone()),
            Behaviour::WrongId => {
                let mut reply = Self::reply_to(request, ResponseCode::NoError, &[]);
                reply.set_id(request.id().wrapping_add(1));
                Ok(reply)
            }
            Behaviour::Hang => Err(ctx.done().await),
        }
    }

    fn endpoint(&self) -> &str {
        &self.label
    }
}

// ============================================================================
// Mock ReplyWriter
// ============================================================================

/// Guarda as mensagens escritas para inspeção nos testes
#[derive(Default)]
pub struct RecordingWriter {
    written: Mutex<Vec<Message>>,
    fail: bool,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            written: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.written.lock().unwrap().clone()
    }

    pub fn single(&self) -> Message {
        let messages = self.messages();
        assert_eq!(messages.len(), 1, "expected exactly one reply");
        messages.into_iter().next().unwrap()
    }
}

#[async_trait]
impl ReplyWriter for RecordingWriter {
    async fn write_message(&self, message: &Message) -> Result<(), DomainError> {
        if self.fail {
            return Err(DomainError::ReplyWriteFailed("connection closed".into()));
        }
        self.written.lock().unwrap().push(message.clone());
        Ok(())
    }
}
