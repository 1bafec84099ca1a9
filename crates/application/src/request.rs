use ferrous_fanmerge_domain::DomainError;
use hickory_proto::op::{Message, MessageType, Query};
use hickory_proto::rr::{DNSClass, RecordType};
use std::net::SocketAddr;

/// Inbound question plus where it came from.
#[derive(Debug, Clone)]
pub struct DnsRequest {
    message: Message,
    source: Option<SocketAddr>,
}

impl DnsRequest {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            source: None,
        }
    }

    pub fn with_source(mut self, source: SocketAddr) -> Self {
        self.source = Some(source);
        self
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn source(&self) -> Option<SocketAddr> {
        self.source
    }

    pub fn id(&self) -> u16 {
        self.message.id()
    }

    pub fn query(&self) -> Option<&Query> {
        self.message.queries().first()
    }

    /// Lowercased question name with its trailing dot, `"."` when there is no question.
    pub fn name(&self) -> String {
        self.query()
            .map(|q| q.name().to_lowercase().to_string())
            .unwrap_or_else(|| ".".to_string())
    }

    pub fn query_type(&self) -> RecordType {
        self.query()
            .map(|q| q.query_type())
            .unwrap_or(RecordType::Unknown(0))
    }

    pub fn query_class(&self) -> DNSClass {
        self.query().map(|q| q.query_class()).unwrap_or(DNSClass::IN)
    }

    /// True when `reply` answers this request: a response with the same ID
    /// carrying exactly our question (name compared case-insensitively).
    pub fn matches(&self, reply: &Message) -> bool {
        self.validate_reply(reply).is_ok()
    }

    /// Same check as [`matches`](Self::matches), reporting the question a bad reply missed.
    pub fn validate_reply(&self, reply: &Message) -> Result<(), DomainError> {
        let answers_question = reply.message_type() == MessageType::Response
            && reply.id() == self.id()
            && match (reply.queries(), self.query()) {
                ([answered], Some(asked)) => {
                    answered.name() == asked.name()
                        && answered.query_type() == asked.query_type()
                        && answered.query_class() == asked.query_class()
                }
                _ => false,
            };

        if answers_question {
            Ok(())
        } else {
            Err(DomainError::MismatchedReply {
                name: self.name(),
                record_type: self.query_type().to_string(),
            })
        }
    }
}
