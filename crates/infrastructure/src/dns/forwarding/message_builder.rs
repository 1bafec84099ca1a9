//! DNS Message Builder
//!
//! Builds queries and synthesized replies with `hickory-proto` and moves them
//! to and from wire format.

use ferrous_fanmerge_domain::DomainError;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use std::str::FromStr;

/// Largest UDP reply a client without EDNS accepts (RFC 1035 §4.2.1).
pub const MIN_UDP_PAYLOAD: usize = 512;

pub struct MessageBuilder;

impl MessageBuilder {
    /// Standard recursive query: random ID, RD set, one IN-class question.
    pub fn build_query(domain: &str, record_type: RecordType) -> Result<Message, DomainError> {
        let mut name = Name::from_str(domain).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", domain, e))
        })?;
        name.set_fqdn(true);

        let mut query = Query::query(name, record_type);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new();
        message
            .set_id(fastrand::u16(..))
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true)
            .add_query(query);
        Ok(message)
    }

    /// Reply to `request` carrying only `rcode`, its question and its RD/CD flags.
    pub fn error_reply(request: &Message, rcode: ResponseCode) -> Message {
        let mut reply = Message::error_msg(request.id(), request.op_code(), rcode);
        reply
            .set_recursion_desired(request.recursion_desired())
            .set_checking_disabled(request.checking_disabled())
            .add_queries(request.queries().to_vec());
        reply
    }

    pub fn to_wire(message: &Message) -> Result<Vec<u8>, DomainError> {
        message.to_vec().map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to serialize DNS message: {}", e))
        })
    }

    /// UDP reply size the requester advertised through EDNS, never below 512.
    pub fn udp_payload_limit(request: &Message) -> usize {
        request
            .extensions()
            .as_ref()
            .map_or(MIN_UDP_PAYLOAD, |edns| {
                usize::from(edns.max_payload()).max(MIN_UDP_PAYLOAD)
            })
    }

    /// Wire form of `message` no larger than `limit`. An oversized message
    /// loses its answer, authority and additional records and gets TC set.
    pub fn to_wire_within(message: &Message, limit: usize) -> Result<Vec<u8>, DomainError> {
        let bytes = Self::to_wire(message)?;
        if bytes.len() <= limit {
            return Ok(bytes);
        }

        let mut truncated = message.clone();
        truncated.take_answers();
        truncated.take_name_servers();
        truncated.take_additionals();
        truncated.set_truncated(true);
        Self::to_wire(&truncated)
    }

    pub fn from_wire(bytes: &[u8]) -> Result<Message, DomainError> {
        Message::from_vec(bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS message: {}", e))
        })
    }
}
