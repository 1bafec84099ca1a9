use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Context canceled")]
    Cancelled,

    #[error("Context deadline exceeded")]
    DeadlineExceeded,

    #[error("Attempt limit has been reached")]
    AttemptLimitReached,

    #[error("No usable reply was assembled from the upstreams")]
    NoUsableReply,

    #[error("No upstream servers configured")]
    NoUpstreams,

    #[error("Timeout talking to upstream {server}")]
    TransportTimeout { server: String },

    #[error("Transport error with upstream {server}: {reason}")]
    TransportIo { server: String, reason: String },

    #[error("Upstream {server} answered {rcode}")]
    UpstreamServerError { server: String, rcode: String },

    #[error("Reply does not match question {name} {record_type}")]
    MismatchedReply { name: String, record_type: String },

    #[error("{0}: no next handler found")]
    NoNextHandler(String),

    #[error("Failed to write reply: {0}")]
    ReplyWriteFailed(String),
}

impl DomainError {
    /// True for the two ways a per-query context can end.
    pub fn is_context_error(&self) -> bool {
        matches!(self, DomainError::Cancelled | DomainError::DeadlineExceeded)
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            DomainError::TransportTimeout { .. } | DomainError::TransportIo { .. }
        )
    }
}
