use super::attempt::AttemptResult;
use hickory_proto::rr::{Record, RecordType};
use std::fmt;
use tracing::trace;

/// Buckets answer records are sorted into before a merged reply is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerCategory {
    /// CNAME
    NameAlias,
    /// A and AAAA
    Address,
    /// MX
    MailExchange,
    /// Everything else
    Other,
}

impl AnswerCategory {
    pub fn of(record_type: RecordType) -> Self {
        match record_type {
            RecordType::CNAME => AnswerCategory::NameAlias,
            RecordType::A | RecordType::AAAA => AnswerCategory::Address,
            RecordType::MX => AnswerCategory::MailExchange,
            _ => AnswerCategory::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerCategory::NameAlias => "name_alias",
            AnswerCategory::Address => "address",
            AnswerCategory::MailExchange => "mail_exchange",
            AnswerCategory::Other => "other",
        }
    }
}

impl fmt::Display for AnswerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reorder an answer section: MX records first, then A/AAAA, each group in its
/// original relative order. CNAME and uncategorized records are dropped.
pub fn normalize_answers(answers: Vec<Record>) -> Vec<Record> {
    let total = answers.len();
    let mut mail_exchange = Vec::new();
    let mut addresses = Vec::with_capacity(total);
    let mut dropped = 0usize;

    for record in answers {
        match AnswerCategory::of(record.record_type()) {
            AnswerCategory::MailExchange => mail_exchange.push(record),
            AnswerCategory::Address => addresses.push(record),
            AnswerCategory::NameAlias | AnswerCategory::Other => dropped += 1,
        }
    }

    if dropped > 0 {
        trace!(total, dropped, "Dropped alias/uncategorized answers");
    }

    mail_exchange.append(&mut addresses);
    mail_exchange
}

/// Normalize the reply inside a candidate result. Absent or reply-less input passes through.
pub fn normalize(result: Option<AttemptResult>) -> Option<AttemptResult> {
    result.map(|mut result| {
        if let Some(reply) = result.reply.as_mut() {
            let answers = reply.take_answers();
            reply.insert_answers(normalize_answers(answers));
        }
        result
    })
}
