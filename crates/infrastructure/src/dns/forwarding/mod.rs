pub mod message_builder;

pub use message_builder::{MessageBuilder, MIN_UDP_PAYLOAD};
