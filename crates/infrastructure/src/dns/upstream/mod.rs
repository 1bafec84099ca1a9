pub mod network;

pub use network::NetworkUpstream;
