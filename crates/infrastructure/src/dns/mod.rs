pub mod fanmerge;
pub mod filter;
pub mod forwarding;
pub mod refused;
pub mod transport;
pub mod upstream;

pub use fanmerge::{Fanmerge, FanmergeBuilder, FanmergeSettings};
pub use filter::EligibilityFilter;
pub use refused::RefusedHandler;
pub use upstream::NetworkUpstream;
