pub mod key_listing;
pub mod replay_transport;

pub use key_listing::{InMemoryKeyListing, SledKeyListing};
pub use replay_transport::{LinkEvent, ReplayTransport, TranscriptError};
