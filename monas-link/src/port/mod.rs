//! Port layer - traits at the boundary with transports, decision-makers and key storage.

pub mod key_listing;
pub mod link_coordinator;

pub use key_listing::{KeyListing, KeyListingError};
pub use link_coordinator::{LinkCoordinator, LinkHandler};
