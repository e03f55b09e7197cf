//! Capability set of the link handshake.

use crate::domain::link::{ApprovalRequest, LinkToken};

/// Notifications a transport delivers while it runs one link handshake.
///
/// Implemented by [`crate::LinkSession`], which validates the order of calls
/// before passing them on to a [`LinkHandler`].
pub trait LinkCoordinator {
    /// A token was generated; it is shared out-of-band by the initiating side.
    fn token_created(&mut self, token: LinkToken);

    /// The token was handed to the remote peer.
    fn token_sent(&mut self);

    /// The remote peer confirmed the token.
    fn valid_token(&mut self);

    /// The remote peer rejected the token.
    fn invalid_token(&mut self);

    /// Asks whether `remote_public_key` connecting from `remote_address` may
    /// be linked to the account. Returns `true` only on explicit approval.
    fn request_approval(&mut self, remote_public_key: &str, remote_address: &str) -> bool;

    fn request_denied(&mut self);

    /// The remote key is already linked to this account.
    fn same_account(&mut self);

    fn success(&mut self);

    fn timeout(&mut self);

    fn error(&mut self);
}

/// The human or policy side of a handshake.
///
/// Every method is called at most once per session and only in a valid
/// handshake order. After a terminal notification nothing else is delivered.
pub trait LinkHandler {
    fn token_created(&mut self, token: &LinkToken);

    fn token_sent(&mut self);

    fn valid_token(&mut self);

    fn invalid_token(&mut self);

    /// Decides whether to link the key described by `request`.
    fn request_approval(&mut self, request: &ApprovalRequest) -> bool;

    fn request_denied(&mut self);

    fn same_account(&mut self);

    fn success(&mut self);

    fn timeout(&mut self);

    fn error(&mut self);
}
