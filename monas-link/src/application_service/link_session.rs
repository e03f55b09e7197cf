//! Link handshake state machine.
//!
//! A [`LinkSession`] receives transport notifications through
//! [`LinkCoordinator`], checks them against the handshake order and forwards
//! the accepted ones to a [`LinkHandler`]. Once a terminal state is reached
//! the session is inert.

use crate::domain::fingerprint::{compute_fingerprint, compute_fingerprint_from_line, Fingerprint};
use crate::domain::link::{ApprovalRequest, LinkOutcome, LinkState, LinkToken};
use crate::port::link_coordinator::{LinkCoordinator, LinkHandler};

use LinkState::*;

/// Which end of the handshake a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    /// Generates the token and authorizes the new key locally.
    Generating,
    /// Presents a token; approval happens on the remote side.
    Accepting,
}

pub struct LinkSession<H: LinkHandler> {
    handler: H,
    role: LinkRole,
    token: Option<LinkToken>,
    remote_public_key: Option<String>,
    remote_address: Option<String>,
    state: LinkState,
    decision: Option<bool>,
    outcome_reported: bool,
}

impl<H: LinkHandler> LinkSession<H> {
    /// Session for the side that generates a token and approves the new key.
    pub fn generate(handler: H) -> Self {
        Self::with_state(handler, LinkRole::Generating, None, New)
    }

    /// Session for the side that was given a token and asks to be linked.
    pub fn accept(token: LinkToken, handler: H) -> Self {
        Self::with_state(handler, LinkRole::Accepting, Some(token), Created)
    }

    fn with_state(
        handler: H,
        role: LinkRole,
        token: Option<LinkToken>,
        state: LinkState,
    ) -> Self {
        Self {
            handler,
            role,
            token,
            remote_public_key: None,
            remote_address: None,
            state,
            decision: None,
            outcome_reported: false,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn role(&self) -> LinkRole {
        self.role
    }

    pub fn token(&self) -> Option<&LinkToken> {
        self.token.as_ref()
    }

    pub fn remote_public_key(&self) -> Option<&str> {
        self.remote_public_key.as_deref()
    }

    pub fn remote_address(&self) -> Option<&str> {
        self.remote_address.as_deref()
    }

    /// The local approval decision, if one was taken.
    pub fn decision(&self) -> Option<bool> {
        self.decision
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn outcome(&self) -> Option<LinkOutcome> {
        self.state.outcome()
    }

    /// Hands out the terminal outcome. Returns `Some` at most once per session.
    pub fn take_outcome(&mut self) -> Option<LinkOutcome> {
        if self.outcome_reported {
            return None;
        }
        let outcome = self.state.outcome()?;
        self.outcome_reported = true;
        Some(outcome)
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Moves to `next` if the current state is one of `allowed`.
    fn advance(&mut self, trigger: &str, allowed: &[LinkState], next: LinkState) -> bool {
        if self.state.is_terminal() {
            tracing::warn!(
                "Ignoring {} for link session already in terminal state {:?}",
                trigger,
                self.state
            );
            return false;
        }
        if !allowed.contains(&self.state) {
            tracing::warn!("Ignoring out-of-order {} in state {:?}", trigger, self.state);
            return false;
        }

        tracing::debug!("Link session {:?} -> {:?} on {}", self.state, next, trigger);
        self.state = next;
        if let Some(outcome) = next.outcome() {
            tracing::info!("Link session finished: {}", outcome);
        }
        true
    }

    fn fingerprint_remote_key(remote_public_key: &str) -> Option<Fingerprint> {
        compute_fingerprint(remote_public_key.trim())
            .or_else(|_| compute_fingerprint_from_line(remote_public_key))
            .ok()
    }
}

impl<H: LinkHandler> LinkCoordinator for LinkSession<H> {
    fn token_created(&mut self, token: LinkToken) {
        if self.advance("token_created", &[New], Created) {
            self.handler.token_created(&token);
            self.token = Some(token);
        }
    }

    fn token_sent(&mut self) {
        if self.advance("token_sent", &[New, Created], TokenIssued) {
            self.handler.token_sent();
        }
    }

    fn valid_token(&mut self) {
        if self.advance("valid_token", &[Created, TokenIssued], AwaitingApproval) {
            self.handler.valid_token();
        }
    }

    fn invalid_token(&mut self) {
        if self.advance("invalid_token", &[Created, TokenIssued], InvalidToken) {
            self.handler.invalid_token();
        }
    }

    fn request_approval(&mut self, remote_public_key: &str, remote_address: &str) -> bool {
        if self.state != AwaitingApproval {
            tracing::warn!("Denying approval request in state {:?}", self.state);
            return false;
        }
        if self.decision.is_some() {
            tracing::warn!("Denying repeated approval request");
            return false;
        }

        self.remote_public_key = Some(remote_public_key.to_string());
        self.remote_address = Some(remote_address.to_string());

        let Some(fingerprint) = Self::fingerprint_remote_key(remote_public_key) else {
            tracing::warn!("Denying approval: remote public key could not be decoded");
            self.decision = Some(false);
            return false;
        };
        if remote_address.trim().is_empty() {
            tracing::warn!("Denying approval: remote address is missing");
            self.decision = Some(false);
            return false;
        }

        let request = ApprovalRequest {
            remote_public_key: remote_public_key.to_string(),
            fingerprint,
            remote_address: remote_address.to_string(),
        };
        let approved = self.handler.request_approval(&request);
        tracing::info!(
            "Link request from {} for {} {}",
            request.remote_address,
            request.fingerprint,
            if approved { "approved" } else { "denied" }
        );
        self.decision = Some(approved);
        approved
    }

    fn request_denied(&mut self) {
        if self.advance("request_denied", &[TokenIssued, AwaitingApproval], Denied) {
            self.handler.request_denied();
        }
    }

    fn same_account(&mut self) {
        if self.advance("same_account", &[TokenIssued, AwaitingApproval], SameAccount) {
            self.handler.same_account();
        }
    }

    fn success(&mut self) {
        if !self.state.is_terminal() {
            if self.decision == Some(false) {
                tracing::warn!("Ignoring success for a link request that was denied locally");
                return;
            }
            if self.role == LinkRole::Generating && self.decision != Some(true) {
                tracing::warn!("Ignoring success for a link request that was never approved");
                return;
            }
        }
        if self.advance("success", &[AwaitingApproval], Approved) {
            self.handler.success();
        }
    }

    fn timeout(&mut self) {
        let live = [New, Created, TokenIssued, AwaitingApproval];
        if self.advance("timeout", &live, Timeout) {
            self.handler.timeout();
        }
    }

    fn error(&mut self) {
        let live = [New, Created, TokenIssued, AwaitingApproval];
        if self.advance("error", &live, Error) {
            self.handler.error();
        }
    }
}
