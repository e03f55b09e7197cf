//! Handshake vocabulary shared by the link session and its coordinators.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::fingerprint::Fingerprint;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkTokenError {
    #[error("link token is empty")]
    Empty,
}

/// Single-use token identifying one pending link handshake.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LinkToken(String);

impl LinkToken {
    pub fn new(token: impl Into<String>) -> Result<Self, LinkTokenError> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(LinkTokenError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LinkToken {
    type Error = LinkTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LinkToken::new(value)
    }
}

impl From<LinkToken> for String {
    fn from(token: LinkToken) -> Self {
        token.0
    }
}

impl fmt::Display for LinkToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Generating side before the token exists.
    New,
    Created,
    TokenIssued,
    AwaitingApproval,
    Approved,
    Denied,
    SameAccount,
    Timeout,
    Error,
    InvalidToken,
}

impl LinkState {
    pub fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn outcome(&self) -> Option<LinkOutcome> {
        match self {
            LinkState::Approved => Some(LinkOutcome::Approved),
            LinkState::Denied => Some(LinkOutcome::Denied),
            LinkState::SameAccount => Some(LinkOutcome::SameAccount),
            LinkState::Timeout => Some(LinkOutcome::Timeout),
            LinkState::Error => Some(LinkOutcome::Error),
            LinkState::InvalidToken => Some(LinkOutcome::InvalidToken),
            LinkState::New
            | LinkState::Created
            | LinkState::TokenIssued
            | LinkState::AwaitingApproval => None,
        }
    }
}

/// Terminal result of a handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOutcome {
    Approved,
    /// The key was already linked. Nothing new is recorded.
    SameAccount,
    Denied,
    InvalidToken,
    Timeout,
    Error,
}

impl LinkOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LinkOutcome::Approved | LinkOutcome::SameAccount)
    }

    pub fn is_protocol_error(&self) -> bool {
        matches!(self, LinkOutcome::InvalidToken | LinkOutcome::Error)
    }
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkOutcome::Approved => write!(f, "approved"),
            LinkOutcome::SameAccount => write!(f, "already linked"),
            LinkOutcome::Denied => write!(f, "denied"),
            LinkOutcome::InvalidToken => write!(f, "invalid token"),
            LinkOutcome::Timeout => write!(f, "timed out"),
            LinkOutcome::Error => write!(f, "error"),
        }
    }
}

/// What the decision-maker sees before authorizing a new key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequest {
    pub remote_public_key: String,
    pub fingerprint: Fingerprint,
    pub remote_address: String,
}
