//! Transport that replays a recorded handshake.
//!
//! A transcript is JSON lines, one [`LinkEvent`] per line:
//!
//! ```text
//! {"event":"token_created","token":"a1b2c3"}
//! {"event":"token_sent"}
//! {"event":"valid_token"}
//! {"event":"request_approval","remote_public_key":"AAAA...","remote_address":"203.0.113.7"}
//! {"event":"success"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::domain::link::LinkToken;
use crate::port::link_coordinator::LinkCoordinator;

/// One capability call on a [`LinkCoordinator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LinkEvent {
    TokenCreated {
        token: LinkToken,
    },
    TokenSent,
    ValidToken,
    InvalidToken,
    RequestApproval {
        remote_public_key: String,
        remote_address: String,
    },
    RequestDenied,
    SameAccount,
    Success,
    Timeout,
    Error,
}

impl LinkEvent {
    /// Delivers the event. Returns the decision for `RequestApproval`.
    pub fn dispatch(self, coordinator: &mut impl LinkCoordinator) -> Option<bool> {
        match self {
            LinkEvent::TokenCreated { token } => coordinator.token_created(token),
            LinkEvent::TokenSent => coordinator.token_sent(),
            LinkEvent::ValidToken => coordinator.valid_token(),
            LinkEvent::InvalidToken => coordinator.invalid_token(),
            LinkEvent::RequestApproval {
                remote_public_key,
                remote_address,
            } => {
                return Some(coordinator.request_approval(&remote_public_key, &remote_address));
            }
            LinkEvent::RequestDenied => coordinator.request_denied(),
            LinkEvent::SameAccount => coordinator.same_account(),
            LinkEvent::Success => coordinator.success(),
            LinkEvent::Timeout => coordinator.timeout(),
            LinkEvent::Error => coordinator.error(),
        }
        None
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("failed to read transcript: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid event on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayTransport {
    events: Vec<LinkEvent>,
}

impl ReplayTransport {
    pub fn new(events: Vec<LinkEvent>) -> Self {
        Self { events }
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self, TranscriptError> {
        let mut events = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let event = serde_json::from_str(trimmed).map_err(|source| TranscriptError::Parse {
                line: index + 1,
                source,
            })?;
            events.push(event);
        }
        Ok(Self { events })
    }

    pub fn events(&self) -> &[LinkEvent] {
        &self.events
    }

    /// Replays the events in order.
    ///
    /// A negative approval answer ends the replay with `request_denied`, the
    /// way the remote side reacts to a refusal.
    pub fn run(self, coordinator: &mut impl LinkCoordinator) {
        for event in self.events {
            tracing::debug!("Replaying {:?}", event);
            if event.dispatch(coordinator) == Some(false) {
                coordinator.request_denied();
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_service::link_session::LinkSession;
    use crate::domain::link::LinkOutcome;
    use crate::test_utils::RecordingCoordinator;

    const TRANSCRIPT: &str = r#"
# generated on the account holder's machine
{"event":"token_created","token":"a1b2c3"}
{"event":"token_sent"}
{"event":"valid_token"}
{"event":"request_approval","remote_public_key":"aGVsbG8=","remote_address":"203.0.113.7"}
{"event":"success"}
"#;

    #[test]
    fn parses_transcript_lines() {
        let transport = ReplayTransport::from_reader(TRANSCRIPT.as_bytes()).unwrap();
        assert_eq!(transport.events().len(), 5);
        assert_eq!(
            transport.events()[0],
            LinkEvent::TokenCreated {
                token: LinkToken::new("a1b2c3").unwrap()
            }
        );
    }

    #[test]
    fn reports_line_of_bad_event() {
        let input = "{\"event\":\"token_sent\"}\n{\"event\":\"launch_rockets\"}\n";
        let err = ReplayTransport::from_reader(input.as_bytes()).unwrap_err();
        assert!(matches!(err, TranscriptError::Parse { line: 2, .. }));
    }

    #[test]
    fn approved_replay_links_key() {
        let transport = ReplayTransport::from_reader(TRANSCRIPT.as_bytes()).unwrap();
        let mut session = LinkSession::generate(RecordingCoordinator::approving());

        transport.run(&mut session);
        assert_eq!(session.outcome(), Some(LinkOutcome::Approved));
    }

    #[test]
    fn refusal_stops_replay_with_denial() {
        let transport = ReplayTransport::from_reader(TRANSCRIPT.as_bytes()).unwrap();
        let mut session = LinkSession::generate(RecordingCoordinator::denying());

        transport.run(&mut session);
        assert_eq!(session.outcome(), Some(LinkOutcome::Denied));
        assert!(!session.handler().calls.contains(&"success".to_string()));
    }
}
