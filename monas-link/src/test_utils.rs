//! Test utilities and mock implementations for unit testing.

use crate::domain::link::{ApprovalRequest, LinkToken};
use crate::port::link_coordinator::LinkHandler;

/// LinkHandler that records every call it receives and answers approval
/// requests with a fixed decision.
#[derive(Debug, Default)]
pub struct RecordingCoordinator {
    pub calls: Vec<String>,
    pub approval_requests: Vec<ApprovalRequest>,
    pub approve: bool,
}

impl RecordingCoordinator {
    pub fn approving() -> Self {
        Self {
            approve: true,
            ..Self::default()
        }
    }

    pub fn denying() -> Self {
        Self::default()
    }
}

impl LinkHandler for RecordingCoordinator {
    fn token_created(&mut self, token: &LinkToken) {
        self.calls.push(format!("token_created:{token}"));
    }

    fn token_sent(&mut self) {
        self.calls.push("token_sent".to_string());
    }

    fn valid_token(&mut self) {
        self.calls.push("valid_token".to_string());
    }

    fn invalid_token(&mut self) {
        self.calls.push("invalid_token".to_string());
    }

    fn request_approval(&mut self, request: &ApprovalRequest) -> bool {
        self.calls.push("request_approval".to_string());
        self.approval_requests.push(request.clone());
        self.approve
    }

    fn request_denied(&mut self) {
        self.calls.push("request_denied".to_string());
    }

    fn same_account(&mut self) {
        self.calls.push("same_account".to_string());
    }

    fn success(&mut self) {
        self.calls.push("success".to_string());
    }

    fn timeout(&mut self) {
        self.calls.push("timeout".to_string());
    }

    fn error(&mut self) {
        self.calls.push("error".to_string());
    }
}
