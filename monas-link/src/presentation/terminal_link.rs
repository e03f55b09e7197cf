//! Interactive link handler for a terminal.

use std::io::{BufRead, Write};

use crate::domain::link::{ApprovalRequest, LinkToken};
use crate::port::link_coordinator::LinkHandler;

/// Interprets the answer to the approval prompt. Only an explicit `yes`
/// approves; anything else, including an empty answer, denies.
pub fn parse_confirmation(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

/// Asks `question` and reads one line of answer. Write or read failures deny.
pub fn prompt_confirmation(
    input: &mut impl BufRead,
    output: &mut impl Write,
    question: &str,
) -> bool {
    if let Err(e) = writeln!(output, "{question}").and_then(|_| output.flush()) {
        tracing::warn!("Failed to write to terminal: {}", e);
        return false;
    }
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => parse_confirmation(&answer),
        Err(e) => {
            tracing::warn!("Failed to read answer: {}", e);
            false
        }
    }
}

/// Prints handshake progress and asks the user to approve new keys.
pub struct TerminalLinkHandler<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalLinkHandler<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn say(&mut self, message: &str) {
        if let Err(e) = writeln!(self.output, "{message}").and_then(|_| self.output.flush()) {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }
}

impl<R: BufRead, W: Write> LinkHandler for TerminalLinkHandler<R, W> {
    fn token_created(&mut self, token: &LinkToken) {
        self.say(&format!(
            "To link a machine, run: \n\n> monas-link link {token}\n"
        ));
    }

    fn token_sent(&mut self) {
        self.say("Linking...");
    }

    fn valid_token(&mut self) {
        self.say("Valid token");
    }

    fn invalid_token(&mut self) {
        self.say("That token looks invalid.");
    }

    fn request_approval(&mut self, request: &ApprovalRequest) -> bool {
        let question = format!(
            "Does this look right? (yes/no)\n\n{}\n{}\nIP: {}",
            request.fingerprint, request.remote_public_key, request.remote_address
        );
        prompt_confirmation(&mut self.input, &mut self.output, &question)
    }

    fn request_denied(&mut self) {
        self.say("Not Linked :(");
    }

    fn same_account(&mut self) {
        self.say("Linked! You already linked this key btw.");
    }

    fn success(&mut self) {
        self.say("Linked!");
    }

    fn timeout(&mut self) {
        self.say("Timed out. Sorry.");
    }

    fn error(&mut self) {
        self.say("Error, something's wrong.");
    }
}
