//! Live session output.

use crate::stream::{SessionState, UpdateHandler};
use std::io::{self, Write};

/// Prints progress steps and streamed reasoning as they arrive.
///
/// Tokens are written verbatim (when `show_thinking` is on) and accumulated
/// into a transcript either way. Write failures do not interrupt the session;
/// the first one is kept and returned by [`TerminalReporter::finish`].
pub struct TerminalReporter<W: Write> {
    out: W,
    show_thinking: bool,
    transcript: String,
    mid_line: bool,
    error: Option<io::Error>,
}

impl<W: Write> TerminalReporter<W> {
    pub fn new(out: W, show_thinking: bool) -> Self {
        Self {
            out,
            show_thinking,
            transcript: String::new(),
            mid_line: false,
            error: None,
        }
    }

    /// Text streamed so far.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Close any open line and hand back the transcript.
    pub fn finish(mut self) -> io::Result<String> {
        self.end_line();
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.transcript),
        }
    }

    fn end_line(&mut self) {
        if self.mid_line {
            self.mid_line = false;
            self.write(b"\n");
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.out.write_all(bytes).and_then(|_| self.out.flush()) {
            self.error = Some(error);
        }
    }
}

impl<W: Write> UpdateHandler for TerminalReporter<W> {
    fn on_progress(&mut self, message: &str, step: u32) {
        self.end_line();
        let line = format!("[{}] {}\n", step, message);
        self.write(line.as_bytes());
    }

    fn on_token(&mut self, text: &str) {
        self.transcript.push_str(text);
        if self.show_thinking && !text.is_empty() {
            self.mid_line = !text.ends_with('\n');
            self.write(text.as_bytes());
        }
    }

    fn on_state(&mut self, state: SessionState) {
        if state == SessionState::AwaitingEvents {
            self.write(b"Uploaded, waiting for analysis...\n");
        }
    }
}
