//! Update dispatcher.
//!
//! Routes decoded events to the caller's [`UpdateHandler`] and detects the
//! terminal event of a session.

use crate::model::{AnalysisResult, UpdateEvent};
use crate::stream::SessionState;
use tracing::{debug, warn};

/// Capability set a caller supplies to observe a session.
///
/// Handlers run synchronously: each call returns before the next record is
/// dispatched and before the next chunk is read. Accumulating tokens into a
/// transcript is the handler's job.
pub trait UpdateHandler {
    /// A pipeline step started on the server.
    fn on_progress(&mut self, message: &str, step: u32);

    /// An incremental piece of model output arrived.
    fn on_token(&mut self, text: &str);

    /// The session moved to `state`.
    fn on_state(&mut self, _state: SessionState) {}
}

impl<H: UpdateHandler + ?Sized> UpdateHandler for &mut H {
    fn on_progress(&mut self, message: &str, step: u32) {
        (**self).on_progress(message, step);
    }

    fn on_token(&mut self, text: &str) {
        (**self).on_token(text);
    }

    fn on_state(&mut self, state: SessionState) {
        (**self).on_state(state);
    }
}

/// Handler built from two closures.
///
/// ```
/// use shieldnet::stream::{Callbacks, UpdateHandler};
///
/// let mut steps = Vec::new();
/// let mut text = String::new();
/// let mut handler = Callbacks::new(|_msg: &str, step| steps.push(step), |t: &str| text.push_str(t));
/// handler.on_progress("Reading file", 1);
/// handler.on_token("Hello");
/// drop(handler);
/// assert_eq!(steps, vec![1]);
/// assert_eq!(text, "Hello");
/// ```
pub struct Callbacks<P, T> {
    on_progress: P,
    on_token: T,
}

impl<P, T> Callbacks<P, T>
where
    P: FnMut(&str, u32),
    T: FnMut(&str),
{
    pub fn new(on_progress: P, on_token: T) -> Self {
        Self {
            on_progress,
            on_token,
        }
    }
}

impl<P, T> UpdateHandler for Callbacks<P, T>
where
    P: FnMut(&str, u32),
    T: FnMut(&str),
{
    fn on_progress(&mut self, message: &str, step: u32) {
        (self.on_progress)(message, step);
    }

    fn on_token(&mut self, text: &str) {
        (self.on_token)(text);
    }
}

/// What the session should do after a record was dispatched.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Non-terminal event handled (or ignored); keep reading.
    Continue,
    /// The session's verdict arrived.
    Complete(Box<AnalysisResult>),
    /// The server reported failure with this message.
    Failed(String),
    /// A terminal event was already seen; this record was reported, not dispatched.
    AfterTerminal,
}

/// Classifies events and invokes the handler.
///
/// The first terminal event wins. Anything dispatched after it is an anomaly:
/// a second terminal event is logged at `warn`, other events at `debug`, and
/// none of them reach the handler.
#[derive(Debug, Default)]
pub struct Dispatcher {
    terminal: Option<&'static str>,
    dispatched: usize,
    anomalies: usize,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one event decoded at `line`.
    pub fn dispatch<H>(&mut self, line: usize, event: UpdateEvent, handler: &mut H) -> Dispatch
    where
        H: UpdateHandler + ?Sized,
    {
        if let Some(first) = self.terminal {
            self.anomalies += 1;
            if event.is_terminal() {
                warn!(
                    line,
                    first,
                    kind = event.kind(),
                    "Ignoring terminal event after session already terminated"
                );
            } else {
                debug!(line, kind = event.kind(), "Ignoring event after terminal event");
            }
            return Dispatch::AfterTerminal;
        }

        debug!(line, kind = event.kind(), "Dispatching event");

        match event {
            UpdateEvent::Progress { message, step } => {
                self.dispatched += 1;
                handler.on_progress(&message, step);
                Dispatch::Continue
            }
            UpdateEvent::Token { text } => {
                self.dispatched += 1;
                handler.on_token(&text);
                Dispatch::Continue
            }
            UpdateEvent::Complete(result) => {
                self.dispatched += 1;
                self.terminal = Some("complete");
                Dispatch::Complete(result)
            }
            UpdateEvent::Error { message } => {
                self.dispatched += 1;
                self.terminal = Some("error");
                Dispatch::Failed(message)
            }
            UpdateEvent::Unknown { kind } => {
                debug!(line, kind = %kind, "Ignoring unknown event type");
                Dispatch::Continue
            }
        }
    }

    /// Whether a terminal event has been seen.
    pub fn is_terminated(&self) -> bool {
        self.terminal.is_some()
    }

    /// Events routed (including the terminal one).
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Events received after the terminal event.
    pub fn anomalies(&self) -> usize {
        self.anomalies
    }
}
