//! Streaming analysis client.
//!
//! Three layers, leaf first:
//! - [`decoder`]: raw chunks → complete `data:` records, across arbitrary chunk boundaries
//! - [`dispatcher`]: records → handler callbacks, terminal event detection
//! - [`session`]: request lifecycle, idle timeout and cancellation
//!
//! The transport is abstracted behind [`Transport`] so the session can be
//! driven by the HTTP client or by a scripted stream in tests.

use crate::model::{TransportError, UploadRequest};
use bytes::Bytes;
use futures_util::stream::BoxStream;
use std::fmt;
use std::future::Future;

pub mod decoder;
pub mod dispatcher;
pub mod session;

pub use decoder::{decode_chunks, DecodedRecord, FrameDecoder};
pub use dispatcher::{Callbacks, Dispatch, Dispatcher, UpdateHandler};
pub use session::{SessionOptions, StreamingSession};

/// Response body of an upload, one chunk per transport delivery.
pub type ChunkStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Opens the upload and hands back the response body as a chunk stream.
pub trait Transport {
    /// Send `request` and wait until the response starts.
    ///
    /// Fails with `TransportError::Connect` when no response arrives and
    /// `TransportError::Status` when the server refuses the upload.
    fn open(
        &self,
        request: UploadRequest,
    ) -> impl Future<Output = Result<ChunkStream, TransportError>> + Send;
}

/// Lifecycle of a streaming session.
///
/// `Idle → Sending → AwaitingEvents → TerminatedSuccess | TerminatedError`.
/// `Sending` may also go straight to `TerminatedError` when the connection
/// cannot be established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Sending,
    AwaitingEvents,
    TerminatedSuccess,
    TerminatedError,
}

impl SessionState {
    /// Whether no further transitions can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::TerminatedSuccess | SessionState::TerminatedError
        )
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Sending)
                | (Sending, AwaitingEvents)
                | (Sending, TerminatedError)
                | (AwaitingEvents, TerminatedSuccess)
                | (AwaitingEvents, TerminatedError)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Sending => "sending",
            SessionState::AwaitingEvents => "awaiting-events",
            SessionState::TerminatedSuccess => "terminated-success",
            SessionState::TerminatedError => "terminated-error",
        };
        f.write_str(name)
    }
}
