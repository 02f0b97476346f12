//! Streaming session: one upload, one verdict.

use crate::model::{AnalysisResult, SessionError, TransportError, UploadRequest};
use crate::stream::{
    ChunkStream, DecodedRecord, Dispatch, Dispatcher, FrameDecoder, SessionState, Transport,
    UpdateHandler,
};
use bytes::Bytes;
use futures_util::StreamExt;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Tuning for a streaming session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Fail with `TransportError::IdleTimeout` when no chunk arrives for this long.
    /// `None` waits forever.
    pub idle_timeout: Option<Duration>,
    /// Cancelling this token stops the session with `SessionError::Cancelled`.
    pub cancel: Option<CancellationToken>,
}

/// Drives one upload from request to verdict.
///
/// Single-use: [`StreamingSession::run`] consumes the session. Reads are
/// strictly sequential; every record of a chunk is fully dispatched before the
/// next chunk is requested, which bounds memory to one chunk plus one pending
/// line. A `complete` frame is kept and the body is read until the server
/// closes it; an `error` frame ends the session immediately. Dropping the
/// `run` future drops the response stream and releases the connection.
pub struct StreamingSession<T> {
    transport: T,
    options: SessionOptions,
    state: SessionState,
}

/// Records seen by one session, for the final log line.
#[derive(Debug, Default)]
struct SessionCounters {
    chunks: usize,
    malformed: usize,
    anomalies: usize,
}

impl<T: Transport> StreamingSession<T> {
    /// Create an idle session with default options.
    pub fn new(transport: T) -> Self {
        Self::with_options(transport, SessionOptions::default())
    }

    pub fn with_options(transport: T, options: SessionOptions) -> Self {
        Self {
            transport,
            options,
            state: SessionState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Upload `request` and resolve to the verdict.
    ///
    /// `handler` receives progress and token callbacks in arrival order, all
    /// before this returns, plus every state transition.
    ///
    /// Resolves once the server closes the stream. A drop, idle timeout or
    /// cancellation after the verdict arrived still yields the verdict.
    ///
    /// # Errors
    ///
    /// - `SessionError::Transport` when the connection fails, drops, or idles out
    /// - `SessionError::Protocol` when the server sends an `error` frame
    /// - `SessionError::IncompleteStream` when the stream ends without a terminal frame
    /// - `SessionError::Cancelled` when the cancellation token fires
    pub async fn run<H>(
        mut self,
        request: UploadRequest,
        mut handler: H,
    ) -> Result<AnalysisResult, SessionError>
    where
        H: UpdateHandler,
    {
        let endpoint = request.endpoint().to_string();
        let mut counters = SessionCounters::default();

        let outcome = self.drive(request, &mut handler, &mut counters).await;

        match &outcome {
            Ok(result) => {
                self.transition(SessionState::TerminatedSuccess, &mut handler);
                info!(
                    endpoint = %endpoint,
                    invoice_id = %result.invoice_id,
                    status = %result.status,
                    chunks = counters.chunks,
                    malformed = counters.malformed,
                    anomalies = counters.anomalies,
                    "Analysis session completed"
                );
            }
            Err(error) => {
                self.transition(SessionState::TerminatedError, &mut handler);
                warn!(
                    endpoint = %endpoint,
                    chunks = counters.chunks,
                    malformed = counters.malformed,
                    "Analysis session failed: {}",
                    error
                );
            }
        }

        outcome
    }

    async fn drive<H>(
        &mut self,
        request: UploadRequest,
        handler: &mut H,
        counters: &mut SessionCounters,
    ) -> Result<AnalysisResult, SessionError>
    where
        H: UpdateHandler,
    {
        self.transition(SessionState::Sending, handler);

        let cancel = self.options.cancel.clone();
        let mut chunks = until_cancelled(cancel.as_ref(), self.transport.open(request)).await??;

        self.transition(SessionState::AwaitingEvents, handler);

        let mut decoder = FrameDecoder::new();
        let mut dispatcher = Dispatcher::new();
        let mut verdict: Option<AnalysisResult> = None;

        // Read to the end of the body after `complete`; stop at once on `error`.
        loop {
            let next = until_cancelled(cancel.as_ref(), self.next_chunk(&mut chunks))
                .await
                .and_then(|next| next);

            let next = match next {
                Ok(next) => next,
                Err(error) => {
                    return match verdict {
                        Some(result) => {
                            warn!("Stream ended abnormally after the verdict: {}", error);
                            Ok(result)
                        }
                        None => Err(error),
                    };
                }
            };

            let (records, at_end) = match next {
                Some(chunk) => {
                    counters.chunks += 1;
                    debug!(bytes = chunk.len(), "Received chunk");
                    (decoder.push(&chunk), false)
                }
                None => (decoder.finish().into_iter().collect(), true),
            };

            if let Some(error) =
                apply_records(records, &mut dispatcher, handler, counters, &mut verdict)
            {
                // Returning drops `chunks`, which releases the connection.
                return Err(error);
            }

            if at_end {
                return verdict.ok_or(SessionError::IncompleteStream);
            }
        }
    }

    async fn next_chunk(&self, chunks: &mut ChunkStream) -> Result<Option<Bytes>, SessionError> {
        let next = chunks.next();
        let item = match self.options.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, next).await {
                Ok(item) => item,
                Err(_) => return Err(TransportError::IdleTimeout { limit }.into()),
            },
            None => next.await,
        };

        match item {
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(error)) => Err(error.into()),
            None => {
                debug!("Transport signalled end of stream");
                Ok(None)
            }
        }
    }

    fn transition<H>(&mut self, next: SessionState, handler: &mut H)
    where
        H: UpdateHandler,
    {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "Session state change");
        self.state = next;
        handler.on_state(next);
    }
}

/// Dispatch a batch of records.
///
/// The first `complete` is stored in `verdict`. Returns the failure when an
/// `error` frame arrives first. Records after the terminal event are still
/// handed to the dispatcher so it can report them as anomalies; it never
/// forwards them.
fn apply_records<H>(
    records: Vec<DecodedRecord>,
    dispatcher: &mut Dispatcher,
    handler: &mut H,
    counters: &mut SessionCounters,
    verdict: &mut Option<AnalysisResult>,
) -> Option<SessionError>
where
    H: UpdateHandler,
{
    let mut failure = None;

    for record in records {
        match record {
            DecodedRecord::Malformed(_) => counters.malformed += 1,
            DecodedRecord::Event { line, event } => {
                match dispatcher.dispatch(line, event, handler) {
                    Dispatch::Continue => {}
                    Dispatch::AfterTerminal => counters.anomalies += 1,
                    Dispatch::Complete(result) => *verdict = Some(*result),
                    Dispatch::Failed(message) => {
                        failure = Some(SessionError::Protocol { message })
                    }
                }
            }
        }
    }

    failure
}

async fn until_cancelled<F>(
    cancel: Option<&CancellationToken>,
    future: F,
) -> Result<F::Output, SessionError>
where
    F: Future,
{
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(SessionError::Cancelled),
            output = future => Ok(output),
        },
        None => Ok(future.await),
    }
}
