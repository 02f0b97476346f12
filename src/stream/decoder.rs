//! Event frame decoder.
//!
//! Turns transport chunks into complete event records. Chunk boundaries are
//! arbitrary: they may split a line, a JSON value, or a multi-byte UTF-8
//! character, so buffering happens on bytes and text is only decoded once a
//! line is complete.

use crate::model::{DecodeError, MalformedFrame, UpdateEvent};
use crate::parser;
use std::collections::VecDeque;
use tracing::{trace, warn};

/// One complete candidate record produced by the decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedRecord {
    /// A frame that decoded into an update event.
    Event {
        /// 1-based line number within the response body.
        line: usize,
        event: UpdateEvent,
    },
    /// A frame that failed to decode. Reported, never fatal.
    Malformed(MalformedFrame),
}

/// Incremental decoder for newline-delimited `data:` frames.
///
/// Holds the pending fragment (the incomplete last line) between chunks. The
/// fragment is never decoded until a later chunk completes it or
/// [`FrameDecoder::finish`] flushes it at end of stream.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending: Vec<u8>,
    line_number: usize,
}

impl FrameDecoder {
    /// Create a decoder with an empty pending buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every record it completes, in order.
    ///
    /// Lines that are not candidate records (blank lines, comments, other SSE
    /// fields) advance the line counter and are otherwise discarded.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<DecodedRecord> {
        let scan_from = self.pending.len();
        self.pending.extend_from_slice(chunk);

        let mut records = Vec::new();
        let mut line_start = 0;
        let mut search_from = scan_from;

        while let Some(offset) = self.pending[search_from..]
            .iter()
            .position(|&byte| byte == b'\n')
        {
            let line_end = search_from + offset;
            self.line_number += 1;
            if let Some(record) = decode_line(&self.pending[line_start..line_end], self.line_number)
            {
                records.push(record);
            }
            line_start = line_end + 1;
            search_from = line_start;
        }

        self.pending.drain(..line_start);
        records
    }

    /// Flush the pending fragment at end of stream.
    ///
    /// A non-empty fragment is evaluated one final time as a candidate record.
    /// Afterwards the buffer is empty, so calling this again returns `None`.
    pub fn finish(&mut self) -> Option<DecodedRecord> {
        if self.pending.is_empty() {
            return None;
        }

        let fragment = std::mem::take(&mut self.pending);
        self.line_number += 1;
        decode_line(&fragment, self.line_number)
    }

    /// Bytes currently held in the pending buffer.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of lines seen so far, including non-candidate lines.
    pub fn lines_seen(&self) -> usize {
        self.line_number
    }
}

/// Decode a sequence of chunks lazily.
///
/// Records are produced on demand; the end-of-stream flush runs when the chunk
/// iterator is exhausted. The sequence is finite and cannot be restarted.
pub fn decode_chunks<I>(chunks: I) -> impl Iterator<Item = DecodedRecord>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut decoder = FrameDecoder::new();
    let mut chunks = chunks.into_iter();
    let mut ready: VecDeque<DecodedRecord> = VecDeque::new();

    std::iter::from_fn(move || loop {
        if let Some(record) = ready.pop_front() {
            return Some(record);
        }
        match chunks.next() {
            Some(chunk) => ready.extend(decoder.push(chunk.as_ref())),
            None => return decoder.finish(),
        }
    })
}

fn decode_line(bytes: &[u8], line_number: usize) -> Option<DecodedRecord> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);

    let line = match std::str::from_utf8(bytes) {
        Ok(line) => line,
        Err(_) => {
            // Only candidate lines are worth reporting.
            if !bytes.starts_with(parser::EVENT_PREFIX.as_bytes()) {
                return None;
            }
            let error = DecodeError::InvalidUtf8 { line: line_number };
            warn!(line = line_number, "Skipping frame: {}", error);
            return Some(DecodedRecord::Malformed(MalformedFrame::new(
                String::from_utf8_lossy(bytes),
                error,
            )));
        }
    };

    let Some(payload) = parser::strip_event_prefix(line) else {
        trace!(line = line_number, "Ignoring non-event line");
        return None;
    };

    match parser::parse_frame(payload, line_number) {
        Ok(event) => Some(DecodedRecord::Event {
            line: line_number,
            event,
        }),
        Err(error) => {
            warn!(line = line_number, "Skipping frame: {}", error);
            Some(DecodedRecord::Malformed(MalformedFrame::new(line, error)))
        }
    }
}
