//! Frame parser for the analysis event stream.
//!
//! This module provides pure parsing functions for converting one
//! `data: <json>` line into a validated [`UpdateEvent`].

use crate::model::{AnalysisResult, DecodeError, UpdateEvent};
use serde::Deserialize;

/// Prefix marking a candidate event record.
pub const EVENT_PREFIX: &str = "data:";

// Frame type string constants
const FRAME_TYPE_PROGRESS: &str = "progress";
const FRAME_TYPE_STREAM: &str = "stream";
const FRAME_TYPE_COMPLETE: &str = "complete";
const FRAME_TYPE_ERROR: &str = "error";

/// Raw JSON structure for deserializing frames.
///
/// Every type-specific field is optional here; which ones are required is
/// decided per frame type in [`parse_frame`].
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    frame_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    step: Option<u32>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    result: Option<serde_json::Value>,
}

/// Strip the event prefix from a line.
///
/// Returns the JSON payload for candidate records, `None` for everything else
/// (blank lines, comments, other SSE fields). One optional space after the
/// colon is consumed.
///
/// # Examples
///
/// ```
/// use shieldnet::parser::strip_event_prefix;
///
/// assert_eq!(strip_event_prefix(r#"data: {"type":"stream"}"#), Some(r#"{"type":"stream"}"#));
/// assert_eq!(strip_event_prefix("data:{}"), Some("{}"));
/// assert_eq!(strip_event_prefix(": keep-alive"), None);
/// ```
pub fn strip_event_prefix(line: &str) -> Option<&str> {
    let payload = line.strip_prefix(EVENT_PREFIX)?;
    Some(payload.strip_prefix(' ').unwrap_or(payload))
}

/// Parse one frame payload into an UpdateEvent.
///
/// # Arguments
///
/// * `payload` - The JSON text following the `data:` prefix
/// * `line_number` - The line number (1-indexed) for error reporting
///
/// # Errors
///
/// - `DecodeError::InvalidJson` when the payload is not a JSON object
/// - `DecodeError::MissingField` when `type` or a field its type requires is absent
/// - `DecodeError::InvalidResult` when a `complete` frame carries an invalid verdict
///
/// Unknown frame types are not errors; they decode to `UpdateEvent::Unknown`.
pub fn parse_frame(payload: &str, line_number: usize) -> Result<UpdateEvent, DecodeError> {
    let raw: RawFrame =
        serde_json::from_str(payload.trim()).map_err(|e| DecodeError::InvalidJson {
            line: line_number,
            message: e.to_string(),
        })?;

    let frame_type = raw.frame_type.ok_or(DecodeError::MissingField {
        line: line_number,
        field: "type",
    })?;

    match frame_type.as_str() {
        FRAME_TYPE_PROGRESS => Ok(UpdateEvent::Progress {
            message: raw.message.ok_or(DecodeError::MissingField {
                line: line_number,
                field: "message",
            })?,
            step: raw.step.ok_or(DecodeError::MissingField {
                line: line_number,
                field: "step",
            })?,
        }),
        FRAME_TYPE_STREAM => Ok(UpdateEvent::Token {
            text: raw.text.ok_or(DecodeError::MissingField {
                line: line_number,
                field: "text",
            })?,
        }),
        FRAME_TYPE_COMPLETE => {
            let value = raw.result.ok_or(DecodeError::MissingField {
                line: line_number,
                field: "result",
            })?;
            let result = parse_result(value, line_number)?;
            Ok(UpdateEvent::Complete(Box::new(result)))
        }
        FRAME_TYPE_ERROR => Ok(UpdateEvent::Error {
            message: raw.message.ok_or(DecodeError::MissingField {
                line: line_number,
                field: "message",
            })?,
        }),
        _ => Ok(UpdateEvent::Unknown { kind: frame_type }),
    }
}

fn parse_result(value: serde_json::Value, line_number: usize) -> Result<AnalysisResult, DecodeError> {
    let result: AnalysisResult =
        serde_json::from_value(value).map_err(|e| DecodeError::InvalidResult {
            line: line_number,
            message: e.to_string(),
        })?;

    result
        .validate()
        .map_err(|message| DecodeError::InvalidResult {
            line: line_number,
            message,
        })?;

    Ok(result)
}
