//! Property-based tests for the frame decoder.
//!
//! Tests validate:
//! 1. Chunk-boundary independence: any split of a stream decodes to the same records
//! 2. Malformed frames never hide valid neighbours
//! 3. Decoding never panics on arbitrary bytes

use proptest::prelude::*;
use serde_json::json;
use shieldnet::model::UpdateEvent;
use shieldnet::stream::{decode_chunks, DecodedRecord};

const LITERAL_STREAM: &str = concat!(
    "data: {\"type\":\"progress\",\"message\":\"Reading file\",\"step\":1}\n",
    "data: {\"type\":\"stream\",\"text\":\"Hello\"}\n",
    "data: {\"type\":\"stream\",\"text\":\" world\"}\n",
    "data: {\"type\":\"complete\",\"result\":{\"invoiceId\":\"INV-1\",\"status\":\"approved\",",
    "\"confidence\":90,\"fraudScore\":5,\"localChecks\":[],\"networkSignals\":[],",
    "\"explanation\":\"ok\",\"vendor\":\"Acme\",\"amount\":100,\"currency\":\"USDC\"}}\n",
);

fn split_at_points(bytes: &[u8], points: &[usize]) -> Vec<Vec<u8>> {
    let mut cuts: Vec<usize> = points.iter().map(|p| p % (bytes.len() + 1)).collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut chunks = Vec::new();
    let mut start = 0;
    for cut in cuts {
        chunks.push(bytes[start..cut].to_vec());
        start = cut;
    }
    chunks.push(bytes[start..].to_vec());
    chunks
}

fn decode_whole(bytes: &[u8]) -> Vec<DecodedRecord> {
    decode_chunks(std::iter::once(bytes)).collect()
}

/// One line of a stream, including non-event noise.
fn arb_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (any::<String>(), 0u32..50).prop_map(|(message, step)| {
            format!(
                "data: {}",
                json!({"type": "progress", "message": message, "step": step})
            )
        }),
        any::<String>().prop_map(|text| format!("data: {}", json!({"type": "stream", "text": text}))),
        "[a-z ]{0,20}".prop_map(|message| format!("data:{}", json!({"type": "error", "message": message}))),
        Just("data: {\"type\":\"progress\",".to_string()),
        Just("data: {\"type\":\"heartbeat\"}".to_string()),
        Just(String::new()),
        Just(": keep-alive".to_string()),
        Just("event: progress".to_string()),
    ]
}

fn arb_stream() -> impl Strategy<Value = Vec<u8>> {
    (
        prop::collection::vec(arb_line(), 0..12),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(lines, crlf, trailing_newline)| {
            let separator = if crlf { "\r\n" } else { "\n" };
            let mut body = lines.join(separator);
            if trailing_newline {
                body.push_str(separator);
            }
            body.into_bytes()
        })
}

// ===== Property 1: Chunk-Boundary Independence =====

proptest! {
    #[test]
    fn any_split_decodes_like_single_chunk(
        stream in arb_stream(),
        points in prop::collection::vec(any::<usize>(), 0..16),
    ) {
        let expected = decode_whole(&stream);
        let chunks = split_at_points(&stream, &points);
        let actual: Vec<DecodedRecord> = decode_chunks(chunks).collect();

        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn byte_by_byte_decodes_like_single_chunk(stream in arb_stream()) {
        let expected = decode_whole(&stream);
        let actual: Vec<DecodedRecord> = decode_chunks(stream.chunks(1)).collect();

        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn arbitrary_bytes_never_panic(
        bytes in prop::collection::vec(any::<u8>(), 0..512),
        points in prop::collection::vec(any::<usize>(), 0..8),
    ) {
        let whole = decode_whole(&bytes);
        let split: Vec<DecodedRecord> = decode_chunks(split_at_points(&bytes, &points)).collect();

        prop_assert_eq!(split, whole);
    }
}

// ===== Property 2: Malformed Frames Are Isolated =====

proptest! {
    #[test]
    fn malformed_frame_between_progress_keeps_both(
        garbage in "[^\\n\\r}]{0,40}",
        step_a in 0u32..100,
        step_b in 0u32..100,
    ) {
        let body = format!(
            "data: {}\ndata: {{{}\ndata: {}\n",
            json!({"type": "progress", "message": "a", "step": step_a}),
            garbage,
            json!({"type": "progress", "message": "b", "step": step_b}),
        );

        let steps: Vec<u32> = decode_whole(body.as_bytes())
            .into_iter()
            .filter_map(|record| match record {
                DecodedRecord::Event { event: UpdateEvent::Progress { step, .. }, .. } => Some(step),
                _ => None,
            })
            .collect();

        prop_assert_eq!(steps, vec![step_a, step_b]);
    }
}

// ===== Exhaustive splits of the reference stream =====

#[test]
fn literal_stream_every_two_way_split() {
    let bytes = LITERAL_STREAM.as_bytes();
    let expected = decode_whole(bytes);
    assert_eq!(expected.len(), 4);

    for cut in 0..=bytes.len() {
        let actual: Vec<DecodedRecord> = decode_chunks([&bytes[..cut], &bytes[cut..]]).collect();
        assert_eq!(actual, expected, "Split at byte {} changed the records", cut);
    }
}

#[test]
fn literal_stream_every_three_way_split() {
    let bytes = LITERAL_STREAM.as_bytes();
    let expected = decode_whole(bytes);

    // Every 7th first cut keeps the quadratic sweep fast.
    for first in (0..=bytes.len()).step_by(7) {
        for second in first..=bytes.len() {
            let chunks = [&bytes[..first], &bytes[first..second], &bytes[second..]];
            let actual: Vec<DecodedRecord> = decode_chunks(chunks).collect();
            assert_eq!(actual, expected, "Split at {} and {} changed the records", first, second);
        }
    }
}

#[test]
fn complete_without_trailing_newline_is_one_record() {
    let frame = LITERAL_STREAM.lines().last().unwrap();

    let records = decode_whole(frame.as_bytes());

    assert_eq!(records.len(), 1);
    assert!(matches!(
        &records[0],
        DecodedRecord::Event { event: UpdateEvent::Complete(result), .. } if result.invoice_id == "INV-1"
    ));
}
