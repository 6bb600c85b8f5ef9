// Copyright 2026 The Trickle Project
// SPDX-License-Identifier: Apache-2.0

// Tests for the paced SSE delivery core.
//
// Cover:
//  1. Partition: concatenated content payloads reproduce the source text
//  2. Content frame count is ceil(chars / chunk_chars), zero for empty text
//  3. The worked example: "hello world" at 5 chars -> "hello", " worl", "d"
//  4. Multi-byte text slices by character, never inside a code point
//  5. Every frame on the wire is one of the three recognized shapes
//  6. Successful streams end with the doubled [DONE] tail, exactly
//  7. Pacing: a stream of K events takes at least K x delay
//  8. Failure adapter emits one error frame, immediately, with no terminator
//  9. Client disconnect mid-stream stops production cooperatively

use super::framer::DONE_FRAME;
use super::streamer::{error_event_stream, Disconnected, EventStreamer, StreamSettings};
use bytes::Bytes;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn streamer(chunk_chars: usize, delay_ms: u64) -> EventStreamer {
    EventStreamer::new(StreamSettings {
        chunk_chars,
        delay: Duration::from_millis(delay_ms),
    })
}

/// Collect a full stream into one string.
async fn collect_output(stream: impl tokio_stream::Stream<Item = Bytes>) -> String {
    let mut output = String::new();
    tokio::pin!(stream);
    while let Some(chunk) = stream.next().await {
        output.push_str(&String::from_utf8_lossy(&chunk));
    }
    output
}

/// Split collected output into frames and extract the `text` payloads of
/// the content frames, asserting every frame is a recognized shape.
fn content_payloads(output: &str) -> Vec<String> {
    let mut payloads = Vec::new();
    for frame in output.split_inclusive("\n\n") {
        if frame == DONE_FRAME {
            continue;
        }
        let data = frame
            .strip_prefix("data: ")
            .unwrap_or_else(|| panic!("unrecognized frame shape: {frame:?}"))
            .trim_end();
        let json: serde_json::Value = serde_json::from_str(data).expect("frame payload is JSON");
        if let Some(text) = json.get("text").and_then(|t| t.as_str()) {
            payloads.push(text.to_string());
        } else {
            assert!(
                json.get("code").is_some() && json.get("error").is_some(),
                "data frame is neither content nor error: {json}"
            );
        }
    }
    payloads
}

// ---------------------------------------------------------------------------
// Partition
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn concatenated_payloads_reproduce_source_text() {
    let text = "The quick brown fox jumps over the lazy dog";
    let output = collect_output(streamer(7, 10).stream(text.to_string())).await;

    let payloads = content_payloads(&output);
    assert_eq!(payloads.concat(), text);
    assert_eq!(payloads.len(), text.chars().count().div_ceil(7));
}

#[tokio::test(start_paused = true)]
async fn hello_world_at_five_chars_yields_three_slices() {
    let output = collect_output(streamer(5, 10).stream("hello world".to_string())).await;

    assert_eq!(content_payloads(&output), vec!["hello", " worl", "d"]);
}

#[tokio::test(start_paused = true)]
async fn text_length_divisible_by_chunk_size_has_no_short_tail() {
    let output = collect_output(streamer(5, 10).stream("aaaaabbbbb".to_string())).await;

    assert_eq!(content_payloads(&output), vec!["aaaaa", "bbbbb"]);
}

#[tokio::test(start_paused = true)]
async fn empty_text_produces_no_content_frames() {
    let output = collect_output(streamer(5, 10).stream(String::new())).await;

    assert!(content_payloads(&output).is_empty());
    assert_eq!(output, format!("{DONE_FRAME}{DONE_FRAME}"));
}

#[tokio::test(start_paused = true)]
async fn multibyte_text_slices_by_character() {
    // 7 characters, several of them multi-byte: slicing by bytes would
    // panic or split a code point.
    let text = "héllø wörld".chars().take(7).collect::<String>();
    let output = collect_output(streamer(3, 10).stream(text.clone())).await;

    let payloads = content_payloads(&output);
    assert_eq!(payloads.len(), 3);
    assert!(payloads.iter().take(2).all(|p| p.chars().count() == 3));
    assert_eq!(payloads[2].chars().count(), 1);
    assert_eq!(payloads.concat(), text);
}

// ---------------------------------------------------------------------------
// Termination
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn successful_stream_ends_with_doubled_done_tail() {
    let output = collect_output(streamer(5, 10).stream("hello world".to_string())).await;

    assert!(
        output.ends_with("[DONE]\n\n[DONE]\n\n"),
        "stream must end with the doubled terminator, got tail: {:?}",
        &output[output.len().saturating_sub(20)..]
    );
    assert_eq!(output.matches(DONE_FRAME).count(), 2);
}

// ---------------------------------------------------------------------------
// Pacing
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn each_event_is_preceded_by_the_configured_delay() {
    let delay = Duration::from_millis(100);
    let start = tokio::time::Instant::now();

    // 3 content events + 1 terminator pair = 4 paced transmissions.
    let output = collect_output(streamer(5, 100).stream("hello world".to_string())).await;

    assert_eq!(content_payloads(&output).len(), 3);
    assert!(
        start.elapsed() >= 4 * delay,
        "stream completed in {:?}, expected at least {:?}",
        start.elapsed(),
        4 * delay
    );
}

// ---------------------------------------------------------------------------
// Failure adapter
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn error_stream_is_one_frame_with_no_terminator() {
    let start = tokio::time::Instant::now();
    let output = collect_output(error_event_stream(402, "402 Payment Required")).await;

    // Reported immediately: no pacing delay on the failure path.
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert!(!output.contains(DONE_FRAME));

    let json: serde_json::Value =
        serde_json::from_str(output.strip_prefix("data: ").unwrap().trim_end()).unwrap();
    assert_eq!(json["code"], 402);
    assert_eq!(json["error"], "402 Payment Required");
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn disconnect_after_second_event_stops_production() {
    let (tx, mut rx) = mpsc::channel::<Bytes>(1);
    let emitter = streamer(5, 10);

    let producer = tokio::spawn(async move {
        emitter.emit(&tx, "a long completion that would yield many slices").await
    });

    // Consume two content frames, then hang up.
    let first = rx.recv().await.expect("first frame");
    let second = rx.recv().await.expect("second frame");
    assert!(first.starts_with(b"data: "));
    assert!(second.starts_with(b"data: "));
    drop(rx);

    // The producer observes the closed transport at its next suspension
    // point and stops instead of computing the remaining slices.
    assert_eq!(producer.await.unwrap(), Err(Disconnected));
}
