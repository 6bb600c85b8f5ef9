// Copyright 2026 The Trickle Project
// SPDX-License-Identifier: Apache-2.0

// Paced SSE delivery of a finished completion.
//
// Responsibilities:
// - Frame text slices and failures as SSE events (one parser on the client
//   side for both outcomes)
// - Partition the completion into fixed-size character slices
// - Pace emission: one delay before every frame, so consumers observe
//   incremental delivery rather than a burst
// - Terminate with the literal `[DONE]` sentinel, transmitted twice
//   (legacy wire behavior, kept for existing clients)
// - Stop cooperatively when the client disconnects mid-stream

mod framer;
mod streamer;

pub use framer::{content_frame, error_frame, DONE_FRAME};
pub use streamer::{error_event_stream, Disconnected, EventStreamer, StreamSettings};

#[cfg(test)]
mod tests;
