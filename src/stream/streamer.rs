// Event streamer.
//
// Takes the fully materialized completion text and re-emits it to the
// client as a paced sequence of SSE content frames followed by the
// doubled `[DONE]` terminator. The producer runs on its own task and
// writes into a bounded channel; the receiver half is handed to the
// HTTP response body.
//
// Cancellation is cooperative: transport liveness is checked before each
// pacing sleep and on every send. Once the client is gone, no further
// slices are computed.

use super::framer::{content_frame, error_frame, DONE_FRAME};
use bytes::Bytes;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Pacing and slicing constants, fixed per service instance and never
/// client-configurable. `chunk_chars` must be at least 1 (validated at
/// config load).
#[derive(Debug, Clone, Copy)]
pub struct StreamSettings {
    /// Characters (code points) per content slice.
    pub chunk_chars: usize,
    /// Suspension before every frame, content and terminator alike.
    pub delay: Duration,
}

/// The client went away mid-stream; remaining frames were never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disconnected;

/// Re-emits a finished completion as a timed, ordered SSE frame sequence.
///
/// Each stream is single-consumption: frames are produced just-in-time,
/// transmitted once, and never replayed. There is no reconnect/resume
/// protocol.
#[derive(Debug, Clone, Copy)]
pub struct EventStreamer {
    settings: StreamSettings,
}

impl EventStreamer {
    pub fn new(settings: StreamSettings) -> Self {
        Self { settings }
    }

    /// Spawn the producer task for `text` and return the receiving half
    /// as a byte stream suitable for an HTTP response body.
    pub fn stream(&self, text: String) -> ReceiverStream<Bytes> {
        let streamer = *self;
        let (tx, rx) = mpsc::channel::<Bytes>(16);
        tokio::spawn(async move {
            if streamer.emit(&tx, &text).await.is_err() {
                tracing::debug!("client disconnected mid-stream");
            }
        });
        ReceiverStream::new(rx)
    }

    /// Drive the full emission cadence into `tx`: one delay before every
    /// content slice, one delay before the terminator pair.
    ///
    /// The concatenation of all content payloads equals `text` exactly;
    /// empty text produces zero content frames and goes straight to the
    /// terminator.
    pub(crate) async fn emit(
        &self,
        tx: &mpsc::Sender<Bytes>,
        text: &str,
    ) -> Result<(), Disconnected> {
        let mut start = 0;
        while start < text.len() {
            let end = slice_end(text, start, self.settings.chunk_chars);
            self.pace(tx).await?;
            send(tx, content_frame(&text[start..end])).await?;
            start = end;
        }

        self.pace(tx).await?;
        // The terminator goes out twice; deployed clients expect the
        // doubled tail.
        send(tx, Bytes::from_static(DONE_FRAME.as_bytes())).await?;
        send(tx, Bytes::from_static(DONE_FRAME.as_bytes())).await?;
        Ok(())
    }

    /// Suspend for the configured delay, checking transport liveness on
    /// both sides of the sleep.
    async fn pace(&self, tx: &mpsc::Sender<Bytes>) -> Result<(), Disconnected> {
        if tx.is_closed() {
            return Err(Disconnected);
        }
        tokio::time::sleep(self.settings.delay).await;
        if tx.is_closed() {
            return Err(Disconnected);
        }
        Ok(())
    }
}

/// Translate a failure into the same transport shape as content: exactly
/// one SSE error frame, then end of stream. No delay — failures are
/// reported immediately — and no terminator follows.
pub fn error_event_stream(code: u16, message: &str) -> tokio_stream::Once<Bytes> {
    tokio_stream::once(error_frame(code, message))
}

/// Byte offset where the slice of `chunk_chars` characters starting at
/// `start` ends. Walks char boundaries so multi-byte text never splits
/// inside a code point.
fn slice_end(text: &str, start: usize, chunk_chars: usize) -> usize {
    text[start..]
        .char_indices()
        .nth(chunk_chars)
        .map(|(i, _)| start + i)
        .unwrap_or(text.len())
}

async fn send(tx: &mpsc::Sender<Bytes>, frame: Bytes) -> Result<(), Disconnected> {
    tx.send(frame).await.map_err(|_| Disconnected)
}
