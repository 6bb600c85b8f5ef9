// SSE frame construction.
//
// Every event on the wire is one of three shapes:
//
// ```text
// data: {"text":"<slice>"}\n\n     content
// data: {"code":<int>,"error":"<message>"}\n\n   failure
// [DONE]\n\n                        termination (literal, not a data event)
// ```
//
// Both success and failure paths go through `data_frame`, so the response
// body of the protected endpoint never varies in shape by outcome.

use bytes::Bytes;
use serde_json::json;

/// The literal termination sentinel. Not JSON, not a `data:` event — a
/// consumer must recognize this second frame shape on the same stream.
pub const DONE_FRAME: &str = "[DONE]\n\n";

/// Frame a JSON payload as a single SSE data event.
fn data_frame(payload: &serde_json::Value) -> Bytes {
    Bytes::from(format!("data: {payload}\n\n"))
}

/// Frame one content slice of the completion.
pub fn content_frame(slice: &str) -> Bytes {
    data_frame(&json!({ "text": slice }))
}

/// Frame a failure with its status code and message.
pub fn error_frame(code: u16, message: &str) -> Bytes {
    data_frame(&json!({ "code": code, "error": message }))
}
