// Copyright 2026 The Trickle Project
// SPDX-License-Identifier: Apache-2.0

// HTTP boundary.
//
// Responsibilities:
// - GET /echo: unauthenticated convenience endpoint, streams any text
// - POST /echo: bearer-gated endpoint, streams the inference result
// - Heartbeat endpoint
// - Both /echo outcomes ship as `text/event-stream`: the gate's refusal
//   becomes a single SSE error frame, never a raw HTTP error status
//
// Inference runs inside the producer task, after the response has
// committed to the streaming content type; an engine failure therefore
// also surfaces as an SSE error frame.

use crate::auth::AuthGate;
use crate::engine::InferenceEngine;
use crate::stream::{error_event_stream, error_frame, EventStreamer, StreamSettings};
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// Shared state injected into axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: AuthGate,
    pub engine: Arc<dyn InferenceEngine>,
    pub streamer: EventStreamer,
}

// ---------------------------------------------------------------------------
// Request parameters
// ---------------------------------------------------------------------------

/// Query parameters of the unauthenticated endpoint.
#[derive(Debug, Deserialize)]
pub struct EchoParams {
    pub text: String,
}

/// Query parameters of the protected endpoint. `conv_id` and
/// `message_id` are accepted for forward compatibility and logged, but
/// the delivery core does not use them.
#[derive(Debug, Deserialize)]
pub struct PromptParams {
    pub prompt: String,
    pub conv_id: String,
    pub message_id: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Heartbeat endpoint: GET /v1/heartbeat -> 200 OK
pub async fn heartbeat() -> StatusCode {
    StatusCode::OK
}

/// Unauthenticated streaming endpoint.
///
/// Performs no credential check: any submitted text goes through
/// inference and streams back. This is a deliberately open demo surface;
/// see DESIGN.md before exposing it outside a trusted network.
pub async fn echo_get(
    State(state): State<AppState>,
    Query(params): Query<EchoParams>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    tracing::info!(
        %request_id,
        prompt_chars = params.text.chars().count(),
        "stream request (open endpoint)"
    );
    stream_completion(&state, request_id, params.text)
}

/// Bearer-gated streaming endpoint.
///
/// The gate decides first; a refusal is delivered as a single SSE error
/// frame on a 200 `text/event-stream` response, so clients parse exactly
/// one transport shape regardless of outcome.
pub async fn echo_post(
    State(state): State<AppState>,
    Query(params): Query<PromptParams>,
    headers: HeaderMap,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match state.gate.check(authorization).await {
        Ok(identity) => {
            tracing::info!(
                %request_id,
                subject = %identity.subject,
                conv_id = %params.conv_id,
                message_id = %params.message_id,
                prompt_chars = params.prompt.chars().count(),
                "stream request authenticated"
            );
            stream_completion(&state, request_id, params.prompt)
        }
        Err(failure) => {
            tracing::info!(
                %request_id,
                status = failure.status,
                "stream request refused"
            );
            sse_response(error_event_stream(failure.status, &failure.message))
        }
    }
}

// ---------------------------------------------------------------------------
// Stream assembly
// ---------------------------------------------------------------------------

/// Spawn the producer for one request: inference, then the paced frame
/// cadence. The receiving half becomes the response body.
fn stream_completion(state: &AppState, request_id: String, prompt: String) -> Response {
    let engine = state.engine.clone();
    let streamer = state.streamer;
    let (tx, rx) = mpsc::channel::<Bytes>(16);

    tokio::spawn(async move {
        // The client may already be gone before inference starts.
        if tx.is_closed() {
            return;
        }

        let text = match engine.infer(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(%request_id, error = %e, "inference failed");
                let _ = tx.send(error_frame(502, "502 Bad Gateway")).await;
                return;
            }
        };

        tracing::debug!(
            %request_id,
            completion_chars = text.chars().count(),
            "streaming completion"
        );

        if streamer.emit(&tx, &text).await.is_err() {
            tracing::debug!(%request_id, "client disconnected mid-stream");
        }
    });

    sse_response(ReceiverStream::new(rx))
}

/// Wrap a byte stream as a `text/event-stream` response.
fn sse_response(stream: impl Stream<Item = Bytes> + Send + 'static) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .body(Body::from_stream(
            stream.map(Ok::<_, std::convert::Infallible>),
        ))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Router construction
// ---------------------------------------------------------------------------

/// Build the axum router. All collaborators are injected — no side
/// effects, no hard-coded clients.
pub fn build_router(
    gate: AuthGate,
    engine: Arc<dyn InferenceEngine>,
    settings: StreamSettings,
) -> Router {
    let state = AppState {
        gate,
        engine,
        streamer: EventStreamer::new(settings),
    };

    Router::new()
        .route("/echo", get(echo_get).post(echo_post))
        .route("/v1/heartbeat", get(heartbeat))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
