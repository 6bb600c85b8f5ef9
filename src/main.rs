// Copyright 2026 The Trickle Project
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use trickle::auth::{AuthGate, HttpTokenVerifier};
use trickle::config;
use trickle::engine::HttpInferenceEngine;
use trickle::server;
use trickle::stream::StreamSettings;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "trickle", about = "SSE text-delivery gateway")]
struct Cli {
    /// Path to the trickle.yaml config file
    #[arg(long, default_value = "trickle.yaml", env = "TRICKLE_CONFIG")]
    config: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8600, env = "TRICKLE_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], cli.port));
    tracing::info!(%addr, "trickle starting");

    let source = config::FileSource::new(&cli.config);
    let config = match config::load_config(&source) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("failed to load config: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        version = %config.version,
        environment = %config.environment,
        chunk_chars = config.stream.chunk_chars,
        delay_ms = config.stream.delay_ms,
        contract_hash = %config.contract_hash,
        "config loaded"
    );

    let client = reqwest::Client::new();

    let gate = AuthGate::new(Arc::new(HttpTokenVerifier::new(
        client.clone(),
        config.identity.verify_url.clone(),
        config.identity.api_key.clone(),
        config.identity.timeout_ms,
    )));

    let engine = Arc::new(HttpInferenceEngine::new(
        client,
        config.engine.url.clone(),
        config.engine.timeout_ms,
    ));

    let settings = StreamSettings {
        chunk_chars: config.stream.chunk_chars,
        delay: Duration::from_millis(config.stream.delay_ms),
    };

    let app = server::build_router(gate, engine, settings);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind to address");

    tracing::info!(%addr, "trickle listening");

    axum::serve(listener, app)
        .await
        .expect("server error");
}
