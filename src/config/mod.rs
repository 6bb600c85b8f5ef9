// Copyright 2026 The Trickle Project
// SPDX-License-Identifier: Apache-2.0

// Service configuration.
//
// YAML, loaded once at startup and passed by reference into the pieces
// that need it — no ambient globals. Stream pacing, the identity
// endpoint, and the inference endpoint are all fixed here, never
// client-configurable.

mod error;
mod interpolation;
mod loader;
mod raw;
mod source;

pub use error::ConfigError;
pub use loader::{compute_hash, load_config};
pub use source::{ConfigSource, FileSource, StringSource};

/// Top-level parsed and validated config.
#[derive(Debug)]
pub struct Config {
    /// Config version. Always "v1".
    pub version: String,
    /// Environment label (e.g. "development", "production").
    pub environment: String,
    /// Slicing and pacing constants for the event streamer.
    pub stream: StreamConfig,
    /// Identity-verification endpoint settings.
    pub identity: IdentityConfig,
    /// Inference endpoint settings.
    pub engine: EngineConfig,
    /// SHA256 hash of the raw YAML: "sha256:{hex}".
    pub contract_hash: String,
}

/// Slicing and pacing constants.
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    /// Characters per content slice. At least 1.
    pub chunk_chars: usize,
    /// Pacing interval before every frame, in milliseconds.
    pub delay_ms: u64,
}

/// Identity-verification endpoint settings.
#[derive(Debug)]
pub struct IdentityConfig {
    /// URL the oracle client POSTs tokens to.
    pub verify_url: String,
    /// Service credential for the identity endpoint, if it requires one.
    /// Supports `${VAR}` interpolation so the key stays out of the file.
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

/// Inference endpoint settings.
#[derive(Debug)]
pub struct EngineConfig {
    /// URL the engine client POSTs prompts to.
    pub url: String,
    pub timeout_ms: u64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
