// Copyright 2026 The Trickle Project
// SPDX-License-Identifier: Apache-2.0

use sha2::{Digest, Sha256};

use super::error::ConfigError;
use super::interpolation::resolve_variables;
use super::raw;
use super::source::ConfigSource;
use super::{Config, EngineConfig, IdentityConfig, StreamConfig};

/// Default characters per content slice.
const DEFAULT_CHUNK_CHARS: usize = 5;
/// Default pacing interval in milliseconds.
const DEFAULT_DELAY_MS: u64 = 100;
/// Default identity-endpoint timeout in milliseconds.
const DEFAULT_VERIFY_TIMEOUT_MS: u64 = 2_000;
/// Default inference-endpoint timeout in milliseconds.
const DEFAULT_ENGINE_TIMEOUT_MS: u64 = 30_000;

/// Load and validate a trickle config from the given source.
///
/// Steps:
/// 1. Read raw YAML from source
/// 2. Compute SHA256 contract hash
/// 3. Parse YAML into raw deserialization types
/// 4. Validate version and values
/// 5. Resolve variable interpolation in string fields
/// 6. Build typed Config struct
pub fn load_config(source: &dyn ConfigSource) -> Result<Config, ConfigError> {
    let raw_yaml = source.load()?;
    let contract_hash = compute_hash(&raw_yaml);

    let raw: raw::RawConfig = serde_yaml::from_str(&raw_yaml)?;

    if raw.trickle != "v1" {
        return Err(ConfigError::Validation(format!(
            "unsupported config version \"{}\", expected \"v1\"",
            raw.trickle
        )));
    }

    let stream = build_stream_config(raw.stream)?;
    let identity = build_identity_config(raw.identity)?;
    let engine = build_engine_config(raw.engine)?;

    Ok(Config {
        version: raw.trickle,
        environment: raw.environment.unwrap_or_else(|| "development".to_string()),
        stream,
        identity,
        engine,
        contract_hash,
    })
}

fn build_stream_config(raw: Option<raw::RawStreamConfig>) -> Result<StreamConfig, ConfigError> {
    let (chunk_chars, delay_ms) = match raw {
        Some(s) => (
            s.chunk_chars.unwrap_or(DEFAULT_CHUNK_CHARS),
            s.delay_ms.unwrap_or(DEFAULT_DELAY_MS),
        ),
        None => (DEFAULT_CHUNK_CHARS, DEFAULT_DELAY_MS),
    };

    if chunk_chars == 0 {
        return Err(ConfigError::Validation(
            "stream.chunk_chars must be at least 1".to_string(),
        ));
    }

    Ok(StreamConfig {
        chunk_chars,
        delay_ms,
    })
}

fn build_identity_config(
    raw: Option<raw::RawIdentityConfig>,
) -> Result<IdentityConfig, ConfigError> {
    let raw = raw.ok_or_else(|| {
        ConfigError::Validation("identity section is required".to_string())
    })?;

    let verify_url = resolve_variables(&raw.verify_url)?;
    if verify_url.is_empty() {
        return Err(ConfigError::Validation(
            "identity.verify_url must not be empty".to_string(),
        ));
    }

    let api_key = raw
        .api_key
        .map(|k| resolve_variables(&k))
        .transpose()?;

    Ok(IdentityConfig {
        verify_url,
        api_key,
        timeout_ms: raw.timeout_ms.unwrap_or(DEFAULT_VERIFY_TIMEOUT_MS),
    })
}

fn build_engine_config(raw: Option<raw::RawEngineConfig>) -> Result<EngineConfig, ConfigError> {
    let raw = raw.ok_or_else(|| {
        ConfigError::Validation("engine section is required".to_string())
    })?;

    let url = resolve_variables(&raw.url)?;
    if url.is_empty() {
        return Err(ConfigError::Validation(
            "engine.url must not be empty".to_string(),
        ));
    }

    Ok(EngineConfig {
        url,
        timeout_ms: raw.timeout_ms.unwrap_or(DEFAULT_ENGINE_TIMEOUT_MS),
    })
}

/// SHA256 hash of the raw config YAML: "sha256:{hex}". Logged at startup
/// so a deployment can be tied to the exact config it was started with.
pub fn compute_hash(raw_yaml: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_yaml.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}
