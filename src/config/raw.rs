// Raw YAML deserialization types (internal)
// These are separate from the public Config structs because:
// 1. We do variable interpolation and validation between raw and public
// 2. Defaults and required-field decisions live in the loader, not serde
// 3. Keeps the public API clean

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub trickle: String,
    pub stream: Option<RawStreamConfig>,
    pub identity: Option<RawIdentityConfig>,
    pub engine: Option<RawEngineConfig>,
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawStreamConfig {
    pub chunk_chars: Option<usize>,
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RawIdentityConfig {
    pub verify_url: String,
    pub api_key: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RawEngineConfig {
    pub url: String,
    pub timeout_ms: Option<u64>,
}
