// Copyright 2026 The Trickle Project
// SPDX-License-Identifier: Apache-2.0

// Bearer-token gate for the protected endpoint.
//
// Responsibilities:
// - Decide whether a request may proceed to inference, from the raw
//   `Authorization` header alone
// - Delegate token verification to an injected oracle
// - Convert every failure into a first-class `AuthFailure` value; nothing
//   escapes this boundary as an error the caller has to catch
// - Log verification failures (best-effort, never affects the decision)
//
// The gate never performs the inference call.

use async_trait::async_trait;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Verified identity returned by the oracle. Opaque to the rest of the
/// service: downstream code only cares that verification succeeded.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Stable subject identifier from the identity provider.
    pub subject: String,
    /// Raw decoded claims, passed along untouched.
    pub claims: serde_json::Value,
}

/// Why a request was refused, with the status code the legacy wire
/// contract assigns to each case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureKind {
    /// No `Authorization` header at all. The legacy convention maps this
    /// to 402, not 401.
    MissingCredential,
    /// The oracle examined the token and rejected it.
    InvalidCredential,
    /// The oracle call itself failed; treated as a refusal, not a crash.
    VerificationError,
}

/// A refusal produced by the gate, consumed once by the SSE failure
/// adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    pub kind: AuthFailureKind,
    pub status: u16,
    pub message: String,
}

impl AuthFailure {
    pub fn missing_credential() -> Self {
        Self {
            kind: AuthFailureKind::MissingCredential,
            status: 402,
            message: "402 Payment Required".to_string(),
        }
    }

    pub fn invalid_credential() -> Self {
        Self {
            kind: AuthFailureKind::InvalidCredential,
            status: 403,
            message: "403 Forbidden".to_string(),
        }
    }

    pub fn verification_error() -> Self {
        Self {
            kind: AuthFailureKind::VerificationError,
            status: 401,
            message: "401 Unauthorized".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Trait: TokenVerifier (dependency injection point)
// ---------------------------------------------------------------------------

/// Errors from the verification oracle.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The oracle reached a verdict: the token is not acceptable.
    #[error("token rejected: {0}")]
    Rejected(String),
    /// The oracle could not reach a verdict (transport failure, timeout,
    /// malformed response).
    #[error("verification backend failed: {0}")]
    Backend(String),
}

/// Maps a bearer token to a verified identity.
///
/// Implementations must be Send + Sync so they can be shared across
/// request handlers via `Arc`.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError>;
}

// ---------------------------------------------------------------------------
// The gate
// ---------------------------------------------------------------------------

/// Decides whether a request may proceed, using only the `Authorization`
/// header value and the injected oracle.
#[derive(Clone)]
pub struct AuthGate {
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthGate {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// Gate a request on its raw `Authorization` header value.
    ///
    /// Absent header -> `MissingCredential`. Otherwise the token (with a
    /// leading `"Bearer "` prefix stripped, if present) goes to the
    /// oracle: an explicit rejection becomes `InvalidCredential`, an
    /// oracle breakdown becomes `VerificationError`.
    pub async fn check(&self, authorization: Option<&str>) -> Result<Identity, AuthFailure> {
        let header = match authorization {
            Some(value) => value,
            None => return Err(AuthFailure::missing_credential()),
        };

        let token = header.strip_prefix("Bearer ").unwrap_or(header);

        match self.verifier.verify(token).await {
            Ok(identity) => Ok(identity),
            Err(VerifyError::Rejected(reason)) => {
                tracing::warn!(%reason, "token verification rejected");
                Err(AuthFailure::invalid_credential())
            }
            Err(VerifyError::Backend(reason)) => {
                tracing::warn!(%reason, "token verification backend failure");
                Err(AuthFailure::verification_error())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP-backed oracle client
// ---------------------------------------------------------------------------

/// Verifies tokens against a remote identity endpoint.
///
/// Sends `{"token": "<token>"}` to the configured URL. A 2xx response
/// with a claims document is a verified identity; any other status is a
/// rejection; a transport failure is a backend error.
pub struct HttpTokenVerifier {
    client: reqwest::Client,
    verify_url: String,
    api_key: Option<String>,
    timeout: std::time::Duration,
}

impl HttpTokenVerifier {
    pub fn new(
        client: reqwest::Client,
        verify_url: String,
        api_key: Option<String>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            client,
            verify_url,
            api_key,
            timeout: std::time::Duration::from_millis(timeout_ms),
        }
    }
}

#[async_trait]
impl TokenVerifier for HttpTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        let mut req = self
            .client
            .post(&self.verify_url)
            .timeout(self.timeout)
            .json(&serde_json::json!({ "token": token }));

        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| VerifyError::Backend(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(VerifyError::Rejected(format!(
                "identity endpoint returned {status}"
            )));
        }

        let claims: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| VerifyError::Backend(format!("malformed claims document: {e}")))?;

        let subject = claims
            .get("sub")
            .and_then(|s| s.as_str())
            .map(str::to_string)
            .ok_or_else(|| VerifyError::Rejected("claims document has no subject".into()))?;

        Ok(Identity { subject, claims })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
