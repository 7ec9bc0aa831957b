//! Detached signatures for served artifacts
//!
//! Every endpoint has signed variants: `.sig` returns a binary signature
//! and `.asc` an ASCII-armored one, computed over the exact bytes the
//! unsigned endpoint would have served. A signed route only ever returns a
//! signature; if the wrapped handler fails, its response passes through
//! unchanged, and if signing fails the client gets a 404.

mod armor;
mod ed25519;

pub use armor::{armor, dearmor, ArmoredSigner, ARMOR_BEGIN, ARMOR_END};
pub use ed25519::Ed25519Signer;

use crate::handlers::not_found;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

/// Upper bound on an artifact body that will be buffered for signing
const MAX_SIGNED_BODY: usize = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum SignError {
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("invalid armor: {0}")]
    Armor(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SignError>;

/// Produces a detached signature over artifact bytes
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, content: &[u8]) -> Result<Vec<u8>>;
}

/// How a signature is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureEncoding {
    /// Raw signature bytes at `.sig`
    Binary,
    /// Text armor at `.asc`
    Armored,
}

impl SignatureEncoding {
    /// Suffix appended to the endpoint path
    pub fn suffix(&self) -> &'static str {
        match self {
            SignatureEncoding::Binary => ".sig",
            SignatureEncoding::Armored => ".asc",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            SignatureEncoding::Binary => "application/octet-stream",
            SignatureEncoding::Armored => "text/plain; charset=utf-8",
        }
    }
}

/// Middleware state for one signed route family
#[derive(Clone)]
pub struct SigningState {
    pub signer: Arc<dyn Signer>,
    pub encoding: SignatureEncoding,
}

/// Wrap a handler so it serves a signature of its output instead
pub fn signed<S>(handler: MethodRouter<S>, state: SigningState) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    handler.layer(middleware::from_fn_with_state(state, sign_response))
}

async fn sign_response(
    State(state): State<SigningState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        debug!(path = %path, status = %response.status(), "Not signing unsuccessful response");
        return response;
    }

    let body = match to_bytes(response.into_body(), MAX_SIGNED_BODY).await {
        Ok(body) => body,
        Err(e) => {
            error!(path = %path, error = %e, "Failed to buffer response for signing");
            return not_found();
        }
    };

    match state.signer.sign(&body).await {
        Ok(signature) => (
            [(header::CONTENT_TYPE, state.encoding.content_type())],
            Body::from(signature),
        )
            .into_response(),
        Err(e) => {
            error!(path = %path, error = %e, "Failed to sign response");
            not_found()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct FailingSigner;

    #[async_trait]
    impl Signer for FailingSigner {
        async fn sign(&self, _content: &[u8]) -> Result<Vec<u8>> {
            Err(SignError::Signing("key unavailable".to_string()))
        }
    }

    /// Reverses the content, which is enough to check what was signed
    struct ReverseSigner;

    #[async_trait]
    impl Signer for ReverseSigner {
        async fn sign(&self, content: &[u8]) -> Result<Vec<u8>> {
            Ok(content.iter().rev().copied().collect())
        }
    }

    fn app(signer: Arc<dyn Signer>, encoding: SignatureEncoding) -> Router {
        let state = SigningState { signer, encoding };
        Router::new()
            .route("/ok", signed(get(|| async { "payload" }), state.clone()))
            .route("/missing", signed(get(|| async { not_found() }), state))
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, content_type, body)
    }

    #[tokio::test]
    async fn test_signs_exact_body() {
        let (status, content_type, body) =
            fetch(app(Arc::new(ReverseSigner), SignatureEncoding::Binary), "/ok").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/octet-stream"));
        assert_eq!(body, b"daolyap".to_vec());
    }

    #[tokio::test]
    async fn test_armored_content_type() {
        let (_, content_type, _) =
            fetch(app(Arc::new(ReverseSigner), SignatureEncoding::Armored), "/ok").await;
        assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
    }

    #[tokio::test]
    async fn test_unsuccessful_response_passes_through() {
        let (status, _, body) =
            fetch(app(Arc::new(ReverseSigner), SignatureEncoding::Binary), "/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, b"404 page not found\n".to_vec());
    }

    #[tokio::test]
    async fn test_signer_failure_is_not_found() {
        let (status, _, body) =
            fetch(app(Arc::new(FailingSigner), SignatureEncoding::Binary), "/ok").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, b"404 page not found\n".to_vec());
    }

    #[test]
    fn test_encoding_suffixes() {
        assert_eq!(SignatureEncoding::Binary.suffix(), ".sig");
        assert_eq!(SignatureEncoding::Armored.suffix(), ".asc");
    }
}
