//! Netboot config server
//!
//! Serves boot scripts and provisioning configs to machines booting over
//! the network. Machines are matched to Groups by their labels; a Group's
//! Profile decides what they boot and which templates they receive.
//!
//! # Endpoints
//!
//! | Path | Serves |
//! |------|--------|
//! | `/boot.ipxe`, `/boot.ipxe.0` | iPXE inspect script |
//! | `/ipxe` | iPXE boot script |
//! | `/grub` | GRUB config |
//! | `/pixiecore/v1/boot/{mac}` | Pixiecore API boot document |
//! | `/ignition` | Ignition config |
//! | `/cloud` | cloud-config |
//! | `/metadata` | `KEY=value` metadata |
//! | `/assets/...` | static files, when configured |
//!
//! With a signer configured, every endpoint also has a `.sig` variant
//! (e.g. `/ipxe.sig`, `/pixiecore/v1/boot.sig/{mac}`); with an armored
//! signer, an `.asc` variant.

pub mod handlers;
pub mod labels;
pub mod render;
pub mod resolve;
pub mod sign;
pub mod store;

#[cfg(test)]
pub mod test_helpers;

use anyhow::Context;
use axum::extract::MatchedPath;
use axum::Router;
use handlers::Endpoint;
use render::TemplateRenderer;
use resolve::Resolver;
use sign::{SignatureEncoding, Signer, SigningState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use store::Store;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{error, info, Level};

/// Server configuration
#[derive(Clone)]
pub struct Config {
    /// Source of Groups, Profiles and templates
    pub store: Arc<dyn Store>,

    /// Directory served at `/assets`
    pub assets_path: Option<PathBuf>,

    /// Signer for `.sig` endpoints
    pub signer: Option<Arc<dyn Signer>>,

    /// Signer for `.asc` endpoints
    pub armored_signer: Option<Arc<dyn Signer>>,
}

impl Config {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            assets_path: None,
            signer: None,
            armored_signer: None,
        }
    }

    pub fn with_assets(mut self, path: impl Into<PathBuf>) -> Self {
        self.assets_path = Some(path.into());
        self
    }

    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_armored_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.armored_signer = Some(signer);
        self
    }
}

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver,
    pub renderer: Arc<TemplateRenderer>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            resolver: Resolver::new(store.clone()),
            renderer: Arc::new(TemplateRenderer::new(store)),
        }
    }
}

/// The config server
pub struct Server {
    state: AppState,
    assets_path: Option<PathBuf>,
    signers: Vec<SigningState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        let mut signers = Vec::new();
        if let Some(signer) = config.signer {
            signers.push(SigningState {
                signer,
                encoding: SignatureEncoding::Binary,
            });
        }
        if let Some(signer) = config.armored_signer {
            signers.push(SigningState {
                signer,
                encoding: SignatureEncoding::Armored,
            });
        }

        Self {
            state: AppState::new(config.store),
            assets_path: config.assets_path,
            signers,
        }
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        let mut router = Router::new();

        for endpoint in Endpoint::ALL {
            router = router.route(&endpoint.path(""), endpoint.handler());
        }

        for signing in &self.signers {
            for endpoint in Endpoint::ALL {
                router = router.route(
                    &endpoint.path(signing.encoding.suffix()),
                    sign::signed(endpoint.handler(), signing.clone()),
                );
            }
        }

        if let Some(path) = &self.assets_path {
            router = router.nest_service("/assets", ServeDir::new(path));
        }

        router
            .fallback(handlers::fallback)
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                        let matched_path = request
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str)
                            .unwrap_or(request.uri().path());

                        tracing::debug_span!(
                            "http-request",
                            method = %request.method(),
                            uri = %request.uri(),
                            matched_path = matched_path,
                        )
                    })
                    .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Micros),
                    ),
            )
            .with_state(self.state.clone())
    }
}

/// Serve until Ctrl-C or SIGTERM
pub async fn run(config: Config, address: SocketAddr) -> anyhow::Result<()> {
    let signed = config.signer.is_some() || config.armored_signer.is_some();
    let app = Server::new(config).router();

    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!(
        address = %listener.local_addr().context("Failed to get local address")?,
        signed,
        "Netboot config server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
        info!("Received Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received SIGTERM");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
