//! HTTP layer.
//!
//! One axum router serves the gallery under a configurable prefix and hands
//! every other path to the reverse proxy:
//!
//! | Path | Handler |
//! |---|---|
//! | `{prefix}` | redirect to `{prefix}/` |
//! | `{prefix}/`, and unrouted paths below it | gallery page |
//! | `{prefix}/thumb/?id=N` | JPEG thumbnail |
//! | `{prefix}/image/?id=N` | original bytes |
//! | `{prefix}/refresh/` | manual rebuild (manual strategy only) |
//! | anything else | [`Proxy`] |
//!
//! Handlers read the index through [`AppState`], which carries the active
//! [`IndexSource`] and the immutable configuration.

pub mod error;
mod gallery;
mod proxy;

pub use error::ServerError;
pub use gallery::{parse_number, query_number, render_page};
pub use proxy::{Proxy, set_forwarded, strip_hop_by_hop};

use axum::Router;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use maud::Markup;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{self, ConfigError, GalleryConfig, RefreshMode, ServerConfig};
use crate::imaging::{RustBackend, ThumbnailConfig};
use crate::refresh::{IndexSource, ManualIndex, RefreshError, WatchedIndex};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Refresh(#[from] RefreshError),
    #[error("Failed to build proxy client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<dyn IndexSource>,
    /// Set when the manual strategy is active; enables `{prefix}/refresh/`.
    pub manual: Option<Arc<ManualIndex>>,
    pub backend: Arc<RustBackend>,
    pub gallery: GalleryConfig,
    pub thumbnails: ThumbnailConfig,
    pub proxy: Option<Arc<Proxy>>,
}

impl AppState {
    /// Build the index for `root` with the configured strategy.
    ///
    /// Scans the whole tree before returning. The watch strategy needs a
    /// running tokio runtime.
    pub fn new(config: &ServerConfig, root: PathBuf) -> Result<Self, StartupError> {
        let (index, manual) = match config.index.refresh {
            RefreshMode::Manual => {
                let manual = Arc::new(ManualIndex::new(root));
                let index: Arc<dyn IndexSource> = manual.clone();
                (index, Some(manual))
            }
            RefreshMode::Watch => {
                let index: Arc<dyn IndexSource> = Arc::new(WatchedIndex::spawn(root)?);
                (index, None)
            }
        };
        let proxy = match config.proxy.upstream_url()? {
            Some(url) => Some(Arc::new(Proxy::new(url)?)),
            None => None,
        };

        Ok(Self {
            index,
            manual,
            backend: Arc::new(RustBackend::new()),
            gallery: config.gallery.clone(),
            thumbnails: config.thumbnail_config(),
            proxy,
        })
    }
}

/// The full application router.
pub fn router(state: AppState) -> Router {
    let prefix = state.gallery.prefix.clone();

    let mut app = Router::new()
        .route(&format!("{prefix}/"), get(page))
        .route(&format!("{prefix}/thumb/"), get(gallery::thumbnail))
        .route(&format!("{prefix}/image/"), get(gallery::original));
    if state.manual.is_some() {
        app = app.route(&format!("{prefix}/refresh/"), get(gallery::refresh));
    }

    app.fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn page(State(state): State<AppState>, uri: Uri) -> Markup {
    gallery::gallery_page(&state, &uri)
}

/// Gallery paths the explicit routes did not match, then the proxy.
async fn fallback(State(state): State<AppState>, req: Request) -> Response {
    let prefix = state.gallery.prefix.as_str();
    let path = req.uri().path();

    if path == prefix {
        return gallery::gallery_redirect(prefix);
    }
    if path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/')) {
        return gallery::gallery_page(&state, req.uri()).into_response();
    }

    let Some(proxy) = state.proxy.clone() else {
        return ServerError::NoUpstream.into_response();
    };
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    match proxy.forward(req, client).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Validate `config`, build the index, and serve until Ctrl-C.
pub async fn run(config: ServerConfig) -> Result<(), StartupError> {
    config.validate()?;
    let root = config::resolve_root(&config.gallery.root)?;
    info!("Serve dir: {}", root.display());

    let state = AppState::new(&config, root)?;
    info!(images = state.index.current_snapshot().len(), "Index built");
    match &state.proxy {
        Some(proxy) => info!("Reverse proxy addr: {}", proxy.upstream()),
        None => info!("Reverse proxy disabled"),
    }

    let listener = TcpListener::bind(config.server.address()).await?;
    info!(
        "Listen on http://{}{}/",
        listener.local_addr()?,
        config.gallery.prefix
    );

    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
}
