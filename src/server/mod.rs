use crate::config::{Config, ServerConfig};
use crate::images::ImageStore;
use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod routes_images;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<ImageStore>,
    pub config: Arc<Config>,
}

impl AppContext {
    /// Open the storage directory named in `config` and wrap everything up
    /// for the router.
    pub fn new(config: Config) -> Result<Self> {
        let store = ImageStore::open(&config.storage.dir).with_context(|| {
            format!(
                "Failed to open storage directory: {}",
                config.storage.dir.display()
            )
        })?;

        Ok(Self {
            store: Arc::new(store),
            config: Arc::new(config),
        })
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = ctx.config.server.body_limit_bytes;

    Router::new()
        .route("/health", get(health_check))
        .merge(routes_images::image_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> &'static str {
    "ok"
}

/// Bind the listening socket, resolving `host` so names like `localhost`
/// work as well as literal addresses
pub async fn bind_listener(server: &ServerConfig) -> Result<TcpListener> {
    TcpListener::bind((server.host.as_str(), server.port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", server.host, server.port))
}

/// Start the HTTP server and run until a shutdown signal arrives
pub async fn start_server(config: Config) -> Result<()> {
    let listener = bind_listener(&config.server).await?;
    let addr = listener.local_addr()?;

    let ctx = AppContext::new(config)?;
    let app = create_router(ctx);

    tracing::info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
