//! tf-server: the HTTP boundary of trackforged.
//!
//! This crate wires the pipeline crates into an axum application:
//!
//! - upload, stream, listing, player and health routes
//! - request-id middleware and error-to-response mapping
//! - OpenAPI document with Swagger UI
//! - server bootstrap with graceful shutdown

pub mod context;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use tf_av::{FfmpegTranscoder, ToolRegistry, TranscodeSettings};
use tf_core::config::Config;
use tf_core::{Error, Result};
use tf_db::SqliteTrackRepository;
use tf_storage::FsObjectStore;
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;

/// Build the production [`AppContext`] from configuration.
///
/// Opens (or creates) the SQLite database, prepares the object store root,
/// and discovers the encoder. A missing encoder is logged but not fatal:
/// uploads fail with `encoder_unavailable` until it is installed.
pub fn build_context(config: Config) -> Result<AppContext> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let db_path = &config.server.db_path;
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created database directory {}", parent.display());
        }
    }
    let db_str = db_path.to_string_lossy();
    let pool = tf_db::init_pool(&db_str)?;
    tracing::info!("Database ready at {db_str}");

    std::fs::create_dir_all(&config.storage.root)?;
    tracing::info!("Object store rooted at {}", config.storage.root.display());
    let store = Arc::new(FsObjectStore::new(config.storage.root.clone()));

    let tools = Arc::new(ToolRegistry::discover(&config.tools));
    for info in tools.check_all() {
        if info.available {
            tracing::info!(
                "Tool found: {} ({})",
                info.name,
                info.version.as_deref().unwrap_or("unknown version")
            );
        } else {
            tracing::warn!("Tool not found: {}; uploads will fail until it is installed", info.name);
        }
    }

    let transcoder = Arc::new(FfmpegTranscoder::new(
        tools.clone(),
        TranscodeSettings::from(&config.transcode),
    ));

    Ok(AppContext::new(
        config,
        Arc::new(SqliteTrackRepository::new(pool)),
        store,
        transcoder,
        tools,
    ))
}

/// Start the trackforged server.
///
/// Returns when a shutdown signal is received.
pub async fn start(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = build_context(config)?;
    let app = router::build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;
    tracing::info!("Listening on {addr}");

    let cancel = CancellationToken::new();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGINT, SIGTERM, or cancellation of `cancel`.
pub async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => {}
    }

    tracing::info!("Shutdown signal received");
}
