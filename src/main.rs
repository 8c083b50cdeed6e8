//! AssetHub Server
//!
//! Serves the web client, relays image analysis requests to the vision
//! service, and keeps the hosted and local libraries in sync.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use assethub_core::config::{AppConfig, LogFormat, StoreProvider};
use assethub_core::error::AppError;
use assethub_database::{DatabasePool, PgStore};
use assethub_service::{Libraries, memory_store};
use assethub_store::HostedStore;
use assethub_vision::{ImageAnalyzer, VisionClient};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let env = std::env::var("ASSETHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting AssetHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Static web root ──────────────────────────────────
    if !std::path::Path::new(&config.server.static_root).is_dir() {
        tracing::warn!(
            root = %config.server.static_root,
            "Static root does not exist; every page will 404"
        );
    }

    // ── Step 2: Hosted store ─────────────────────────────────────
    let shutdown = CancellationToken::new();
    let (store, database, listener) = match config.store.provider {
        StoreProvider::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            assethub_database::migration::run_migrations(pool.pool()).await?;
            let pg = PgStore::new(
                pool.pool().clone(),
                config.store.folder_delete,
                config.sync.channel_buffer_size,
            );
            let listener = pg.start_listener(shutdown.clone()).await?;
            let store: Arc<dyn HostedStore> = Arc::new(pg);
            (store, Some(pool), Some(listener))
        }
        StoreProvider::Memory => {
            tracing::info!("Hosted store is in-process; no schema to prepare");
            let store: Arc<dyn HostedStore> = memory_store(&config);
            (store, None, None)
        }
    };

    // ── Step 3: Libraries ────────────────────────────────────────
    let mut libraries = Libraries::start(&config, store, shutdown.clone()).await?;
    if let Some(listener) = listener {
        libraries.track(listener);
    }

    // ── Step 4: Vision relay ─────────────────────────────────────
    let analyzer: Option<Arc<dyn ImageAnalyzer>> = match config.vision.api_key() {
        Some(_) => {
            let client = VisionClient::new(&config.vision)?;
            tracing::info!(model = %client.model(), "Vision relay enabled");
            Some(Arc::new(client) as Arc<dyn ImageAnalyzer>)
        }
        None => {
            tracing::warn!("Vision relay disabled (add OPENAI_API_KEY to .env)");
            None
        }
    };

    // ── Step 5: Bind ─────────────────────────────────────────────
    let addr = config.server.bind_address();
    let port = config.server.port;
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            eprintln!("Port {port} is already in use!");
            eprintln!("   Try a different port: PORT=3000 assethub-server");
            std::process::exit(1);
        }
        Err(e) => {
            return Err(AppError::internal(format!("Failed to bind {addr}: {e}")));
        }
    };

    tracing::info!(
        root = %config.server.static_root,
        "AssetHub server listening on {addr} (http://localhost:{port})"
    );

    // ── Step 6: Serve until shutdown ─────────────────────────────
    let app = assethub_api::build_router(assethub_api::AppState::new(config, analyzer));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    libraries.shutdown().await;
    if let Some(pool) = database {
        pool.close().await;
    }

    tracing::info!("AssetHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM), then stop background tasks
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    shutdown.cancel();
}
