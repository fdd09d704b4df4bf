//! Museum catalog server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use museum_api::{AppState, router as api_router};
use museum_common::{Config, LocalStorage, StorageService};
use museum_core::{QrComposer, QrRenderer};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "museum=debug,museum_core=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting museum catalog server...");

    // Load configuration
    let config = Config::load()?;

    // The caption font must be usable before anything else starts
    let qr: Arc<dyn QrRenderer> = Arc::new(QrComposer::from_config(&config.qr)?);
    info!(font = %config.qr.font_path.display(), "QR composer ready");

    // Connect to database
    let db = museum_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    museum_db::migrate(&db).await?;
    info!("Migrations completed");

    let storage: StorageService = Arc::new(LocalStorage::new(
        config.storage.base_path.clone(),
        config.storage.base_url.clone(),
    ));

    let state = AppState::new(Arc::new(db), storage, qr, &config);

    let mut app = Router::new().merge(api_router());

    // Serve stored media when it is mounted on this host
    let media_prefix = config.storage.base_url.trim_end_matches('/');
    if media_prefix.starts_with('/') && media_prefix.len() > 1 {
        app = app.nest_service(media_prefix, ServeDir::new(&config.storage.base_path));
        info!(prefix = %media_prefix, path = %config.storage.base_path.display(), "Serving media");
    } else {
        warn!(base_url = %config.storage.base_url, "Media is not served by this process");
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
