//! Napoleon film server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use napoleon_api::{AppState, MAX_REQUEST_BODY, auth_middleware, router as api_router};
use napoleon_common::{Config, StorageConfig, build_storage};
use napoleon_core::{SeaOrmStore, SupabaseAuth};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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
                .unwrap_or_else(|_| "napoleon=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting Napoleon server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = Arc::new(napoleon_db::init(&config).await?);
    info!("Connected to database");

    if config.database.migrate {
        info!("Running database migrations...");
        napoleon_db::migrate(&db).await?;
        info!("Migrations completed");
    }

    let http = reqwest::Client::builder()
        .user_agent(format!("napoleon/{}", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(120))
        .build()?;

    let store = Arc::new(SeaOrmStore::new(Arc::clone(&db)));
    let storage = build_storage(&config, http.clone())?;
    let identity = Arc::new(SupabaseAuth::from_config(&config, http)?);
    info!(providers = ?config.auth.providers, "Identity provider ready");

    let state = AppState::new(&config, store, storage, identity);

    // Build router
    let mut app = Router::new().nest("/api", api_router());

    // Locally stored videos are served by this process
    if let StorageConfig::Local {
        base_path,
        base_url,
    } = &config.storage
        && base_url.starts_with('/')
    {
        info!(path = %base_path.display(), url = %base_url, "Serving local video storage");
        app = app.nest_service(base_url, ServeDir::new(base_path));
    }

    let app = app
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY))
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
