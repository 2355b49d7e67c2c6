//! Orchard Commerce API server binary.
//!
//! Serves the REST API plus uploaded product images. Runs pending database
//! migrations at startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::Router;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orchard_api::blob::FsBlobStore;
use orchard_api::config::ApiConfig;
use orchard_api::routes;
use orchard_api::state::AppState;
use orchard_api::store::PgStore;

#[tokio::main]
async fn main() {
    let config = ApiConfig::from_env().expect("Failed to load configuration");

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "orchard_api=info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = PgStore::connect(&config.database_url)
        .await
        .expect("Failed to create database pool");
    store.migrate().await.expect("Failed to run migrations");
    tracing::info!("Database ready");

    let blobs = FsBlobStore::new(config.media_root.clone());
    let media_dir = config.media_root.clone();
    let state = AppState::new(store, blobs);

    let app: Router = routes::app(state)
        .nest_service("/media", ServeDir::new(media_dir))
        .layer(TraceLayer::new_for_http());

    let addr = config.socket_addr();
    tracing::info!("api listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
