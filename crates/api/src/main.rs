//! `formkit-api` binary: serves the owner and visitor form endpoints.
//!
//! Reads `.env` if present, then [`ServerConfig`] plus `DATABASE_URL` and
//! `LOG_FORMAT` (`json` for structured output, anything else for text).

use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use formkit_api::config::ServerConfig;
use formkit_api::router::build_app_router;
use formkit_api::state::AppState;
use formkit_db::DbPool;

const DEFAULT_LOG_FILTER: &str = "formkit_api=debug,formkit_db=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let drain_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    tracing::info!(
        %addr,
        app_url = %config.app_url,
        asset_root = %config.asset_root,
        "Configuration loaded"
    );

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = prepare_database(&database_url).await;

    let app = build_app_router(AppState::new(pool.clone(), config));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Listener closed, draining database pool");
    if tokio::time::timeout(drain_timeout, pool.close()).await.is_err() {
        tracing::warn!(?drain_timeout, "Database pool did not drain in time");
    }
    tracing::info!("Shutdown complete");
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Connect, verify and migrate. Any failure aborts startup.
async fn prepare_database(url: &str) -> DbPool {
    let pool = formkit_db::create_pool(url)
        .await
        .expect("Failed to connect to database");
    formkit_db::health_check(&pool)
        .await
        .expect("Database is not answering queries");
    formkit_db::run_migrations(&pool)
        .await
        .expect("Failed to apply migrations");
    tracing::info!("Database ready");
    pool
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl-C");
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to listen for SIGTERM");
        sigterm.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    };
    tracing::info!(signal, "Shutting down");
}
