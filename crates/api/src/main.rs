use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mediavault_core::media::access::DefaultAccessPolicy;
use mediavault_core::media::plugin::PluginRegistry;
use mediavault_db::PgMediaStorage;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mediavault_api::config::ServerConfig;
use mediavault_api::router::build_app_router;
use mediavault_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mediavault_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = mediavault_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    mediavault_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    mediavault_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Media pipeline ---
    let registry = PluginRegistry::with_builtin(&config.media.default_thumbnail);
    tracing::info!(
        plugins = ?registry.ids().collect::<Vec<_>>(),
        "Media type plugins registered"
    );

    let state = AppState {
        storage: Arc::new(PgMediaStorage::new(pool.clone())),
        registry: Arc::new(registry),
        access: Arc::new(DefaultAccessPolicy),
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.shutdown_timeout_secs))
        .await
        .expect("Server error");

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM, then give in-flight requests
/// `drain_secs` before forcing the process down.
async fn shutdown_signal(drain_secs: u64) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!(drain_secs, "Shutdown signal received, draining connections");

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(drain_secs)).await;
        tracing::warn!("Drain timeout elapsed, exiting");
        std::process::exit(1);
    });
}
