use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitalis_api::config::ServerConfig;
use vitalis_api::router::build_app_router;
use vitalis_api::state::AppState;
use vitalis_limiter::RateLimitGuard;
use vitalis_notify::{
    NotificationChannel, NotificationScheduler, QueueProcessor, WhapiConfig, WhatsAppChannel,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitalis_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = vitalis_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    vitalis_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    vitalis_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Outbound channel ---
    // Delivery degrades gracefully when the provider is not configured:
    // due records are accounted without a send attempt.
    let channel: Option<Arc<dyn NotificationChannel>> = match WhapiConfig::from_env() {
        Some(whapi) => {
            tracing::info!(api_url = %whapi.api_url, "WhatsApp channel configured");
            Some(Arc::new(WhatsAppChannel::new(whapi)))
        }
        None => {
            tracing::warn!("WhatsApp channel not configured, deliveries will be skipped");
            None
        }
    };

    // --- Control-plane services ---
    let guard = Arc::new(RateLimitGuard::new(pool.clone()));
    let scheduler = Arc::new(NotificationScheduler::new(pool.clone()));
    let processor = Arc::new(QueueProcessor::new(
        pool.clone(),
        channel,
        config.delivery_mode,
    ));
    tracing::info!(delivery_mode = %config.delivery_mode, "Control-plane services ready");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        guard,
        scheduler,
        processor,
    };

    // --- Router ---
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
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
