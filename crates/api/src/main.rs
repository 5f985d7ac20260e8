use std::net::SocketAddr;
use std::sync::Arc;

use quickai_api::app::build_app;
use quickai_api::config::ServerConfig;
use quickai_api::engine::audit::{AuditSink, DiscardAuditSink, PgAuditSink};
use quickai_api::engine::dispatcher::Dispatcher;
use quickai_api::state::AppState;
use quickai_completion::{CompletionConfig, CompletionProvider, OpenAiCompatClient};
use quickai_identity::{HostedIdentityStore, IdentityConfig, IdentityStore, InMemoryIdentityStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quickai_api=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        production = config.environment.is_production(),
        detach_side_effects = config.detach_side_effects,
        "Loaded server configuration"
    );

    // --- Identity ---
    let identity: Arc<dyn IdentityStore> = match IdentityConfig::from_env() {
        Some(identity_config) => {
            if !identity_config.verifies_signatures() {
                if config.environment.is_production() {
                    panic!("IDENTITY_JWT_KEY must be set in production");
                }
                tracing::warn!("IDENTITY_JWT_KEY not set, bearer tokens will be rejected");
            }
            let store = HostedIdentityStore::new(&identity_config)
                .expect("Failed to build identity client");
            tracing::info!(api_url = %identity_config.api_url, "Hosted identity store configured");
            Arc::new(store)
        }
        None if config.environment.is_production() => {
            panic!("IDENTITY_SECRET_KEY must be set in production");
        }
        None => {
            tracing::warn!("IDENTITY_SECRET_KEY not set, using in-memory identity store");
            Arc::new(InMemoryIdentityStore::new())
        }
    };

    // --- Completion provider ---
    let provider: Option<Arc<dyn CompletionProvider>> = match CompletionConfig::from_env() {
        Some(completion_config) => {
            let client = OpenAiCompatClient::new(&completion_config)
                .expect("Failed to build completion client");
            tracing::info!(model = %client.model(), "Completion provider configured");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("No completion API key set, text commands return mock output");
            None
        }
    };

    // --- Database ---
    let audit: Arc<dyn AuditSink> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = quickai_db::create_pool(&database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            quickai_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            quickai_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgAuditSink::new(pool))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, creations will not be recorded");
            Arc::new(DiscardAuditSink)
        }
    };

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        identity,
        dispatcher: Arc::new(Dispatcher::new(provider)),
        audit,
    };

    let app = build_app(state);

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
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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
