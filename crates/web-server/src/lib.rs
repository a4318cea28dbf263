use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use configuration::Settings;
use database::{AdvertRepository, DbRepository, SessionProvider};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod extract;
pub mod handlers;

/// Advert payloads are a few hundred bytes at most.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// The shared application state that all handlers can access.
///
/// Built once at startup and handed to the router; each request borrows the
/// repository, which opens its own session per operation.
#[derive(Clone)]
pub struct AppState {
    pub db_repo: Arc<dyn AdvertRepository>,
}

impl AppState {
    pub fn new(db_repo: Arc<dyn AdvertRepository>) -> Self {
        Self { db_repo }
    }
}

/// Defines the application routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/adverts/", post(handlers::create_advert))
        .route(
            "/adverts/:advert_id",
            get(handlers::get_advert)
                .patch(handlers::update_advert)
                .delete(handlers::delete_advert),
        )
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(cors)
        // Logs every incoming request and its outcome.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// Connects to the database, ensures the schema, and serves until a shutdown
/// signal arrives.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let addr = settings.server.socket_addr()?;
    let sessions = SessionProvider::init(&settings.database).await?;
    let db_repo: Arc<dyn AdvertRepository> = Arc::new(DbRepository::new(sessions));
    serve(addr, db_repo).await
}

/// Serves the API on `addr` with the given repository.
///
/// On shutdown, in-flight requests are drained before the repository is closed.
pub async fn serve(addr: SocketAddr, db_repo: Arc<dyn AdvertRepository>) -> anyhow::Result<()> {
    let app = build_router(AppState::new(db_repo.clone()));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_repo.close().await;
    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C.");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM.");
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
    tracing::info!("Shutdown signal received.");
}
