//! Router assembly and server startup.

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde::Serialize;
use todo_core::config::Settings;
use todo_core::storage::TaskStore;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::tasks;

/// Shared application state.
pub struct AppState {
    pub store: TaskStore,
}

impl AppState {
    pub fn new(store: TaskStore) -> Self {
        Self { store }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .nest("/api/tasks", tasks::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to the configured address and serve until Ctrl+C or SIGTERM.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let addr = settings.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    serve_with_listener(listener, settings, shutdown_signal()).await
}

pub async fn serve_with_listener<S>(
    listener: TcpListener,
    settings: Settings,
    shutdown: S,
) -> anyhow::Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let state = Arc::new(AppState::new(TaskStore::new(settings.store_path.clone())));
    let app = router(state);

    tracing::info!(
        "Server listening on {} (store: {})",
        listener.local_addr()?,
        settings.store_path.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!("failed to install SIGTERM handler: {}", err);
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

    tracing::info!("Shutdown signal received");
}
