use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    routing::get,
    Json, Router,
};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{MessageResponse, MESSAGE_ROUTE},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::load_settings;

const HOME_BANNER: &str = "Hello from the message backend! Navigate to /api/message for a JSON response or /frontend/index.html to see the frontend.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = load_settings()?;
    if !settings.frontend_dir.is_dir() {
        warn!(
            frontend_dir = %settings.frontend_dir.display(),
            "frontend directory does not exist; /frontend requests will return 404"
        );
    }

    let state = AppState {
        message: settings.message,
        frontend_dir: settings.frontend_dir,
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let frontend = ServeDir::new(&state.frontend_dir);
    Router::new()
        .route("/", get(home))
        .route("/healthz", get(healthz))
        .route(MESSAGE_ROUTE, get(message))
        .nest_service("/frontend", frontend)
        .fallback(not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn home() -> &'static str {
    HOME_BANNER
}

async fn healthz() -> &'static str {
    "ok"
}

async fn message(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    Json(MessageResponse::new(state.message.clone()))
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(
            ErrorCode::NotFound,
            format!("no route for {}", uri.path()),
        )),
    )
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
