//! HTTP surface: routing, the login gate and error shaping.

pub mod error;
pub mod handlers;

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{from_fn, from_fn_with_state, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::accounts::Accounts;
use crate::pipeline::NotesPipeline;

pub use error::{ApiError, ApiResult, NotesOperation};

pub struct AppState {
    pub pipeline: NotesPipeline,
    pub accounts: Arc<Accounts>,
    pub max_upload_bytes: usize,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login));

    let protected_routes = Router::new()
        .route("/logout", post(handlers::logout))
        .route("/generate-notes", post(handlers::generate_notes))
        .route(
            "/generate-notes-from-image",
            post(handlers::generate_notes_from_image),
        )
        .route(
            "/generate-notes-from-video",
            post(handlers::generate_notes_from_video),
        )
        .layer(from_fn_with_state(state.clone(), require_login));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(from_fn(log_requests))
        .with_state(state)
}

/// Resolve `Authorization: Bearer <token>` and stash the session for handlers.
pub async fn require_login(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Login required".to_string()))?;

    let session = state.accounts.authenticate(&token)?;
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} -> {} ({} ms)",
        method,
        uri.path(),
        response.status(),
        start.elapsed().as_millis()
    );
    response
}

pub async fn serve(state: Arc<AppState>, bind_addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}
