use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::error::{ApiError, ApiResult, NotesOperation};
use super::AppState;
use crate::accounts::{Accounts, LoginForm, LoginSession, SignupForm};
use crate::ai::Style;
use crate::error::AccountError;
use crate::pipeline::NotesResult;

#[derive(Debug, Deserialize)]
pub struct TextNotesRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub style: Option<Style>,
}

#[derive(Debug, Deserialize)]
pub struct VideoNotesRequest {
    #[serde(default, rename = "videoUrl")]
    pub video_url: Option<String>,
    #[serde(default)]
    pub style: Option<Style>,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(v)| v)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))
}

fn invalid_upload(err: MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Invalid upload: {}", err.body_text()))
}

/// Password hashing and SQLite access block, so they run off the async workers.
async fn with_accounts<T, F>(accounts: &Arc<Accounts>, f: F) -> ApiResult<T>
where
    F: FnOnce(&Accounts) -> Result<T, AccountError> + Send + 'static,
    T: Send + 'static,
{
    let accounts = Arc::clone(accounts);
    tokio::task::spawn_blocking(move || f(&accounts))
        .await
        .map_err(|e| ApiError::Internal(format!("Account task failed: {}", e)))?
        .map_err(ApiError::from)
}

pub async fn generate_notes(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TextNotesRequest>, JsonRejection>,
) -> ApiResult<Json<NotesResult>> {
    let request = json_body(body)?;
    let text = request
        .text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No text provided".to_string()))?;

    let result = state
        .pipeline
        .generate_from_text(text, request.style.unwrap_or_default())
        .await
        .map_err(|e| ApiError::Notes(NotesOperation::Text, e))?;
    Ok(Json(result))
}

pub async fn generate_notes_from_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<NotesResult>> {
    let mut multipart = multipart
        .map_err(|e| ApiError::BadRequest(format!("No image file provided: {}", e.body_text())))?;
    let mut image: Option<Bytes> = None;
    let mut style = Style::default();

    while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") => {
                image = Some(field.bytes().await.map_err(invalid_upload)?);
            }
            Some("style") => {
                style = Style::parse(&field.text().await.map_err(invalid_upload)?);
            }
            _ => {}
        }
    }

    let image = image
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No image file provided".to_string()))?;

    let result = state
        .pipeline
        .generate_from_image(image, style)
        .await
        .map_err(|e| ApiError::Notes(NotesOperation::Image, e))?;
    Ok(Json(result))
}

pub async fn generate_notes_from_video(
    State(state): State<Arc<AppState>>,
    body: Result<Json<VideoNotesRequest>, JsonRejection>,
) -> ApiResult<Json<NotesResult>> {
    let request = json_body(body)?;
    let url = request
        .video_url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("No video URL provided".to_string()))?;

    let result = state
        .pipeline
        .generate_from_video(url, request.style.unwrap_or_default())
        .await
        .map_err(|e| ApiError::Notes(NotesOperation::Video, e))?;
    Ok(Json(result))
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SignupForm>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let form = json_body(body)?;
    let user = with_accounts(&state.accounts, move |accounts| accounts.signup(&form)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginForm>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let form = json_body(body)?;
    let session = with_accounts(&state.accounts, move |accounts| accounts.login(&form)).await?;
    Ok(Json(json!({
        "token": session.token,
        "expires_at": session.expires_at.to_rfc3339(),
        "username": session.username,
    })))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<LoginSession>,
) -> StatusCode {
    state.accounts.logout(&session.token);
    log::info!("'{}' logged out", session.username);
    StatusCode::NO_CONTENT
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let generator = state.pipeline.generator();
    Json(json!({
        "status": "ok",
        "provider": generator.provider(),
        "model": generator.model(),
        "active_sessions": state.accounts.active_sessions(),
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
