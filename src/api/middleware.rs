//! API middleware
//!
//! Contains middleware for:
//! - Security headers (helmet-style hardening, applied before everything else)
//! - Cookie-keyed server-side sessions
//!
//! Plus the shared `AppState` and the JSON error type every handler returns.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::db::repositories::{
    ArticleRepository, CategoryRepository, SessionRepository, TagRepository, UserRepository,
};
use crate::services::{ArticleService, UserService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub article_repo: Arc<dyn ArticleRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub tag_repo: Arc<dyn TagRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub session_repo: Arc<dyn SessionRepository>,
    pub article_service: Arc<ArticleService>,
    pub user_service: Arc<UserService>,
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Request failed: {:#}", err);
        Self::internal_error(err.to_string())
    }
}

impl From<crate::services::ArticleServiceError> for ApiError {
    fn from(err: crate::services::ArticleServiceError) -> Self {
        tracing::error!("Article operation failed: {:#}", err);
        Self::internal_error(err.to_string())
    }
}

impl From<crate::services::UserServiceError> for ApiError {
    fn from(err: crate::services::UserServiceError) -> Self {
        tracing::error!("User operation failed: {:#}", err);
        Self::internal_error(err.to_string())
    }
}

/// Security headers applied to every response, first in the pipeline so
/// downstream handlers may override them.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        HeaderValue::from_static("SAMEORIGIN"),
    );
    headers.insert(
        header::X_XSS_PROTECTION,
        HeaderValue::from_static("0"),
    );
    headers.insert(
        header::HeaderName::from_static("x-download-options"),
        HeaderValue::from_static("noopen"),
    );
    headers.insert(
        header::HeaderName::from_static("x-dns-prefetch-control"),
        HeaderValue::from_static("off"),
    );
    response
}

/// Session handle placed in request extensions by the session middleware
#[derive(Debug, Clone)]
pub struct SessionHandle {
    /// Session row id (cookie value)
    pub id: String,
}

/// Extract the session cookie value from the request
fn extract_session_cookie(request: &Request, cookie_name: &str) -> Option<String> {
    let cookie_header = request.headers().get(header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;
    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie.strip_prefix(cookie_name) {
            if let Some(value) = value.strip_prefix('=') {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Session middleware.
///
/// Looks up the session row named by the cookie; a missing or unknown
/// cookie gets a fresh row. The session id is exposed to handlers through
/// request extensions and (re)issued via `Set-Cookie`.
pub async fn session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let cookie_name = &state.config.session.cookie_name;

    let existing = match extract_session_cookie(&request, cookie_name) {
        Some(id) => state.session_repo.get_by_id(&id).await?,
        None => None,
    };

    let session_id = match existing {
        Some(session) => session.id,
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            let expires_at = Utc::now() + Duration::seconds(state.config.session.ttl_seconds);
            state.session_repo.create(&id, expires_at).await?;
            id
        }
    };

    request
        .extensions_mut()
        .insert(SessionHandle {
            id: session_id.clone(),
        });

    let mut response = next.run(request).await;

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        cookie_name, session_id, state.config.session.ttl_seconds
    );
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }

    Ok(response)
}
