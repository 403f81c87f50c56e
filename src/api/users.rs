//! User login and register routes
//!
//! The two non-generic user routes. Login matches the query-string filter
//! against stored users (password included, compared verbatim) and writes
//! the user id into the session on success. Register performs the
//! application-layer uniqueness checks.

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, SessionHandle};
use crate::db::repositories::Filter;
use crate::models::{CreateUserInput, User};
use crate::services::RegisterOutcome;

/// Login response. `user` is always present, null when the credentials
/// match nothing.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub user: Option<User>,
}

/// Register response. `user` appears on success, `message` on rejection,
/// never both.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    session: Option<Extension<SessionHandle>>,
    Query(filter): Query<Filter>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = state.user_service.login(&filter).await?;

    if let (Some(user), Some(Extension(handle))) = (&outcome.user, &session) {
        state
            .session_repo
            .set_data(&handle.id, &json!({ "user_id": user.id }))
            .await?;
    }

    Ok(Json(LoginResponse {
        status: if outcome.user.is_some() { "yes" } else { "no" },
        user: outcome.user,
    }))
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> Result<Json<RegisterResponse>, ApiError> {
    match state.user_service.register(&input).await? {
        RegisterOutcome::Created(user) => Ok(Json(RegisterResponse {
            status: "yes",
            user: Some(user),
            message: None,
        })),
        RegisterOutcome::Rejected(message) => Ok(Json(RegisterResponse {
            status: "no",
            user: None,
            message: Some(message),
        })),
    }
}
