//! User registration and profile endpoints

use axum::{extract::State, Extension, Json};

use crate::error::{ApiError, Result};
use crate::models::{RegisterUserRequest, RegisterUserResponse, UserResponse};
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// POST /api/users/register
/// Creates a new user and returns the token
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<Option<RegisterUserRequest>>,
) -> Result<Json<RegisterUserResponse>> {
    let name = payload.and_then(|p| p.name);
    let user = state.db.create_user(name.as_deref()).await?;

    tracing::info!(user_id = %user.id, "registered new user");

    Ok(Json(RegisterUserResponse {
        user_id: user.id,
        token: user.token,
    }))
}

/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<UserResponse>> {
    let user = state
        .db
        .get_user_by_token(&auth.token)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse {
        user_id: user.id,
        name: user.name,
        last_seen_at: user.last_seen_at,
    }))
}
