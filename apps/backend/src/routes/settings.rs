//! Study settings endpoints

use axum::{extract::State, Extension, Json};

use crate::error::Result;
use crate::models::{SettingsResponse, UpdateSettingsRequest};
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/settings
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<SettingsResponse>> {
    let settings = state.db.get_settings(auth.user_id).await?;

    Ok(Json(SettingsResponse {
        smart_grading: settings.smart_grading,
    }))
}

/// PUT /api/settings
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>> {
    let mut current = state.db.get_settings(auth.user_id).await?;

    if let Some(smart_grading) = request.smart_grading {
        current.smart_grading = smart_grading;
    }

    state.db.upsert_settings(&current).await?;

    Ok(Json(SettingsResponse {
        smart_grading: current.smart_grading,
    }))
}
