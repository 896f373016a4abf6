// handlers/protected/profile.rs - GET/PUT /api/profile handlers

use axum::{extract::State, Extension};

use crate::database::models::{Profile, ProfileInput};
use crate::handlers::extract::ApiJson;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::profiles;
use crate::state::AppState;

/// GET /api/profile
pub async fn get_own(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Profile> {
    let profile = profiles::get_own(state.store.as_ref(), user.entreprise_id()?).await?;
    Ok(ApiResponse::success(profile))
}

/// PUT /api/profile - replaces the whole profile
pub async fn upsert_own(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(input): ApiJson<ProfileInput>,
) -> ApiResult<Profile> {
    let profile = profiles::upsert(state.store.as_ref(), user.entreprise_id()?, input).await?;
    Ok(ApiResponse::success(profile))
}
