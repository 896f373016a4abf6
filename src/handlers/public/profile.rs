// handlers/public/profile.rs - GET /public/:slug handler

use axum::extract::{Path, State};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::profiles::{self, PublicProfile};
use crate::state::AppState;

/// GET /public/:slug - published CV of an entreprise
pub async fn public_profile(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<PublicProfile> {
    let profile = profiles::public_by_slug(state.store.as_ref(), &slug).await?;
    Ok(ApiResponse::success(profile))
}
