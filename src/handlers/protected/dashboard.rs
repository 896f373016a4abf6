// handlers/protected/dashboard.rs - GET /api/dashboard handler

use axum::{extract::State, Extension};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::dashboard::{self, Summary};
use crate::state::AppState;

/// GET /api/dashboard
pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Summary> {
    let summary = dashboard::summary(state.store.as_ref(), user.entreprise_id()?).await?;
    Ok(ApiResponse::success(summary))
}
