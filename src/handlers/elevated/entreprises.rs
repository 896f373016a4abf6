// handlers/elevated/entreprises.rs - /api/admin/entreprises handlers

use axum::extract::{Path, State};

use crate::database::models::{Entreprise, NewEntreprise};
use crate::handlers::extract::ApiJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::entreprises;
use crate::state::AppState;

/// GET /api/admin/entreprises
pub async fn list(
    State(state): State<AppState>,
) -> ApiResult<Vec<Entreprise>> {
    let rows = entreprises::list(state.store.as_ref()).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/admin/entreprises
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewEntreprise>,
) -> ApiResult<Entreprise> {
    let entreprise = entreprises::create(state.store.as_ref(), input).await?;
    Ok(ApiResponse::created(entreprise))
}

/// DELETE /api/admin/entreprises/:slug - removes the tenant and all its rows
pub async fn delete(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<()> {
    entreprises::delete_by_slug(state.store.as_ref(), &slug).await?;
    Ok(ApiResponse::no_content())
}
