// handlers/protected/entreprise.rs - GET/PUT /api/entreprise handlers

use axum::{extract::State, Extension};

use crate::database::models::{Entreprise, EntreprisePatch};
use crate::handlers::extract::ApiJson;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::entreprises;
use crate::state::AppState;

/// GET /api/entreprise
pub async fn get_own(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Entreprise> {
    let entreprise = entreprises::get(state.store.as_ref(), user.entreprise_id()?).await?;
    Ok(ApiResponse::success(entreprise))
}

/// PUT /api/entreprise
pub async fn update_own(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(patch): ApiJson<EntreprisePatch>,
) -> ApiResult<Entreprise> {
    let entreprise = entreprises::update(state.store.as_ref(), user.entreprise_id()?, patch).await?;
    Ok(ApiResponse::success(entreprise))
}
