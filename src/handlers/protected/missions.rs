// handlers/protected/missions.rs - /api/missions handlers

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::database::models::{Mission, MissionFilter, MissionPatch, NewMission};
use crate::handlers::extract::{ApiJson, ApiQuery};
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::missions;
use crate::state::AppState;

/// GET /api/missions?status=&client_id=
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(filter): ApiQuery<MissionFilter>,
) -> ApiResult<Vec<Mission>> {
    let rows = missions::list(state.store.as_ref(), user.entreprise_id()?, &filter).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/missions
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(input): ApiJson<NewMission>,
) -> ApiResult<Mission> {
    let mission = missions::create(state.store.as_ref(), user.entreprise_id()?, input).await?;
    Ok(ApiResponse::created(mission))
}

/// GET /api/missions/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Mission> {
    let id = parse_id("mission", &id)?;
    let mission = missions::get(state.store.as_ref(), user.entreprise_id()?, id).await?;
    Ok(ApiResponse::success(mission))
}

/// PUT /api/missions/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<MissionPatch>,
) -> ApiResult<Mission> {
    let id = parse_id("mission", &id)?;
    let mission = missions::update(state.store.as_ref(), user.entreprise_id()?, id, patch).await?;
    Ok(ApiResponse::success(mission))
}

/// DELETE /api/missions/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id("mission", &id)?;
    missions::delete(state.store.as_ref(), user.entreprise_id()?, id).await?;
    Ok(ApiResponse::no_content())
}
