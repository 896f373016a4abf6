// handlers/protected/factures.rs - /api/factures handlers

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::database::models::{Facture, FactureFilter, FacturePatch, NewFacture};
use crate::handlers::extract::{ApiJson, ApiQuery};
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::factures::{self, StatusChange};
use crate::state::AppState;

/// GET /api/factures?status=&mission_id=
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(filter): ApiQuery<FactureFilter>,
) -> ApiResult<Vec<Facture>> {
    let rows = factures::list(state.store.as_ref(), user.entreprise_id()?, &filter).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/factures
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(input): ApiJson<NewFacture>,
) -> ApiResult<Facture> {
    let facture = factures::create(state.store.as_ref(), user.entreprise_id()?, input).await?;
    Ok(ApiResponse::created(facture))
}

/// GET /api/factures/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Facture> {
    let id = parse_id("facture", &id)?;
    let facture = factures::get(state.store.as_ref(), user.entreprise_id()?, id).await?;
    Ok(ApiResponse::success(facture))
}

/// PUT /api/factures/:id - drafts only
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<FacturePatch>,
) -> ApiResult<Facture> {
    let id = parse_id("facture", &id)?;
    let facture = factures::update(state.store.as_ref(), user.entreprise_id()?, id, patch).await?;
    Ok(ApiResponse::success(facture))
}

/// POST /api/factures/:id/status
pub async fn change_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(change): ApiJson<StatusChange>,
) -> ApiResult<Facture> {
    let id = parse_id("facture", &id)?;
    let facture = factures::change_status(state.store.as_ref(), user.entreprise_id()?, id, change).await?;
    Ok(ApiResponse::success(facture))
}

/// DELETE /api/factures/:id - drafts only
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id("facture", &id)?;
    factures::delete(state.store.as_ref(), user.entreprise_id()?, id).await?;
    Ok(ApiResponse::no_content())
}
