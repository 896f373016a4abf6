// handlers/protected/contacts.rs - /api/contacts handlers

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::database::models::{Contact, ContactPatch, NewContact};
use crate::handlers::{extract::ApiJson, parse_id};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::contacts;
use crate::state::AppState;

/// GET /api/contacts
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Contact>> {
    let rows = contacts::list(state.store.as_ref(), user.entreprise_id()?).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/contacts
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(input): ApiJson<NewContact>,
) -> ApiResult<Contact> {
    let contact = contacts::create(state.store.as_ref(), user.entreprise_id()?, input).await?;
    Ok(ApiResponse::created(contact))
}

/// GET /api/contacts/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Contact> {
    let id = parse_id("contact", &id)?;
    let contact = contacts::get(state.store.as_ref(), user.entreprise_id()?, id).await?;
    Ok(ApiResponse::success(contact))
}

/// PUT /api/contacts/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ContactPatch>,
) -> ApiResult<Contact> {
    let id = parse_id("contact", &id)?;
    let contact = contacts::update(state.store.as_ref(), user.entreprise_id()?, id, patch).await?;
    Ok(ApiResponse::success(contact))
}

/// DELETE /api/contacts/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id("contact", &id)?;
    contacts::delete(state.store.as_ref(), user.entreprise_id()?, id).await?;
    Ok(ApiResponse::no_content())
}
