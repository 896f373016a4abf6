// handlers/public/auth.rs - token acquisition
//
// POST /auth/login          {"password"} -> admin token (environment secret)
// POST /auth/login/:slug    {"password"} -> token scoped to that entreprise

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use crate::auth::{admin_password_matches, Claims, Role};
use crate::database::models::PublicEntreprise;
use crate::error::ApiError;
use crate::handlers::extract::ApiJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::entreprises;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entreprise: Option<PublicEntreprise>,
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("Invalid credentials")
}

pub async fn admin_login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let Some(secret) = state.config.security.admin_password.as_deref() else {
        tracing::warn!("Admin login attempted but ADMIN_PASSWORD is not configured");
        return Err(invalid_credentials());
    };

    if !admin_password_matches(&body.password, secret) {
        tracing::warn!("Admin login failed");
        return Err(invalid_credentials());
    }

    let token = state.tokens.issue(Claims::admin())?;
    tracing::info!("Admin logged in");

    Ok(ApiResponse::success(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.tokens.expires_in_secs(),
        role: Role::Admin,
        entreprise: None,
    }))
}

pub async fn entreprise_login(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let entreprise = entreprises::authenticate(state.store.as_ref(), &slug, &body.password)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Login failed for entreprise '{}'", slug);
            invalid_credentials()
        })?;

    let token = state.tokens.issue(Claims::owner(&entreprise))?;
    tracing::info!("Entreprise '{}' logged in", entreprise.slug);

    Ok(ApiResponse::success(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.tokens.expires_in_secs(),
        role: Role::Owner,
        entreprise: Some(PublicEntreprise::from(&entreprise)),
    }))
}
