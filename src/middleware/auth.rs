use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{Claims, Role};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller extracted from the bearer token
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub sub: String,
    pub role: Role,
    pub entreprise_id: Option<Uuid>,
    pub slug: Option<String>,
    pub expires_at: i64,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            sub: claims.sub,
            role: claims.role,
            entreprise_id: claims.entreprise_id,
            slug: claims.slug,
            expires_at: claims.exp,
        }
    }
}

impl AuthUser {
    /// The tenant this caller acts for. Admin tokens carry no tenant.
    pub fn entreprise_id(&self) -> Result<Uuid, ApiError> {
        match (self.role, self.entreprise_id) {
            (Role::Owner, Some(id)) => Ok(id),
            _ => Err(ApiError::forbidden("This endpoint requires an entreprise account")),
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::forbidden("Administrator access required"))
        }
    }
}

/// Rejects requests without a valid bearer token and injects `AuthUser`
/// into the request extensions for downstream handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = user_from_headers(&state, request.headers()).map_err(|err| {
        tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), err);
        err
    })?;

    // tokens outlive their entreprise when an admin deletes it
    if let (Role::Owner, Some(id)) = (auth_user.role, auth_user.entreprise_id) {
        if state.store.entreprise_by_id(id).await?.is_none() {
            tracing::warn!("Rejected token of deleted entreprise {}", id);
            return Err(ApiError::unauthorized("Account no longer exists"));
        }
    }

    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Layered after `require_auth` on admin routes.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if let Err(err) = user.require_admin() {
        tracing::warn!("Non-admin caller '{}' rejected from {}", user.sub, request.uri().path());
        return Err(err);
    }
    Ok(next.run(request).await)
}

/// Resolve the caller from the Authorization header.
pub fn user_from_headers(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = extract_bearer_token(headers).map_err(ApiError::unauthorized)?;
    let claims = state.tokens.verify(token)?;
    Ok(AuthUser::from(claims))
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty bearer token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(extract_bearer_token(&headers("Bearer   ")), Err("Empty bearer token"));
        assert!(extract_bearer_token(&headers("Basic dXNlcg==")).is_err());
        assert!(extract_bearer_token(&HeaderMap::new()).is_err());
    }

    #[test]
    fn admin_has_no_tenant() {
        let admin = AuthUser::from(Claims::admin());
        assert!(admin.require_admin().is_ok());
        assert!(admin.entreprise_id().is_err());
    }

    #[test]
    fn owner_is_scoped_to_its_tenant() {
        let id = Uuid::new_v4();
        let owner = AuthUser {
            sub: id.to_string(),
            role: Role::Owner,
            entreprise_id: Some(id),
            slug: Some("acme".to_string()),
            expires_at: 0,
        };
        assert_eq!(owner.entreprise_id().unwrap(), id);
        assert!(owner.require_admin().is_err());
    }
}
