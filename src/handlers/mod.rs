// handlers/mod.rs - three security tiers
//
// Public (no auth) -> Protected (bearer token) -> Elevated (admin token)
pub mod elevated;
pub mod extract;
pub mod protected;
pub mod public;

use uuid::Uuid;

use crate::error::ApiError;

/// Parse a path id, answering 400 instead of axum's plain-text rejection.
pub(crate) fn parse_id(kind: &'static str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid {} id '{}'", kind, raw)))
}
