use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::Entreprise;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform operator, authenticated with the environment admin secret.
    Admin,
    /// Entreprise account holder, scoped to a single tenant.
    Owner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entreprise_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn admin() -> Self {
        Self {
            sub: "admin".to_string(),
            role: Role::Admin,
            entreprise_id: None,
            slug: None,
            iat: 0,
            exp: 0,
        }
    }

    pub fn owner(entreprise: &Entreprise) -> Self {
        Self {
            sub: entreprise.id.to_string(),
            role: Role::Owner,
            entreprise_id: Some(entreprise.id),
            slug: Some(entreprise.slug.clone()),
            iat: 0,
            exp: 0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token: {0}")]
    ValidationError(String),
}

/// Signs and verifies HS256 session tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl TokenService {
    pub fn new(secret: &str, expiry_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::hours(expiry_hours as i64),
        }
    }

    pub fn expires_in_secs(&self) -> i64 {
        self.expiry.num_seconds()
    }

    /// Stamps `iat`/`exp` on the claims and signs them.
    pub fn issue(&self, mut claims: Claims) -> Result<String, JwtError> {
        let now = Utc::now();
        claims.iat = now.timestamp();
        claims.exp = (now + self.expiry).timestamp();

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::ValidationError(e.to_string()),
            })
    }
}
