use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Tenant record. Every other row belongs to exactly one entreprise.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entreprise {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub siret: Option<String>,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The subset of an entreprise shown on its public page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicEntreprise {
    pub slug: String,
    pub name: String,
    pub email: Option<String>,
}

impl From<&Entreprise> for PublicEntreprise {
    fn from(e: &Entreprise) -> Self {
        Self {
            slug: e.slug.clone(),
            name: e.name.clone(),
            email: e.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEntreprise {
    pub slug: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub siret: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntreprisePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub siret: Option<String>,
}
