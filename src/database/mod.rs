pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use models::{
    Contact, Entreprise, Facture, FactureFilter, Mission, MissionFilter, Profile,
};

/// Errors from a `Store` backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() || db.is_foreign_key_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::ConnectionError(err.to_string())
            }
            _ => StoreError::Sqlx(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Row storage for all tenant data.
///
/// Every tenant-owned operation takes the owning `entreprise_id` and must only
/// read or write rows of that entreprise. Lookups of a row that exists under a
/// different entreprise behave exactly like lookups of a missing row.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    // Entreprises
    async fn insert_entreprise(&self, entreprise: &Entreprise) -> StoreResult<()>;
    async fn update_entreprise(&self, entreprise: &Entreprise) -> StoreResult<()>;
    async fn entreprise_by_id(&self, id: Uuid) -> StoreResult<Option<Entreprise>>;
    async fn entreprise_by_slug(&self, slug: &str) -> StoreResult<Option<Entreprise>>;
    async fn list_entreprises(&self) -> StoreResult<Vec<Entreprise>>;
    /// Removes the entreprise and every row it owns.
    async fn delete_entreprise(&self, id: Uuid) -> StoreResult<bool>;

    // Contacts
    async fn insert_contact(&self, contact: &Contact) -> StoreResult<()>;
    async fn update_contact(&self, contact: &Contact) -> StoreResult<()>;
    async fn get_contact(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<Option<Contact>>;
    async fn list_contacts(&self, entreprise_id: Uuid) -> StoreResult<Vec<Contact>>;
    /// Deletes the contact and clears `client_id` on the missions that referenced it.
    async fn delete_contact(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<bool>;

    // Missions
    async fn insert_mission(&self, mission: &Mission) -> StoreResult<()>;
    async fn update_mission(&self, mission: &Mission) -> StoreResult<()>;
    async fn get_mission(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<Option<Mission>>;
    async fn list_missions(&self, entreprise_id: Uuid, filter: &MissionFilter) -> StoreResult<Vec<Mission>>;
    async fn delete_mission(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<bool>;

    // Factures
    async fn insert_facture(&self, facture: &Facture) -> StoreResult<()>;
    async fn update_facture(&self, facture: &Facture) -> StoreResult<()>;
    async fn get_facture(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<Option<Facture>>;
    async fn list_factures(&self, entreprise_id: Uuid, filter: &FactureFilter) -> StoreResult<Vec<Facture>>;
    async fn delete_facture(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<bool>;
    /// Highest facture sequence used by the entreprise for invoices issued in `year`.
    async fn max_facture_sequence(&self, entreprise_id: Uuid, year: i32) -> StoreResult<i32>;

    // Profiles
    async fn get_profile(&self, entreprise_id: Uuid) -> StoreResult<Option<Profile>>;
    async fn upsert_profile(&self, profile: &Profile) -> StoreResult<()>;
}
