use async_trait::async_trait;
use chrono::Datelike;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{
    Contact, Entreprise, Facture, FactureFilter, Mission, MissionFilter, Profile,
};
use super::{Store, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    entreprises: HashMap<Uuid, Entreprise>,
    contacts: HashMap<Uuid, Contact>,
    missions: HashMap<Uuid, Mission>,
    factures: HashMap<Uuid, Facture>,
    profiles: HashMap<Uuid, Profile>,
}

/// In-process store used for development and tests. All tables live behind a
/// single lock so multi-table operations (cascades, detaches) are atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Mirrors the foreign key from tenant rows to `entreprises`.
fn require_entreprise(tables: &Tables, entreprise_id: Uuid) -> StoreResult<()> {
    if tables.entreprises.contains_key(&entreprise_id) {
        Ok(())
    } else {
        Err(StoreError::Conflict(format!("entreprise {} does not exist", entreprise_id)))
    }
}

fn owned_by<'a, T>(
    rows: &'a HashMap<Uuid, T>,
    id: Uuid,
    entreprise_id: Uuid,
    owner: impl Fn(&T) -> Uuid,
) -> Option<&'a T> {
    rows.get(&id).filter(|row| owner(row) == entreprise_id)
}

#[cfg(test)]
impl MemoryStore {
    /// Register a bare entreprise so tenant rows can reference it.
    pub(crate) async fn seed_entreprise(&self, slug: &str) -> Uuid {
        let now = chrono::Utc::now();
        let entreprise = Entreprise {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            name: slug.to_string(),
            email: None,
            phone: None,
            address: None,
            siret: None,
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        };
        let id = entreprise.id;
        self.tables.write().await.entreprises.insert(id, entreprise);
        id
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_entreprise(&self, entreprise: &Entreprise) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.entreprises.values().any(|e| e.slug == entreprise.slug) {
            return Err(StoreError::Conflict(format!("slug '{}' already taken", entreprise.slug)));
        }
        tables.entreprises.insert(entreprise.id, entreprise.clone());
        Ok(())
    }

    async fn update_entreprise(&self, entreprise: &Entreprise) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.entreprises.get_mut(&entreprise.id) {
            Some(row) => {
                *row = entreprise.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound("entreprise".to_string())),
        }
    }

    async fn entreprise_by_id(&self, id: Uuid) -> StoreResult<Option<Entreprise>> {
        Ok(self.tables.read().await.entreprises.get(&id).cloned())
    }

    async fn entreprise_by_slug(&self, slug: &str) -> StoreResult<Option<Entreprise>> {
        let tables = self.tables.read().await;
        Ok(tables.entreprises.values().find(|e| e.slug == slug).cloned())
    }

    async fn list_entreprises(&self) -> StoreResult<Vec<Entreprise>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Entreprise> = tables.entreprises.values().cloned().collect();
        rows.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(rows)
    }

    async fn delete_entreprise(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.entreprises.remove(&id).is_none() {
            return Ok(false);
        }
        tables.contacts.retain(|_, c| c.entreprise_id != id);
        tables.missions.retain(|_, m| m.entreprise_id != id);
        tables.factures.retain(|_, f| f.entreprise_id != id);
        tables.profiles.remove(&id);
        Ok(true)
    }

    async fn insert_contact(&self, contact: &Contact) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        require_entreprise(&tables, contact.entreprise_id)?;
        tables.contacts.insert(contact.id, contact.clone());
        Ok(())
    }

    async fn update_contact(&self, contact: &Contact) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.contacts.get_mut(&contact.id) {
            Some(row) if row.entreprise_id == contact.entreprise_id => {
                *row = contact.clone();
                Ok(())
            }
            _ => Err(StoreError::NotFound("contact".to_string())),
        }
    }

    async fn get_contact(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<Option<Contact>> {
        let tables = self.tables.read().await;
        Ok(owned_by(&tables.contacts, id, entreprise_id, |c| c.entreprise_id).cloned())
    }

    async fn list_contacts(&self, entreprise_id: Uuid) -> StoreResult<Vec<Contact>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Contact> = tables
            .contacts
            .values()
            .filter(|c| c.entreprise_id == entreprise_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(rows)
    }

    async fn delete_contact(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if owned_by(&tables.contacts, id, entreprise_id, |c| c.entreprise_id).is_none() {
            return Ok(false);
        }
        tables.contacts.remove(&id);
        for mission in tables.missions.values_mut() {
            if mission.entreprise_id == entreprise_id && mission.client_id == Some(id) {
                mission.client_id = None;
            }
        }
        Ok(true)
    }

    async fn insert_mission(&self, mission: &Mission) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        require_entreprise(&tables, mission.entreprise_id)?;
        tables.missions.insert(mission.id, mission.clone());
        Ok(())
    }

    async fn update_mission(&self, mission: &Mission) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.missions.get_mut(&mission.id) {
            Some(row) if row.entreprise_id == mission.entreprise_id => {
                *row = mission.clone();
                Ok(())
            }
            _ => Err(StoreError::NotFound("mission".to_string())),
        }
    }

    async fn get_mission(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<Option<Mission>> {
        let tables = self.tables.read().await;
        Ok(owned_by(&tables.missions, id, entreprise_id, |m| m.entreprise_id).cloned())
    }

    async fn list_missions(&self, entreprise_id: Uuid, filter: &MissionFilter) -> StoreResult<Vec<Mission>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Mission> = tables
            .missions
            .values()
            .filter(|m| m.entreprise_id == entreprise_id && filter.matches(m))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn delete_mission(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if owned_by(&tables.missions, id, entreprise_id, |m| m.entreprise_id).is_none() {
            return Ok(false);
        }
        if tables.factures.values().any(|f| f.mission_id == id) {
            return Err(StoreError::Conflict("mission still has factures".to_string()));
        }
        tables.missions.remove(&id);
        Ok(true)
    }

    async fn insert_facture(&self, facture: &Facture) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        require_entreprise(&tables, facture.entreprise_id)?;
        let taken = tables
            .factures
            .values()
            .any(|f| f.entreprise_id == facture.entreprise_id && f.number == facture.number);
        if taken {
            return Err(StoreError::Conflict(format!("facture number '{}' already used", facture.number)));
        }
        tables.factures.insert(facture.id, facture.clone());
        Ok(())
    }

    async fn update_facture(&self, facture: &Facture) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.factures.get_mut(&facture.id) {
            Some(row) if row.entreprise_id == facture.entreprise_id => {
                *row = facture.clone();
                Ok(())
            }
            _ => Err(StoreError::NotFound("facture".to_string())),
        }
    }

    async fn get_facture(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<Option<Facture>> {
        let tables = self.tables.read().await;
        Ok(owned_by(&tables.factures, id, entreprise_id, |f| f.entreprise_id).cloned())
    }

    async fn list_factures(&self, entreprise_id: Uuid, filter: &FactureFilter) -> StoreResult<Vec<Facture>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Facture> = tables
            .factures
            .values()
            .filter(|f| f.entreprise_id == entreprise_id && filter.matches(f))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.issued_on
                .cmp(&a.issued_on)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });
        Ok(rows)
    }

    async fn delete_facture(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if owned_by(&tables.factures, id, entreprise_id, |f| f.entreprise_id).is_none() {
            return Ok(false);
        }
        tables.factures.remove(&id);
        Ok(true)
    }

    async fn max_facture_sequence(&self, entreprise_id: Uuid, year: i32) -> StoreResult<i32> {
        let tables = self.tables.read().await;
        Ok(tables
            .factures
            .values()
            .filter(|f| f.entreprise_id == entreprise_id && f.issued_on.year() == year)
            .map(|f| f.sequence)
            .max()
            .unwrap_or(0))
    }

    async fn get_profile(&self, entreprise_id: Uuid) -> StoreResult<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&entreprise_id).cloned())
    }

    async fn upsert_profile(&self, profile: &Profile) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        require_entreprise(&tables, profile.entreprise_id)?;
        tables.profiles.insert(profile.entreprise_id, profile.clone());
        Ok(())
    }
}
