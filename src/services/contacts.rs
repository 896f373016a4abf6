use chrono::Utc;
use uuid::Uuid;

use super::validate::{optional_email, optional_text, required_text};
use super::{ServiceError, ServiceResult};
use crate::database::models::{Contact, ContactPatch, NewContact};
use crate::database::Store;

pub async fn list(store: &dyn Store, entreprise_id: Uuid) -> ServiceResult<Vec<Contact>> {
    Ok(store.list_contacts(entreprise_id).await?)
}

pub async fn get(store: &dyn Store, entreprise_id: Uuid, id: Uuid) -> ServiceResult<Contact> {
    store
        .get_contact(entreprise_id, id)
        .await?
        .ok_or(ServiceError::NotFound("contact"))
}

pub async fn create(store: &dyn Store, entreprise_id: Uuid, input: NewContact) -> ServiceResult<Contact> {
    let now = Utc::now();
    let contact = Contact {
        id: Uuid::new_v4(),
        entreprise_id,
        name: required_text("name", &input.name)?,
        email: optional_email(input.email.as_deref())?,
        phone: optional_text("phone", input.phone.as_deref())?,
        company: optional_text("company", input.company.as_deref())?,
        notes: optional_text("notes", input.notes.as_deref())?,
        created_at: now,
        updated_at: now,
    };
    store.insert_contact(&contact).await?;
    tracing::debug!("Created contact {} for entreprise {}", contact.id, entreprise_id);
    Ok(contact)
}

pub async fn update(
    store: &dyn Store,
    entreprise_id: Uuid,
    id: Uuid,
    patch: ContactPatch,
) -> ServiceResult<Contact> {
    let mut contact = get(store, entreprise_id, id).await?;

    if let Some(name) = patch.name.as_deref() {
        contact.name = required_text("name", name)?;
    }
    if patch.email.is_some() {
        contact.email = optional_email(patch.email.as_deref())?;
    }
    if patch.phone.is_some() {
        contact.phone = optional_text("phone", patch.phone.as_deref())?;
    }
    if patch.company.is_some() {
        contact.company = optional_text("company", patch.company.as_deref())?;
    }
    if patch.notes.is_some() {
        contact.notes = optional_text("notes", patch.notes.as_deref())?;
    }
    contact.updated_at = Utc::now();

    store.update_contact(&contact).await?;
    Ok(contact)
}

/// Missions that referenced the contact keep existing without a client.
pub async fn delete(store: &dyn Store, entreprise_id: Uuid, id: Uuid) -> ServiceResult<()> {
    if !store.delete_contact(entreprise_id, id).await? {
        return Err(ServiceError::NotFound("contact"));
    }
    tracing::info!("Deleted contact {} of entreprise {}", id, entreprise_id);
    Ok(())
}
