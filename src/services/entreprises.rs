use chrono::Utc;
use once_cell::sync::Lazy;
use uuid::Uuid;

use super::slug::{slugify, validate_slug};
use super::validate::{optional_email, optional_text, required_text};
use super::{ServiceError, ServiceResult};
use crate::auth::PasswordService;
use crate::database::models::{Entreprise, EntreprisePatch, NewEntreprise};
use crate::database::{Store, StoreError};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Verified against when the slug is unknown so both failures cost one Argon2 run.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| PasswordService::hash("entreprise-api-unknown-slug").ok());

pub async fn create(store: &dyn Store, input: NewEntreprise) -> ServiceResult<Entreprise> {
    let name = required_text("name", &input.name)?;
    let slug = match input.slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => slugify(&name),
    };
    validate_slug(&slug)?;

    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::invalid(
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }

    let now = Utc::now();
    let entreprise = Entreprise {
        id: Uuid::new_v4(),
        slug,
        name,
        email: optional_email(input.email.as_deref())?,
        phone: optional_text("phone", input.phone.as_deref())?,
        address: optional_text("address", input.address.as_deref())?,
        siret: optional_siret(input.siret.as_deref())?,
        password_hash: PasswordService::hash(&input.password)?,
        created_at: now,
        updated_at: now,
    };

    store.insert_entreprise(&entreprise).await.map_err(|e| match e {
        StoreError::Conflict(_) => {
            ServiceError::Conflict(format!("slug '{}' is already taken", entreprise.slug))
        }
        other => other.into(),
    })?;

    tracing::info!("Created entreprise '{}' ({})", entreprise.slug, entreprise.id);
    Ok(entreprise)
}

pub async fn get(store: &dyn Store, id: Uuid) -> ServiceResult<Entreprise> {
    store
        .entreprise_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound("entreprise"))
}

pub async fn get_by_slug(store: &dyn Store, slug: &str) -> ServiceResult<Entreprise> {
    store
        .entreprise_by_slug(slug)
        .await?
        .ok_or(ServiceError::NotFound("entreprise"))
}

pub async fn list(store: &dyn Store) -> ServiceResult<Vec<Entreprise>> {
    Ok(store.list_entreprises().await?)
}

pub async fn update(store: &dyn Store, id: Uuid, patch: EntreprisePatch) -> ServiceResult<Entreprise> {
    let mut entreprise = get(store, id).await?;

    if let Some(name) = patch.name.as_deref() {
        entreprise.name = required_text("name", name)?;
    }
    if patch.email.is_some() {
        entreprise.email = optional_email(patch.email.as_deref())?;
    }
    if patch.phone.is_some() {
        entreprise.phone = optional_text("phone", patch.phone.as_deref())?;
    }
    if patch.address.is_some() {
        entreprise.address = optional_text("address", patch.address.as_deref())?;
    }
    if patch.siret.is_some() {
        entreprise.siret = optional_siret(patch.siret.as_deref())?;
    }
    entreprise.updated_at = Utc::now();

    store.update_entreprise(&entreprise).await?;
    Ok(entreprise)
}

pub async fn delete_by_slug(store: &dyn Store, slug: &str) -> ServiceResult<()> {
    let entreprise = get_by_slug(store, slug).await?;
    if !store.delete_entreprise(entreprise.id).await? {
        return Err(ServiceError::NotFound("entreprise"));
    }
    tracing::info!("Deleted entreprise '{}' and all of its data", slug);
    Ok(())
}

/// Check an entreprise login. Unknown slugs and wrong passwords are
/// indistinguishable to the caller.
pub async fn authenticate(store: &dyn Store, slug: &str, password: &str) -> ServiceResult<Option<Entreprise>> {
    let Some(entreprise) = store.entreprise_by_slug(slug).await? else {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = PasswordService::verify(password, hash);
        }
        return Ok(None);
    };
    if PasswordService::verify(password, &entreprise.password_hash)? {
        Ok(Some(entreprise))
    } else {
        Ok(None)
    }
}

/// SIRET numbers are 14 digits; spaces are accepted and stripped.
fn optional_siret(value: Option<&str>) -> ServiceResult<Option<String>> {
    let Some(raw) = optional_text("siret", value)? else {
        return Ok(None);
    };
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() != 14 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ServiceError::invalid("siret", "must be 14 digits"));
    }
    Ok(Some(digits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn new_entreprise(name: &str, slug: Option<&str>) -> NewEntreprise {
        NewEntreprise {
            slug: slug.map(str::to_string),
            name: name.to_string(),
            email: Some("contact@example.fr".to_string()),
            phone: None,
            address: None,
            siret: Some("123 456 789 00012".to_string()),
            password: "long-enough".to_string(),
        }
    }

    #[tokio::test]
    async fn create_derives_slug_and_hashes_password() {
        let store = MemoryStore::new();
        let e = create(&store, new_entreprise("Élodie Conseil", None)).await.unwrap();
        assert_eq!(e.slug, "elodie-conseil");
        assert_eq!(e.siret.as_deref(), Some("12345678900012"));
        assert_ne!(e.password_hash, "long-enough");

        let found = authenticate(&store, "elodie-conseil", "long-enough").await.unwrap();
        assert_eq!(found.map(|f| f.id), Some(e.id));
        assert!(authenticate(&store, "elodie-conseil", "nope-nope").await.unwrap().is_none());
        assert!(authenticate(&store, "unknown", "long-enough").await.unwrap().is_none());
    }

    #[test]
    fn unknown_slugs_are_checked_against_a_real_hash() {
        let hash = DUMMY_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!PasswordService::verify("long-enough", hash).unwrap());
    }

    #[tokio::test]
    async fn duplicate_slug_conflicts() {
        let store = MemoryStore::new();
        create(&store, new_entreprise("Acme", Some("acme"))).await.unwrap();
        let err = create(&store, new_entreprise("Acme Bis", Some("acme"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn rejects_short_password_and_bad_siret() {
        let store = MemoryStore::new();
        let mut input = new_entreprise("Acme", None);
        input.password = "short".to_string();
        assert!(matches!(
            create(&store, input).await,
            Err(ServiceError::Invalid { field: "password", .. })
        ));

        let mut input = new_entreprise("Acme", None);
        input.siret = Some("12AB".to_string());
        assert!(matches!(
            create(&store, input).await,
            Err(ServiceError::Invalid { field: "siret", .. })
        ));
    }

    #[tokio::test]
    async fn update_keeps_slug() {
        let store = MemoryStore::new();
        let e = create(&store, new_entreprise("Acme", None)).await.unwrap();
        let patch = EntreprisePatch {
            name: Some("Acme Renamed".to_string()),
            ..Default::default()
        };
        let updated = update(&store, e.id, patch).await.unwrap();
        assert_eq!(updated.name, "Acme Renamed");
        assert_eq!(updated.slug, "acme");
        assert_eq!(updated.email, e.email);
    }
}
