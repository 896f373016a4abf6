use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::validate::{optional_text, required_text};
use super::{entreprises, ServiceError, ServiceResult};
use crate::database::models::{Experience, Profile, ProfileInput, PublicEntreprise};
use crate::database::Store;

pub const MAX_SKILLS: usize = 50;

/// What the public CV page renders.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub entreprise: PublicEntreprise,
    pub profile: Profile,
}

/// The caller's own profile; an entreprise without one gets an empty draft.
pub async fn get_own(store: &dyn Store, entreprise_id: Uuid) -> ServiceResult<Profile> {
    Ok(store
        .get_profile(entreprise_id)
        .await?
        .unwrap_or_else(|| empty(entreprise_id)))
}

pub async fn upsert(store: &dyn Store, entreprise_id: Uuid, input: ProfileInput) -> ServiceResult<Profile> {
    let profile = Profile {
        entreprise_id,
        headline: optional_text("headline", input.headline.as_deref())?,
        bio: optional_text("bio", input.bio.as_deref())?,
        skills: normalize_skills(input.skills)?,
        experiences: input
            .experiences
            .into_iter()
            .map(normalize_experience)
            .collect::<ServiceResult<Vec<_>>>()?,
        published: input.published,
        updated_at: Utc::now(),
    };

    store.upsert_profile(&profile).await?;
    tracing::debug!("Saved profile of entreprise {} (published: {})", entreprise_id, profile.published);
    Ok(profile)
}

/// Slug lookup for the public page. Unpublished profiles look exactly like
/// unknown slugs.
pub async fn public_by_slug(store: &dyn Store, slug: &str) -> ServiceResult<PublicProfile> {
    let entreprise = entreprises::get_by_slug(store, slug)
        .await
        .map_err(|_| ServiceError::NotFound("profile"))?;

    match store.get_profile(entreprise.id).await? {
        Some(profile) if profile.published => Ok(PublicProfile {
            entreprise: PublicEntreprise::from(&entreprise),
            profile,
        }),
        _ => Err(ServiceError::NotFound("profile")),
    }
}

fn empty(entreprise_id: Uuid) -> Profile {
    Profile {
        entreprise_id,
        headline: None,
        bio: None,
        skills: Vec::new(),
        experiences: Vec::new(),
        published: false,
        updated_at: Utc::now(),
    }
}

/// Trim, drop blanks and case-insensitive duplicates, keep first spelling.
fn normalize_skills(skills: Vec<String>) -> ServiceResult<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for skill in skills {
        let skill = skill.trim();
        if skill.is_empty() || out.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
            continue;
        }
        out.push(skill.to_string());
    }
    if out.len() > MAX_SKILLS {
        return Err(ServiceError::invalid("skills", format!("at most {} entries", MAX_SKILLS)));
    }
    Ok(out)
}

fn normalize_experience(e: Experience) -> ServiceResult<Experience> {
    Ok(Experience {
        title: required_text("experiences.title", &e.title)?,
        company: optional_text("experiences.company", e.company.as_deref())?,
        period: optional_text("experiences.period", e.period.as_deref())?,
        description: optional_text("experiences.description", e.description.as_deref())?,
    })
}
