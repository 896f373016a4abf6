use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::validate::{cents, date_in_range, max_amount, optional_text, required_text};
use super::{ServiceError, ServiceResult};
use crate::database::models::{Mission, MissionFilter, MissionPatch, NewMission};
use crate::database::{Store, StoreError};

pub async fn list(store: &dyn Store, entreprise_id: Uuid, filter: &MissionFilter) -> ServiceResult<Vec<Mission>> {
    Ok(store.list_missions(entreprise_id, filter).await?)
}

pub async fn get(store: &dyn Store, entreprise_id: Uuid, id: Uuid) -> ServiceResult<Mission> {
    store
        .get_mission(entreprise_id, id)
        .await?
        .ok_or(ServiceError::NotFound("mission"))
}

pub async fn create(store: &dyn Store, entreprise_id: Uuid, input: NewMission) -> ServiceResult<Mission> {
    let now = Utc::now();
    let mission = Mission {
        id: Uuid::new_v4(),
        entreprise_id,
        client_id: input.client_id,
        title: required_text("title", &input.title)?,
        description: optional_text("description", input.description.as_deref())?,
        status: input.status,
        daily_rate: input.daily_rate,
        start_date: input.start_date,
        end_date: input.end_date,
        created_at: now,
        updated_at: now,
    };
    check(store, &mission).await?;

    store.insert_mission(&mission).await?;
    tracing::debug!("Created mission {} for entreprise {}", mission.id, entreprise_id);
    Ok(mission)
}

pub async fn update(
    store: &dyn Store,
    entreprise_id: Uuid,
    id: Uuid,
    patch: MissionPatch,
) -> ServiceResult<Mission> {
    let mut mission = get(store, entreprise_id, id).await?;

    if let Some(title) = patch.title.as_deref() {
        mission.title = required_text("title", title)?;
    }
    if patch.description.is_some() {
        mission.description = optional_text("description", patch.description.as_deref())?;
    }
    if patch.client_id.is_some() {
        mission.client_id = patch.client_id;
    }
    if let Some(status) = patch.status {
        mission.status = status;
    }
    if patch.daily_rate.is_some() {
        mission.daily_rate = patch.daily_rate;
    }
    if patch.start_date.is_some() {
        mission.start_date = patch.start_date;
    }
    if patch.end_date.is_some() {
        mission.end_date = patch.end_date;
    }
    check(store, &mission).await?;
    mission.updated_at = Utc::now();

    store.update_mission(&mission).await?;
    Ok(mission)
}

pub async fn delete(store: &dyn Store, entreprise_id: Uuid, id: Uuid) -> ServiceResult<()> {
    match store.delete_mission(entreprise_id, id).await {
        Ok(true) => {
            tracing::info!("Deleted mission {} of entreprise {}", id, entreprise_id);
            Ok(())
        }
        Ok(false) => Err(ServiceError::NotFound("mission")),
        Err(StoreError::Conflict(_)) => Err(ServiceError::Conflict(
            "mission has factures; delete or cancel them first".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

async fn check(store: &dyn Store, mission: &Mission) -> ServiceResult<()> {
    if let Some(start) = mission.start_date {
        date_in_range("start_date", start)?;
    }
    if let Some(end) = mission.end_date {
        date_in_range("end_date", end)?;
    }
    check_dates(mission.start_date, mission.end_date)?;
    if let Some(rate) = mission.daily_rate {
        cents("daily_rate", rate, max_amount())?;
    }
    if let Some(client_id) = mission.client_id {
        if store.get_contact(mission.entreprise_id, client_id).await?.is_none() {
            return Err(ServiceError::invalid("client_id", "does not reference one of your contacts"));
        }
    }
    Ok(())
}

fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> ServiceResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err(ServiceError::invalid("end_date", "must not be before start_date"))
        }
        _ => Ok(()),
    }
}
