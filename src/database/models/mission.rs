use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "mission_status", rename_all = "lowercase")]
pub enum MissionStatus {
    #[default]
    Draft,
    Active,
    Completed,
    Cancelled,
}

impl MissionStatus {
    pub const ALL: [MissionStatus; 4] = [
        MissionStatus::Draft,
        MissionStatus::Active,
        MissionStatus::Completed,
        MissionStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::Draft => "draft",
            MissionStatus::Active => "active",
            MissionStatus::Completed => "completed",
            MissionStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mission {
    pub id: Uuid,
    pub entreprise_id: Uuid,
    pub client_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub status: MissionStatus,
    pub daily_rate: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMission {
    pub title: String,
    pub client_id: Option<Uuid>,
    pub description: Option<String>,
    #[serde(default)]
    pub status: MissionStatus,
    pub daily_rate: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MissionPatch {
    pub title: Option<String>,
    pub client_id: Option<Uuid>,
    pub description: Option<String>,
    pub status: Option<MissionStatus>,
    pub daily_rate: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Query-string filters for mission listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MissionFilter {
    pub status: Option<MissionStatus>,
    pub client_id: Option<Uuid>,
}

impl MissionFilter {
    pub fn matches(&self, mission: &Mission) -> bool {
        self.status.map_or(true, |s| mission.status == s)
            && self.client_id.map_or(true, |c| mission.client_id == Some(c))
    }
}
