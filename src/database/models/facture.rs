use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "facture_status", rename_all = "lowercase")]
pub enum FactureStatus {
    Draft,
    Sent,
    Paid,
    Cancelled,
}

impl FactureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactureStatus::Draft => "draft",
            FactureStatus::Sent => "sent",
            FactureStatus::Paid => "paid",
            FactureStatus::Cancelled => "cancelled",
        }
    }

    /// Allowed lifecycle moves: draft -> sent -> paid, with cancellation
    /// possible until payment.
    pub fn can_transition_to(&self, next: FactureStatus) -> bool {
        matches!(
            (self, next),
            (FactureStatus::Draft, FactureStatus::Sent)
                | (FactureStatus::Draft, FactureStatus::Cancelled)
                | (FactureStatus::Sent, FactureStatus::Paid)
                | (FactureStatus::Sent, FactureStatus::Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Facture {
    pub id: Uuid,
    pub entreprise_id: Uuid,
    pub mission_id: Uuid,
    pub number: String,
    pub sequence: i32,
    pub label: Option<String>,
    pub amount_ht: Decimal,
    pub tva_rate: Decimal,
    pub amount_tva: Decimal,
    pub amount_ttc: Decimal,
    pub status: FactureStatus,
    pub issued_on: NaiveDate,
    pub due_on: NaiveDate,
    pub paid_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFacture {
    pub mission_id: Uuid,
    pub label: Option<String>,
    pub amount_ht: Decimal,
    pub tva_rate: Option<Decimal>,
    pub issued_on: Option<NaiveDate>,
    pub due_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacturePatch {
    pub label: Option<String>,
    pub amount_ht: Option<Decimal>,
    pub tva_rate: Option<Decimal>,
    pub issued_on: Option<NaiveDate>,
    pub due_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FactureFilter {
    pub status: Option<FactureStatus>,
    pub mission_id: Option<Uuid>,
}

impl FactureFilter {
    pub fn matches(&self, facture: &Facture) -> bool {
        self.status.map_or(true, |s| facture.status == s)
            && self.mission_id.map_or(true, |m| facture.mission_id == m)
    }
}
