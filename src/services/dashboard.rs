use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::ServiceResult;
use crate::database::models::{Facture, FactureFilter, FactureStatus, Mission, MissionFilter, MissionStatus};
use crate::database::Store;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Summary {
    pub contacts: usize,
    pub missions: usize,
    pub missions_by_status: BTreeMap<&'static str, usize>,
    pub factures: usize,
    pub revenue_paid: Decimal,
    pub outstanding: Decimal,
    pub overdue: usize,
}

pub async fn summary(store: &dyn Store, entreprise_id: Uuid) -> ServiceResult<Summary> {
    let contacts = store.list_contacts(entreprise_id).await?.len();
    let missions = store.list_missions(entreprise_id, &MissionFilter::default()).await?;
    let factures = store.list_factures(entreprise_id, &FactureFilter::default()).await?;
    Ok(summarize(contacts, &missions, &factures, Utc::now().date_naive()))
}

fn summarize(contacts: usize, missions: &[Mission], factures: &[Facture], today: NaiveDate) -> Summary {
    let mut missions_by_status: BTreeMap<&'static str, usize> =
        MissionStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    for mission in missions {
        *missions_by_status.entry(mission.status.as_str()).or_default() += 1;
    }

    let mut revenue_paid = Decimal::ZERO;
    let mut outstanding = Decimal::ZERO;
    let mut overdue = 0;
    for facture in factures {
        match facture.status {
            FactureStatus::Paid => revenue_paid = revenue_paid.saturating_add(facture.amount_ttc),
            FactureStatus::Sent => {
                outstanding = outstanding.saturating_add(facture.amount_ttc);
                if facture.due_on < today {
                    overdue += 1;
                }
            }
            FactureStatus::Draft | FactureStatus::Cancelled => {}
        }
    }

    Summary {
        contacts,
        missions: missions.len(),
        missions_by_status,
        factures: factures.len(),
        revenue_paid,
        outstanding,
        overdue,
    }
}
