use chrono::{Datelike, Duration, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use uuid::Uuid;

use super::validate::{cents, date_in_range, max_amount, optional_text};
use super::{ServiceError, ServiceResult};
use crate::database::models::{Facture, FactureFilter, FacturePatch, FactureStatus, NewFacture};
use crate::database::{Store, StoreError};

/// Standard French VAT rate applied when none is given.
pub const DEFAULT_TVA_RATE: i64 = 20;
pub const DEFAULT_PAYMENT_TERM_DAYS: i64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub status: FactureStatus,
    pub paid_on: Option<NaiveDate>,
}

/// Tax breakdown of an invoice, rounded to cents half away from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amounts {
    pub ht: Decimal,
    pub tva: Decimal,
    pub ttc: Decimal,
}

/// Fails when the total would not fit a money column.
pub fn compute_amounts(amount_ht: Decimal, tva_rate: Decimal) -> ServiceResult<Amounts> {
    let ht = round_cents(amount_ht);
    let tva = ht
        .checked_mul(tva_rate)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .map(round_cents)
        .ok_or_else(total_too_large)?;
    let ttc = ht.checked_add(tva).ok_or_else(total_too_large)?;
    if ttc > max_amount() {
        return Err(total_too_large());
    }
    Ok(Amounts { ht, tva, ttc })
}

fn total_too_large() -> ServiceError {
    ServiceError::invalid("amount_ht", format!("total must not exceed {}", max_amount()))
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn format_number(year: i32, sequence: i32) -> String {
    format!("F-{}-{:04}", year, sequence)
}

pub async fn list(store: &dyn Store, entreprise_id: Uuid, filter: &FactureFilter) -> ServiceResult<Vec<Facture>> {
    Ok(store.list_factures(entreprise_id, filter).await?)
}

pub async fn get(store: &dyn Store, entreprise_id: Uuid, id: Uuid) -> ServiceResult<Facture> {
    store
        .get_facture(entreprise_id, id)
        .await?
        .ok_or(ServiceError::NotFound("facture"))
}

pub async fn create(store: &dyn Store, entreprise_id: Uuid, input: NewFacture) -> ServiceResult<Facture> {
    if store.get_mission(entreprise_id, input.mission_id).await?.is_none() {
        return Err(ServiceError::invalid("mission_id", "does not reference one of your missions"));
    }

    let tva_rate = input.tva_rate.unwrap_or_else(|| Decimal::from(DEFAULT_TVA_RATE));
    check_amounts(input.amount_ht, tva_rate)?;
    let amounts = compute_amounts(input.amount_ht, tva_rate)?;

    let issued_on = date_in_range("issued_on", input.issued_on.unwrap_or_else(|| Utc::now().date_naive()))?;
    let due_on = match input.due_on {
        Some(due_on) => date_in_range("due_on", due_on)?,
        None => issued_on
            .checked_add_signed(Duration::days(DEFAULT_PAYMENT_TERM_DAYS))
            .ok_or_else(|| ServiceError::invalid("issued_on", "is out of range"))?,
    };
    check_due_date(issued_on, due_on)?;

    let year = issued_on.year();
    let sequence = store.max_facture_sequence(entreprise_id, year).await? + 1;

    let now = Utc::now();
    let facture = Facture {
        id: Uuid::new_v4(),
        entreprise_id,
        mission_id: input.mission_id,
        number: format_number(year, sequence),
        sequence,
        label: optional_text("label", input.label.as_deref())?,
        amount_ht: amounts.ht,
        tva_rate,
        amount_tva: amounts.tva,
        amount_ttc: amounts.ttc,
        status: FactureStatus::Draft,
        issued_on,
        due_on,
        paid_on: None,
        created_at: now,
        updated_at: now,
    };

    store.insert_facture(&facture).await.map_err(|e| match e {
        StoreError::Conflict(_) => ServiceError::Conflict(format!(
            "facture number {} was taken concurrently; retry",
            facture.number
        )),
        other => other.into(),
    })?;

    tracing::info!("Created facture {} for entreprise {}", facture.number, entreprise_id);
    Ok(facture)
}

/// Only draft factures can be edited. The number is fixed at creation, so
/// the issue date may not move to another year.
pub async fn update(
    store: &dyn Store,
    entreprise_id: Uuid,
    id: Uuid,
    patch: FacturePatch,
) -> ServiceResult<Facture> {
    let mut facture = get(store, entreprise_id, id).await?;
    if facture.status != FactureStatus::Draft {
        return Err(ServiceError::Conflict(format!(
            "facture {} is {} and can no longer be edited",
            facture.number,
            facture.status.as_str()
        )));
    }

    if patch.label.is_some() {
        facture.label = optional_text("label", patch.label.as_deref())?;
    }
    if let Some(issued_on) = patch.issued_on {
        let issued_on = date_in_range("issued_on", issued_on)?;
        if issued_on.year() != facture.issued_on.year() {
            return Err(ServiceError::invalid("issued_on", "cannot move to another year"));
        }
        facture.issued_on = issued_on;
    }
    if let Some(due_on) = patch.due_on {
        facture.due_on = date_in_range("due_on", due_on)?;
    }
    check_due_date(facture.issued_on, facture.due_on)?;

    let amount_ht = patch.amount_ht.unwrap_or(facture.amount_ht);
    let tva_rate = patch.tva_rate.unwrap_or(facture.tva_rate);
    check_amounts(amount_ht, tva_rate)?;
    let amounts = compute_amounts(amount_ht, tva_rate)?;
    facture.amount_ht = amounts.ht;
    facture.tva_rate = tva_rate;
    facture.amount_tva = amounts.tva;
    facture.amount_ttc = amounts.ttc;
    facture.updated_at = Utc::now();

    store.update_facture(&facture).await?;
    Ok(facture)
}

pub async fn change_status(
    store: &dyn Store,
    entreprise_id: Uuid,
    id: Uuid,
    change: StatusChange,
) -> ServiceResult<Facture> {
    let mut facture = get(store, entreprise_id, id).await?;
    if !facture.status.can_transition_to(change.status) {
        return Err(ServiceError::Conflict(format!(
            "facture {} cannot go from {} to {}",
            facture.number,
            facture.status.as_str(),
            change.status.as_str()
        )));
    }

    if change.status == FactureStatus::Paid {
        let paid_on = date_in_range("paid_on", change.paid_on.unwrap_or_else(|| Utc::now().date_naive()))?;
        if paid_on < facture.issued_on {
            return Err(ServiceError::invalid("paid_on", "must not be before issued_on"));
        }
        facture.paid_on = Some(paid_on);
    }
    facture.status = change.status;
    facture.updated_at = Utc::now();

    store.update_facture(&facture).await?;
    tracing::info!("Facture {} is now {}", facture.number, facture.status.as_str());
    Ok(facture)
}

pub async fn delete(store: &dyn Store, entreprise_id: Uuid, id: Uuid) -> ServiceResult<()> {
    let facture = get(store, entreprise_id, id).await?;
    if facture.status != FactureStatus::Draft {
        return Err(ServiceError::Conflict(format!(
            "facture {} is {}; only drafts can be deleted",
            facture.number,
            facture.status.as_str()
        )));
    }
    if !store.delete_facture(entreprise_id, id).await? {
        return Err(ServiceError::NotFound("facture"));
    }
    Ok(())
}

fn check_amounts(amount_ht: Decimal, tva_rate: Decimal) -> ServiceResult<()> {
    if amount_ht < Decimal::ZERO {
        return Err(ServiceError::invalid("amount_ht", "must not be negative"));
    }
    if round_cents(amount_ht) > max_amount() {
        return Err(ServiceError::invalid("amount_ht", format!("must not exceed {}", max_amount())));
    }
    cents("tva_rate", tva_rate, Decimal::ONE_HUNDRED)?;
    Ok(())
}

fn check_due_date(issued_on: NaiveDate, due_on: NaiveDate) -> ServiceResult<()> {
    if due_on < issued_on {
        return Err(ServiceError::invalid("due_on", "must not be before issued_on"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{MissionStatus, NewMission};
    use crate::database::MemoryStore;
    use crate::services::missions;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    async fn setup() -> (MemoryStore, Uuid, Uuid) {
        let store = MemoryStore::new();
        let eid = store.seed_entreprise("acme").await;
        let mission = missions::create(
            &store,
            eid,
            NewMission {
                title: "Développement".to_string(),
                client_id: None,
                description: None,
                status: MissionStatus::Active,
                daily_rate: None,
                start_date: None,
                end_date: None,
            },
        )
        .await
        .unwrap();
        (store, eid, mission.id)
    }

    fn new_facture(mission_id: Uuid, amount_ht: Decimal, issued_on: NaiveDate) -> NewFacture {
        NewFacture {
            mission_id,
            label: Some("Janvier".to_string()),
            amount_ht,
            tva_rate: None,
            issued_on: Some(issued_on),
            due_on: None,
        }
    }

    #[test]
    fn amounts_round_half_away_from_zero() {
        let a = compute_amounts(Decimal::new(1000, 0), Decimal::from(20)).unwrap();
        assert_eq!(a.tva, Decimal::new(20000, 2));
        assert_eq!(a.ttc, Decimal::new(120000, 2));

        // ht 0.125 -> 0.13, tva 0.026 -> 0.03
        let a = compute_amounts(Decimal::new(125, 3), Decimal::from(20)).unwrap();
        assert_eq!(a.ht, Decimal::new(13, 2));
        assert_eq!(a.tva, Decimal::new(3, 2));
        assert_eq!(a.ttc, Decimal::new(16, 2));

        let a = compute_amounts(Decimal::new(9999, 2), Decimal::new(55, 1)).unwrap();
        assert_eq!(a.tva, Decimal::new(550, 2));
        assert_eq!(a.ttc, Decimal::new(10549, 2));
    }

    #[test]
    fn totals_beyond_money_columns_are_rejected() {
        assert!(matches!(
            compute_amounts(Decimal::MAX, Decimal::from(20)),
            Err(ServiceError::Invalid { field: "amount_ht", .. })
        ));
        // ht fits, ht + tva does not
        assert!(compute_amounts(Decimal::new(900_000_000_000, 2), Decimal::from(20)).is_err());
        assert!(compute_amounts(Decimal::new(800_000_000_000, 2), Decimal::from(20)).is_ok());
    }

    #[test]
    fn number_format() {
        assert_eq!(format_number(2026, 7), "F-2026-0007");
        assert_eq!(format_number(2026, 12345), "F-2026-12345");
    }

    #[tokio::test]
    async fn numbering_is_per_year_and_never_reuses_higher_numbers() {
        let (store, eid, mission_id) = setup().await;
        let ht = Decimal::from(100);

        let f1 = create(&store, eid, new_facture(mission_id, ht, d(2026, 1, 10))).await.unwrap();
        let f2 = create(&store, eid, new_facture(mission_id, ht, d(2026, 2, 10))).await.unwrap();
        let f3 = create(&store, eid, new_facture(mission_id, ht, d(2027, 1, 2))).await.unwrap();
        assert_eq!(f1.number, "F-2026-0001");
        assert_eq!(f2.number, "F-2026-0002");
        assert_eq!(f3.number, "F-2027-0001");

        delete(&store, eid, f1.id).await.unwrap();
        let f4 = create(&store, eid, new_facture(mission_id, ht, d(2026, 3, 1))).await.unwrap();
        assert_eq!(f4.number, "F-2026-0003");
        assert_eq!(f4.due_on, d(2026, 3, 31));
        assert_eq!(f4.tva_rate, Decimal::from(20));
    }

    #[tokio::test]
    async fn lifecycle() {
        let (store, eid, mission_id) = setup().await;
        let f = create(&store, eid, new_facture(mission_id, Decimal::from(500), d(2026, 4, 1)))
            .await
            .unwrap();

        let paid_early = StatusChange { status: FactureStatus::Paid, paid_on: None };
        assert!(matches!(
            change_status(&store, eid, f.id, paid_early).await,
            Err(ServiceError::Conflict(_))
        ));

        let sent = change_status(&store, eid, f.id, StatusChange { status: FactureStatus::Sent, paid_on: None })
            .await
            .unwrap();
        assert_eq!(sent.status, FactureStatus::Sent);

        // no edits or deletion once sent
        let patch = FacturePatch { amount_ht: Some(Decimal::from(1)), ..Default::default() };
        assert!(matches!(update(&store, eid, f.id, patch).await, Err(ServiceError::Conflict(_))));
        assert!(matches!(delete(&store, eid, f.id).await, Err(ServiceError::Conflict(_))));

        let paid = change_status(
            &store,
            eid,
            f.id,
            StatusChange { status: FactureStatus::Paid, paid_on: Some(d(2026, 4, 20)) },
        )
        .await
        .unwrap();
        assert_eq!(paid.paid_on, Some(d(2026, 4, 20)));
    }

    #[tokio::test]
    async fn validation() {
        let (store, eid, mission_id) = setup().await;

        let mut input = new_facture(mission_id, Decimal::from(-5), d(2026, 1, 1));
        assert!(matches!(
            create(&store, eid, input.clone()).await,
            Err(ServiceError::Invalid { field: "amount_ht", .. })
        ));

        input.amount_ht = Decimal::from(5);
        input.tva_rate = Some(Decimal::from(101));
        assert!(matches!(
            create(&store, eid, input.clone()).await,
            Err(ServiceError::Invalid { field: "tva_rate", .. })
        ));

        input.tva_rate = Some(Decimal::new(5555, 3));
        assert!(matches!(
            create(&store, eid, input.clone()).await,
            Err(ServiceError::Invalid { field: "tva_rate", .. })
        ));

        input.tva_rate = None;
        input.amount_ht = Decimal::MAX;
        assert!(matches!(
            create(&store, eid, input.clone()).await,
            Err(ServiceError::Invalid { field: "amount_ht", .. })
        ));

        input.amount_ht = Decimal::from(5);
        input.issued_on = Some(NaiveDate::MAX);
        assert!(matches!(
            create(&store, eid, input.clone()).await,
            Err(ServiceError::Invalid { field: "issued_on", .. })
        ));

        input.issued_on = Some(d(2026, 1, 1));
        input.due_on = Some(d(2025, 12, 31));
        assert!(matches!(
            create(&store, eid, input.clone()).await,
            Err(ServiceError::Invalid { field: "due_on", .. })
        ));

        input.due_on = None;
        input.mission_id = Uuid::new_v4();
        assert!(matches!(
            create(&store, eid, input).await,
            Err(ServiceError::Invalid { field: "mission_id", .. })
        ));
    }

    #[tokio::test]
    async fn draft_update_recomputes_and_keeps_year() {
        let (store, eid, mission_id) = setup().await;
        let f = create(&store, eid, new_facture(mission_id, Decimal::from(100), d(2026, 5, 1)))
            .await
            .unwrap();

        let patch = FacturePatch {
            amount_ht: Some(Decimal::from(200)),
            tva_rate: Some(Decimal::from(10)),
            ..Default::default()
        };
        let updated = update(&store, eid, f.id, patch).await.unwrap();
        assert_eq!(updated.amount_tva, Decimal::new(2000, 2));
        assert_eq!(updated.amount_ttc, Decimal::new(22000, 2));
        assert_eq!(updated.number, f.number);

        let patch = FacturePatch { issued_on: Some(d(2027, 1, 1)), ..Default::default() };
        assert!(matches!(
            update(&store, eid, f.id, patch).await,
            Err(ServiceError::Invalid { field: "issued_on", .. })
        ));
    }
}
