use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, Executor, FromRow, PgPool};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::models::{
    Contact, Entreprise, Experience, Facture, FactureFilter, Mission, MissionFilter, Profile,
};
use super::{Store, StoreError, StoreResult};
use crate::config::DatabaseConfig;

const SCHEMA: &str = include_str!("schema.sql");

/// Postgres-backed store. Tenant isolation is enforced by binding
/// `entreprise_id` into every statement on tenant-owned tables.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct ProfileRow {
    entreprise_id: Uuid,
    headline: Option<String>,
    bio: Option<String>,
    skills: Vec<String>,
    experiences: Json<Vec<Experience>>,
    published: bool,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            entreprise_id: row.entreprise_id,
            headline: row.headline,
            bio: row.bio,
            skills: row.skills,
            experiences: row.experiences.0,
            published: row.published,
            updated_at: row.updated_at,
        }
    }
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::ConnectionError("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected Postgres pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the bundled schema. Every statement is idempotent.
    pub async fn migrate(&self) -> StoreResult<()> {
        self.pool.execute(SCHEMA).await?;
        info!("Database schema is up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_entreprise(&self, e: &Entreprise) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO entreprises
                (id, slug, name, email, phone, address, siret, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(e.id)
        .bind(&e.slug)
        .bind(&e.name)
        .bind(&e.email)
        .bind(&e.phone)
        .bind(&e.address)
        .bind(&e.siret)
        .bind(&e.password_hash)
        .bind(e.created_at)
        .bind(e.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_entreprise(&self, e: &Entreprise) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE entreprises
            SET name = $2, email = $3, phone = $4, address = $5, siret = $6,
                password_hash = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(e.id)
        .bind(&e.name)
        .bind(&e.email)
        .bind(&e.phone)
        .bind(&e.address)
        .bind(&e.siret)
        .bind(&e.password_hash)
        .bind(e.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("entreprise".to_string()));
        }
        Ok(())
    }

    async fn entreprise_by_id(&self, id: Uuid) -> StoreResult<Option<Entreprise>> {
        let row = sqlx::query_as::<_, Entreprise>("SELECT * FROM entreprises WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn entreprise_by_slug(&self, slug: &str) -> StoreResult<Option<Entreprise>> {
        let row = sqlx::query_as::<_, Entreprise>("SELECT * FROM entreprises WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_entreprises(&self) -> StoreResult<Vec<Entreprise>> {
        let rows = sqlx::query_as::<_, Entreprise>("SELECT * FROM entreprises ORDER BY slug")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn delete_entreprise(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        // factures restrict mission deletion, so clear them before the cascade
        sqlx::query("DELETE FROM factures WHERE entreprise_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM entreprises WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_contact(&self, c: &Contact) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO contacts
                (id, entreprise_id, name, email, phone, company, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(c.id)
        .bind(c.entreprise_id)
        .bind(&c.name)
        .bind(&c.email)
        .bind(&c.phone)
        .bind(&c.company)
        .bind(&c.notes)
        .bind(c.created_at)
        .bind(c.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_contact(&self, c: &Contact) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE contacts
            SET name = $3, email = $4, phone = $5, company = $6, notes = $7, updated_at = $8
            WHERE id = $1 AND entreprise_id = $2
            "#,
        )
        .bind(c.id)
        .bind(c.entreprise_id)
        .bind(&c.name)
        .bind(&c.email)
        .bind(&c.phone)
        .bind(&c.company)
        .bind(&c.notes)
        .bind(c.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("contact".to_string()));
        }
        Ok(())
    }

    async fn get_contact(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<Option<Contact>> {
        let row = sqlx::query_as::<_, Contact>(
            "SELECT * FROM contacts WHERE id = $1 AND entreprise_id = $2",
        )
        .bind(id)
        .bind(entreprise_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_contacts(&self, entreprise_id: Uuid) -> StoreResult<Vec<Contact>> {
        let rows = sqlx::query_as::<_, Contact>(
            "SELECT * FROM contacts WHERE entreprise_id = $1 ORDER BY lower(name)",
        )
        .bind(entreprise_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_contact(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<bool> {
        // missions.client_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND entreprise_id = $2")
            .bind(id)
            .bind(entreprise_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_mission(&self, m: &Mission) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO missions
                (id, entreprise_id, client_id, title, description, status, daily_rate,
                 start_date, end_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(m.id)
        .bind(m.entreprise_id)
        .bind(m.client_id)
        .bind(&m.title)
        .bind(&m.description)
        .bind(m.status)
        .bind(m.daily_rate)
        .bind(m.start_date)
        .bind(m.end_date)
        .bind(m.created_at)
        .bind(m.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_mission(&self, m: &Mission) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE missions
            SET client_id = $3, title = $4, description = $5, status = $6, daily_rate = $7,
                start_date = $8, end_date = $9, updated_at = $10
            WHERE id = $1 AND entreprise_id = $2
            "#,
        )
        .bind(m.id)
        .bind(m.entreprise_id)
        .bind(m.client_id)
        .bind(&m.title)
        .bind(&m.description)
        .bind(m.status)
        .bind(m.daily_rate)
        .bind(m.start_date)
        .bind(m.end_date)
        .bind(m.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("mission".to_string()));
        }
        Ok(())
    }

    async fn get_mission(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<Option<Mission>> {
        let row = sqlx::query_as::<_, Mission>(
            "SELECT * FROM missions WHERE id = $1 AND entreprise_id = $2",
        )
        .bind(id)
        .bind(entreprise_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_missions(&self, entreprise_id: Uuid, filter: &MissionFilter) -> StoreResult<Vec<Mission>> {
        let rows = sqlx::query_as::<_, Mission>(
            r#"
            SELECT * FROM missions
            WHERE entreprise_id = $1
              AND ($2::mission_status IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR client_id = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(entreprise_id)
        .bind(filter.status)
        .bind(filter.client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_mission(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM factures WHERE mission_id = $1 AND entreprise_id = $2",
        )
        .bind(id)
        .bind(entreprise_id)
        .fetch_one(&self.pool)
        .await?;
        if count > 0 {
            return Err(StoreError::Conflict("mission still has factures".to_string()));
        }

        let result = sqlx::query("DELETE FROM missions WHERE id = $1 AND entreprise_id = $2")
            .bind(id)
            .bind(entreprise_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_facture(&self, f: &Facture) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO factures
                (id, entreprise_id, mission_id, number, sequence, label, amount_ht, tva_rate,
                 amount_tva, amount_ttc, status, issued_on, due_on, paid_on, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(f.id)
        .bind(f.entreprise_id)
        .bind(f.mission_id)
        .bind(&f.number)
        .bind(f.sequence)
        .bind(&f.label)
        .bind(f.amount_ht)
        .bind(f.tva_rate)
        .bind(f.amount_tva)
        .bind(f.amount_ttc)
        .bind(f.status)
        .bind(f.issued_on)
        .bind(f.due_on)
        .bind(f.paid_on)
        .bind(f.created_at)
        .bind(f.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_facture(&self, f: &Facture) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE factures
            SET label = $3, amount_ht = $4, tva_rate = $5, amount_tva = $6, amount_ttc = $7,
                status = $8, issued_on = $9, due_on = $10, paid_on = $11, updated_at = $12
            WHERE id = $1 AND entreprise_id = $2
            "#,
        )
        .bind(f.id)
        .bind(f.entreprise_id)
        .bind(&f.label)
        .bind(f.amount_ht)
        .bind(f.tva_rate)
        .bind(f.amount_tva)
        .bind(f.amount_ttc)
        .bind(f.status)
        .bind(f.issued_on)
        .bind(f.due_on)
        .bind(f.paid_on)
        .bind(f.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("facture".to_string()));
        }
        Ok(())
    }

    async fn get_facture(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<Option<Facture>> {
        let row = sqlx::query_as::<_, Facture>(
            "SELECT * FROM factures WHERE id = $1 AND entreprise_id = $2",
        )
        .bind(id)
        .bind(entreprise_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_factures(&self, entreprise_id: Uuid, filter: &FactureFilter) -> StoreResult<Vec<Facture>> {
        let rows = sqlx::query_as::<_, Facture>(
            r#"
            SELECT * FROM factures
            WHERE entreprise_id = $1
              AND ($2::facture_status IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR mission_id = $3)
            ORDER BY issued_on DESC, sequence DESC
            "#,
        )
        .bind(entreprise_id)
        .bind(filter.status)
        .bind(filter.mission_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_facture(&self, entreprise_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM factures WHERE id = $1 AND entreprise_id = $2")
            .bind(id)
            .bind(entreprise_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn max_facture_sequence(&self, entreprise_id: Uuid, year: i32) -> StoreResult<i32> {
        let (max,): (Option<i32>,) = sqlx::query_as(
            r#"
            SELECT MAX(sequence) FROM factures
            WHERE entreprise_id = $1 AND EXTRACT(YEAR FROM issued_on)::int = $2
            "#,
        )
        .bind(entreprise_id)
        .bind(year)
        .fetch_one(&self.pool)
        .await?;
        Ok(max.unwrap_or(0))
    }

    async fn get_profile(&self, entreprise_id: Uuid) -> StoreResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE entreprise_id = $1")
            .bind(entreprise_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Profile::from))
    }

    async fn upsert_profile(&self, p: &Profile) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (entreprise_id, headline, bio, skills, experiences, published, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (entreprise_id) DO UPDATE
            SET headline = EXCLUDED.headline, bio = EXCLUDED.bio, skills = EXCLUDED.skills,
                experiences = EXCLUDED.experiences, published = EXCLUDED.published,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(p.entreprise_id)
        .bind(&p.headline)
        .bind(&p.bio)
        .bind(&p.skills)
        .bind(Json(&p.experiences))
        .bind(p.published)
        .bind(p.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
