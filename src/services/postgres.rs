use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CandidateKind, MatchRecord};
use crate::services::store::{MatchStore, StoreError};

/// Errors that can occur when setting up or probing the match database.
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Postgres-backed match record store.
///
/// The `uniq_pending_match` partial unique index makes the one-pending-per-
/// (person, candidate) invariant atomic at insert time; the lifecycle
/// manager's own check is only a fast path over this.
#[derive(Debug, Clone)]
pub struct PostgresMatchStore {
    pool: PgPool,
}

impl PostgresMatchStore {
    /// Connect, run migrations, and return the store.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Connect using optional settings, falling back to sane pool defaults.
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to match database");

        Self::connect(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    /// Health check for the database connection.
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

impl MatchStore for PostgresMatchStore {
    async fn insert(&self, record: MatchRecord) -> Result<MatchRecord, StoreError> {
        let query = r#"
            INSERT INTO matches (
                id, person_id, candidate_id, kind, status, match_score,
                notes, rejection_reason, created_at, updated_at, completed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#;

        sqlx::query(query)
            .bind(record.id)
            .bind(&record.person_id)
            .bind(&record.candidate_id)
            .bind(record.kind)
            .bind(record.status)
            .bind(record.score)
            .bind(&record.notes)
            .bind(&record.rejection_reason)
            .bind(record.created_at)
            .bind(record.updated_at)
            .bind(record.completed_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicatePending {
                        person_id: record.person_id.clone(),
                        candidate_id: record.candidate_id.clone(),
                    }
                } else {
                    unavailable(e)
                }
            })?;

        tracing::debug!(
            "Inserted match {} ({} -> {})",
            record.id,
            record.person_id,
            record.candidate_id
        );

        Ok(record)
    }

    async fn find_pending(
        &self,
        person_id: &str,
        candidate_id: &str,
    ) -> Result<Option<MatchRecord>, StoreError> {
        let query = r#"
            SELECT id, person_id, candidate_id, kind, status, match_score,
                   notes, rejection_reason, created_at, updated_at, completed_at
            FROM matches
            WHERE person_id = $1 AND candidate_id = $2 AND status = 'PENDING'
        "#;

        let row = sqlx::query(query)
            .bind(person_id)
            .bind(candidate_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;

        row.map(|r| row_to_record(&r)).transpose()
    }

    async fn get(&self, id: Uuid) -> Result<MatchRecord, StoreError> {
        let query = r#"
            SELECT id, person_id, candidate_id, kind, status, match_score,
                   notes, rejection_reason, created_at, updated_at, completed_at
            FROM matches
            WHERE id = $1
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;

        match row {
            Some(r) => row_to_record(&r),
            None => Err(StoreError::NotFound(format!("match {}", id))),
        }
    }

    async fn list_by_person(
        &self,
        person_id: &str,
        kind: Option<CandidateKind>,
    ) -> Result<Vec<MatchRecord>, StoreError> {
        let rows = match kind {
            Some(kind) => {
                let query = r#"
                    SELECT id, person_id, candidate_id, kind, status, match_score,
                           notes, rejection_reason, created_at, updated_at, completed_at
                    FROM matches
                    WHERE person_id = $1 AND kind = $2
                    ORDER BY created_at DESC
                "#;
                sqlx::query(query)
                    .bind(person_id)
                    .bind(kind)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let query = r#"
                    SELECT id, person_id, candidate_id, kind, status, match_score,
                           notes, rejection_reason, created_at, updated_at, completed_at
                    FROM matches
                    WHERE person_id = $1
                    ORDER BY created_at DESC
                "#;
                sqlx::query(query).bind(person_id).fetch_all(&self.pool).await
            }
        }
        .map_err(unavailable)?;

        rows.iter().map(row_to_record).collect()
    }

    async fn update(&self, record: MatchRecord) -> Result<MatchRecord, StoreError> {
        let query = r#"
            UPDATE matches
            SET status = $2, notes = $3, rejection_reason = $4,
                updated_at = $5, completed_at = $6
            WHERE id = $1
        "#;

        let result = sqlx::query(query)
            .bind(record.id)
            .bind(record.status)
            .bind(&record.notes)
            .bind(&record.rejection_reason)
            .bind(record.updated_at)
            .bind(record.completed_at)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("match {}", record.id)));
        }

        Ok(record)
    }
}

fn row_to_record(row: &PgRow) -> Result<MatchRecord, StoreError> {
    Ok(MatchRecord {
        id: row.try_get("id").map_err(unavailable)?,
        person_id: row.try_get("person_id").map_err(unavailable)?,
        candidate_id: row.try_get("candidate_id").map_err(unavailable)?,
        kind: row.try_get("kind").map_err(unavailable)?,
        status: row.try_get("status").map_err(unavailable)?,
        score: row.try_get("match_score").map_err(unavailable)?,
        notes: row.try_get("notes").map_err(unavailable)?,
        rejection_reason: row.try_get("rejection_reason").map_err(unavailable)?,
        created_at: row.try_get("created_at").map_err(unavailable)?,
        updated_at: row.try_get("updated_at").map_err(unavailable)?,
        completed_at: row.try_get("completed_at").map_err(unavailable)?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map_or(false, |code| code == "23505")
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}
