//! PostgreSQL implementation of CycleStore.
//!
//! One row per cycle in `evaluation_cycles`. Batches run inside a single
//! transaction; a unique index on `name` and a partial unique index on
//! `status = 'OPEN'` back the name and single-active invariants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use crate::domain::cycle::{Cycle, CycleName, CyclePhase, CycleSchedule, CycleStatus};
use crate::domain::foundation::{CycleId, DomainError, ErrorCode, Timestamp};
use crate::ports::{CommitOutcome, CycleBatch, CycleMutation, CycleStore};

const NAME_CONSTRAINT: &str = "evaluation_cycles_name_key";
const SINGLE_OPEN_CONSTRAINT: &str = "evaluation_cycles_single_open";

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, status, phase, start_date, end_date,
           assessment_deadline, manager_deadline, equalization_deadline,
           version, created_at, updated_at
    FROM evaluation_cycles
"#;

/// PostgreSQL implementation of CycleStore.
#[derive(Clone)]
pub struct PostgresCycleStore {
    pool: PgPool,
}

impl PostgresCycleStore {
    /// Creates a new PostgresCycleStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CycleStore for PostgresCycleStore {
    async fn find_by_id(&self, id: &CycleId) -> Result<Option<Cycle>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch cycle", e))?;

        row.map(row_to_cycle).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Cycle>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE name = $1", SELECT_COLUMNS))
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch cycle by name", e))?;

        row.map(row_to_cycle).transpose()
    }

    async fn find_by_status(&self, status: CycleStatus) -> Result<Vec<Cycle>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} WHERE status = $1 ORDER BY created_at ASC, id ASC",
            SELECT_COLUMNS
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch cycles by status", e))?;

        rows.into_iter().map(row_to_cycle).collect()
    }

    async fn list(&self) -> Result<Vec<Cycle>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} ORDER BY start_date DESC NULLS LAST, created_at DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list cycles", e))?;

        rows.into_iter().map(row_to_cycle).collect()
    }

    async fn commit(&self, batch: CycleBatch) -> Result<CommitOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;
        let mut outcome = CommitOutcome::default();

        for mutation in batch.into_mutations() {
            match mutation {
                CycleMutation::Insert(cycle) => insert_cycle(&mut tx, &cycle).await?,
                CycleMutation::Update(cycle) => update_cycle(&mut tx, &cycle).await?,
                CycleMutation::CloseOpenExcept { keep, closed_at } => {
                    let demoted = close_open_except(&mut tx, &keep, &closed_at).await?;
                    outcome.demoted.extend(demoted);
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))?;

        Ok(outcome)
    }
}

async fn insert_cycle(tx: &mut Transaction<'_, Postgres>, cycle: &Cycle) -> Result<(), DomainError> {
    let schedule = cycle.schedule();
    sqlx::query(
        r#"
        INSERT INTO evaluation_cycles (
            id, name, status, phase, start_date, end_date,
            assessment_deadline, manager_deadline, equalization_deadline,
            version, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(cycle.id().as_uuid())
    .bind(cycle.name().as_str())
    .bind(cycle.status().as_str())
    .bind(cycle.phase().as_str())
    .bind(opt_datetime(schedule.start_date))
    .bind(opt_datetime(schedule.end_date))
    .bind(opt_datetime(schedule.assessment_deadline))
    .bind(opt_datetime(schedule.manager_deadline))
    .bind(opt_datetime(schedule.equalization_deadline))
    .bind(version_to_db(cycle.version())?)
    .bind(cycle.created_at().as_datetime())
    .bind(cycle.updated_at().as_datetime())
    .execute(&mut **tx)
    .await
    .map_err(|e| map_write_error(e, cycle, "Failed to insert cycle"))?;

    Ok(())
}

async fn update_cycle(tx: &mut Transaction<'_, Postgres>, cycle: &Cycle) -> Result<(), DomainError> {
    let schedule = cycle.schedule();
    let result = sqlx::query(
        r#"
        UPDATE evaluation_cycles SET
            name = $3,
            status = $4,
            phase = $5,
            start_date = $6,
            end_date = $7,
            assessment_deadline = $8,
            manager_deadline = $9,
            equalization_deadline = $10,
            updated_at = $11,
            version = version + 1
        WHERE id = $1 AND version = $2
        "#,
    )
    .bind(cycle.id().as_uuid())
    .bind(version_to_db(cycle.version())?)
    .bind(cycle.name().as_str())
    .bind(cycle.status().as_str())
    .bind(cycle.phase().as_str())
    .bind(opt_datetime(schedule.start_date))
    .bind(opt_datetime(schedule.end_date))
    .bind(opt_datetime(schedule.assessment_deadline))
    .bind(opt_datetime(schedule.manager_deadline))
    .bind(opt_datetime(schedule.equalization_deadline))
    .bind(cycle.updated_at().as_datetime())
    .execute(&mut **tx)
    .await
    .map_err(|e| map_write_error(e, cycle, "Failed to update cycle"))?;

    if result.rows_affected() == 1 {
        return Ok(());
    }

    let current: Option<(i64,)> =
        sqlx::query_as("SELECT version FROM evaluation_cycles WHERE id = $1")
            .bind(cycle.id().as_uuid())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| DomainError::database("Failed to read cycle version", e))?;

    match current {
        None => Err(DomainError::new(
            ErrorCode::CycleNotFound,
            format!("Cycle not found: {}", cycle.id()),
        )),
        Some((actual,)) => Err(DomainError::new(
            ErrorCode::ConcurrentModification,
            format!("Cycle {} was modified concurrently", cycle.id()),
        )
        .with_detail("expected_version", cycle.version().to_string())
        .with_detail("actual_version", actual.to_string())),
    }
}

async fn close_open_except(
    tx: &mut Transaction<'_, Postgres>,
    keep: &CycleId,
    closed_at: &Timestamp,
) -> Result<Vec<CycleId>, DomainError> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        r#"
        UPDATE evaluation_cycles SET
            status = 'CLOSED',
            updated_at = $2,
            version = version + 1
        WHERE status = 'OPEN' AND id <> $1
        RETURNING id
        "#,
    )
    .bind(keep.as_uuid())
    .bind(closed_at.as_datetime())
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| DomainError::database("Failed to close open cycles", e))?;

    Ok(rows.into_iter().map(|(id,)| CycleId::from_uuid(id)).collect())
}

fn map_write_error(err: sqlx::Error, cycle: &Cycle, context: &str) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.constraint() {
            Some(NAME_CONSTRAINT) => {
                return DomainError::new(
                    ErrorCode::DuplicateCycleName,
                    format!("Cycle name already in use: {}", cycle.name()),
                )
                .with_detail("name", cycle.name().as_str());
            }
            Some(SINGLE_OPEN_CONSTRAINT) => {
                return DomainError::new(
                    ErrorCode::InvariantViolation,
                    format!("Opening cycle {} would leave two OPEN cycles", cycle.id()),
                );
            }
            _ => {}
        }
    }
    DomainError::database(context, err)
}

fn opt_datetime(ts: Option<Timestamp>) -> Option<DateTime<Utc>> {
    ts.map(|t| *t.as_datetime())
}

fn opt_timestamp(dt: Option<DateTime<Utc>>) -> Option<Timestamp> {
    dt.map(Timestamp::from_datetime)
}

fn version_to_db(version: u64) -> Result<i64, DomainError> {
    i64::try_from(version).map_err(|_| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Cycle version {} out of range", version),
        )
    })
}

fn row_to_cycle(row: PgRow) -> Result<Cycle, DomainError> {
    let id: Uuid = row.get("id");
    let name: String = row.get("name");
    let status: String = row.get("status");
    let phase: String = row.get("phase");
    let version: i64 = row.get("version");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    let schedule = CycleSchedule {
        start_date: opt_timestamp(row.get("start_date")),
        end_date: opt_timestamp(row.get("end_date")),
        assessment_deadline: opt_timestamp(row.get("assessment_deadline")),
        manager_deadline: opt_timestamp(row.get("manager_deadline")),
        equalization_deadline: opt_timestamp(row.get("equalization_deadline")),
    };

    let corrupt = |field: &str, detail: String| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Corrupt cycle row {}: {}", id, detail),
        )
        .with_detail("field", field)
    };

    Ok(Cycle::reconstitute(
        CycleId::from_uuid(id),
        CycleName::new(name).map_err(|e| corrupt("name", e.to_string()))?,
        status
            .parse::<CycleStatus>()
            .map_err(|e| corrupt("status", e.to_string()))?,
        phase
            .parse::<CyclePhase>()
            .map_err(|e| corrupt("phase", e.to_string()))?,
        schedule,
        u64::try_from(version).map_err(|_| corrupt("version", format!("negative version {}", version)))?,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}
