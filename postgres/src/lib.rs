//! `PostgreSQL` record store for AllocateMe.
//!
//! [`PostgresStore`] implements every repository trait of
//! `allocateme-service` over a single connection pool:
//!
//! - Events and options are written in one transaction
//! - Uniqueness (join code, one email per event) is enforced by constraints
//! - Status changes are compare-and-set updates
//! - An allocation run and its status flip commit atomically
//!
//! # Example
//!
//! ```no_run
//! use allocateme_postgres::PostgresStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PostgresStore::connect("postgres://localhost/allocateme", 10).await?;
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use allocateme_core::{
    Allocation, Event, EventId, EventOption, EventStatus, OptionId, Result, SignupError,
    Submission, SubmissionId, VerificationCode,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

mod allocations;
mod events;
mod submissions;
mod verification;

/// `PostgreSQL`-backed record store.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    ///
    /// # Errors
    ///
    /// [`SignupError::Storage`] if the database cannot be reached.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| SignupError::storage(format!("Failed to connect: {e}")))?;
        Ok(Self::from_pool(pool))
    }

    /// Apply the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// [`SignupError::Storage`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| SignupError::storage(format!("Migration failed: {e}")))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

// ============================================================================
// Row mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    join_code: String,
    admin_token_digest: String,
    status: String,
    email_verification: bool,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = SignupError;

    fn try_from(row: EventRow) -> Result<Self> {
        let status: EventStatus = row
            .status
            .parse()
            .map_err(|_| SignupError::storage(format!("Unknown event status '{}'", row.status)))?;
        Ok(Self {
            id: EventId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            join_code: row.join_code,
            admin_token_digest: row.admin_token_digest,
            status,
            email_verification: row.email_verification,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OptionRow {
    id: Uuid,
    event_id: Uuid,
    name: String,
    description: Option<String>,
    capacity: i32,
    sort_order: i32,
}

impl TryFrom<OptionRow> for EventOption {
    type Error = SignupError;

    fn try_from(row: OptionRow) -> Result<Self> {
        Ok(Self {
            id: OptionId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            name: row.name,
            description: row.description,
            capacity: u32::try_from(row.capacity).map_err(SignupError::storage)?,
            sort_order: u32::try_from(row.sort_order).map_err(SignupError::storage)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    event_id: Uuid,
    email: String,
    rankings: Vec<Uuid>,
    verified: bool,
    submitted_at: DateTime<Utc>,
}

impl From<SubmissionRow> for Submission {
    fn from(row: SubmissionRow) -> Self {
        Self {
            id: SubmissionId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            email: row.email,
            rankings: row.rankings.into_iter().map(OptionId::from_uuid).collect(),
            verified: row.verified,
            submitted_at: row.submitted_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CodeRow {
    submission_id: Uuid,
    code: String,
    expires_at: DateTime<Utc>,
}

impl From<CodeRow> for VerificationCode {
    fn from(row: CodeRow) -> Self {
        Self {
            submission_id: SubmissionId::from_uuid(row.submission_id),
            code: row.code,
            expires_at: row.expires_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AllocationRow {
    event_id: Uuid,
    submission_id: Uuid,
    option_id: Option<Uuid>,
}

impl From<AllocationRow> for Allocation {
    fn from(row: AllocationRow) -> Self {
        Self {
            event_id: EventId::from_uuid(row.event_id),
            submission_id: SubmissionId::from_uuid(row.submission_id),
            option_id: row.option_id.map(OptionId::from_uuid),
        }
    }
}
