//! SQLite implementation of [`UserStore`].
//!
//! Uses [`sqlx`] with the `sqlite` feature.  Migrations are run automatically
//! on startup via [`SqliteStore::connect`].
//!
//! # Migrations path
//!
//! `sqlx::migrate!("./migrations")` resolves the path **at compile time**
//! relative to `CARGO_MANIFEST_DIR` (the crate root), so the directory is
//! embedded into the binary.  The database file location is determined at
//! runtime by the `CHATGATE_DATABASE_URL` environment variable.
//!
//! # Queries
//!
//! The `sqlx::query` (runtime-verified) form is used deliberately so that no
//! `DATABASE_URL` environment variable is needed at compile time.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{UserRecord, UserStore};

/// SQLite-backed user-record store.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://chatgate.db"` or `"sqlite::memory:"` for tests.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePool::connect(url).await?;
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

type UserRow = (String, String, String, i64, String);

fn row_to_record(row: UserRow) -> UserRecord {
    let (id, username, password_hash, is_active, created_at) = row;
    UserRecord {
        id,
        username,
        password_hash,
        is_active: is_active != 0,
        created_at: created_at
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|e| {
                tracing::warn!(raw = %created_at, error = %e, "failed to parse user created_at; using now");
                Utc::now()
            }),
    }
}

impl UserStore for SqliteStore {
    async fn create_user(&self, record: UserRecord) -> Result<(), sqlx::Error> {
        let created_at = record.created_at.to_rfc3339();
        sqlx::query(
            "INSERT INTO users (id, username, password_hash, is_active, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&record.id)
        .bind(&record.username)
        .bind(&record.password_hash)
        .bind(record.is_active as i64)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, password_hash, is_active, created_at \
             FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_record))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, password_hash, is_active, created_at \
             FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_record))
    }
}
