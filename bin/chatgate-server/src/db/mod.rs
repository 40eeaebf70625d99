//! Database abstraction layer.
//!
//! [`UserStore`] defines the interface for the user-record table.  The
//! default implementation is [`sqlite::SqliteStore`].  To swap to another
//! database (Postgres, MySQL, …), implement [`UserStore`] for your new
//! type and change the concrete type in [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures (stable since
//! Rust 1.75) so no extra `async-trait` crate is required.

pub mod sqlite;

use chrono::{DateTime, Utc};

/// A single row in the `users` table.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Opaque identifier (UUID string); the `sub` claim of issued tokens.
    pub id: String,
    /// Unique login handle.
    pub username: String,
    /// One-way hash of the account password.  Never leaves the server.
    pub password_hash: String,
    /// Disabled accounts keep their row but fail every login and gate check.
    pub is_active: bool,
    /// Timestamp when the account was created.
    pub created_at: DateTime<Utc>,
}

/// Trait for reading and writing user records.
pub trait UserStore: Send + Sync + 'static {
    /// Persist a new user.  Fails with a unique-constraint violation when
    /// the username is already taken.
    fn create_user(
        &self,
        record: UserRecord,
    ) -> impl std::future::Future<Output = Result<(), sqlx::Error>> + Send;

    /// Look up a user by login handle.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserRecord>, sqlx::Error>> + Send;

    /// Look up a user by identifier (the token `sub` claim).
    fn find_by_id(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserRecord>, sqlx::Error>> + Send;
}
