//! `SQLite` implementation of [`UserRepository`].
//!
//! The open field set is stored as one JSON text column; ordering and
//! cursors come from the `position` rowid.

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use userbook_app::cursor::Cursor;
use userbook_app::ports::UserRepository;
use userbook_domain::error::UserbookError;
use userbook_domain::id::UserId;
use userbook_domain::user::{Fields, User};

use crate::error::StorageError;

/// Wrapper for converting database rows into domain types without polluting
/// domain structs with database concerns.
struct Wrapper(Cursor, User);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<User> {
        value.map(|w| w.1)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let position: i64 = row.try_get("position")?;
        let id: String = row.try_get("id")?;
        let fields_json: String = row.try_get("fields")?;

        let id = UserId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let fields: Fields = serde_json::from_str(&fields_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Cursor::new(position), User { id, fields }))
    }
}

const INSERT: &str = "INSERT INTO users (id, fields) VALUES (?, ?)";
const SELECT_BY_ID: &str = "SELECT position, id, fields FROM users WHERE id = ?";
const SELECT_PAGE: &str =
    "SELECT position, id, fields FROM users WHERE position > ? ORDER BY position LIMIT ?";
const UPDATE: &str = "UPDATE users SET fields = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM users WHERE id = ?";

/// `SQLite`-backed user repository.
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    async fn insert(&self, user: User) -> Result<User, UserbookError> {
        let fields_json = serde_json::to_string(&user.fields).map_err(StorageError::from)?;

        sqlx::query(INSERT)
            .bind(user.id.to_string())
            .bind(&fields_json)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, UserbookError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn list_after(
        &self,
        after: Option<Cursor>,
        limit: usize,
    ) -> Result<Vec<(Cursor, User)>, UserbookError> {
        // AUTOINCREMENT positions start at 1.
        let after = after.map_or(0, Cursor::position);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_PAGE)
            .bind(after)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| (w.0, w.1)).collect())
    }

    async fn replace(&self, user: User) -> Result<Option<User>, UserbookError> {
        let fields_json = serde_json::to_string(&user.fields).map_err(StorageError::from)?;

        let result = sqlx::query(UPDATE)
            .bind(&fields_json)
            .bind(user.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok((result.rows_affected() > 0).then_some(user))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserbookError> {
        let result = sqlx::query(DELETE_BY_ID)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(result.rows_affected() > 0)
    }
}
