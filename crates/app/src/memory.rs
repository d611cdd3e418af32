//! In-process [`UserRepository`] backed by ordered maps.
//!
//! Suitable for development, tests, and deployments that do not need
//! durability. Positions are handed out from a monotonic counter under the
//! write lock, so concurrent inserts never share a position or an id.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::ops::Bound;
use std::sync::{PoisonError, RwLock};

use userbook_domain::error::{StorageFailure, UserbookError};
use userbook_domain::id::UserId;
use userbook_domain::user::User;

use crate::cursor::Cursor;
use crate::ports::UserRepository;

/// Errors raised by the in-memory backend.
#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("lock poisoned by a panicked writer")]
    Poisoned,

    #[error("user {0} already exists")]
    Duplicate(UserId),
}

impl<T> From<PoisonError<T>> for MemoryStoreError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

impl From<MemoryStoreError> for UserbookError {
    fn from(err: MemoryStoreError) -> Self {
        Self::Storage(StorageFailure::new(err))
    }
}

#[derive(Default)]
struct Rows {
    last_position: i64,
    by_position: BTreeMap<i64, User>,
    positions: HashMap<UserId, i64>,
}

/// `RwLock`-guarded in-memory user repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: RwLock<Rows>,
}

impl InMemoryUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_now(&self, user: User) -> Result<User, MemoryStoreError> {
        let mut rows = self.rows.write()?;
        if rows.positions.contains_key(&user.id) {
            return Err(MemoryStoreError::Duplicate(user.id));
        }
        rows.last_position += 1;
        let position = rows.last_position;
        rows.positions.insert(user.id, position);
        rows.by_position.insert(position, user.clone());
        Ok(user)
    }

    fn get_now(&self, id: UserId) -> Result<Option<User>, MemoryStoreError> {
        let rows = self.rows.read()?;
        Ok(rows
            .positions
            .get(&id)
            .and_then(|position| rows.by_position.get(position))
            .cloned())
    }

    fn list_now(
        &self,
        after: Option<Cursor>,
        limit: usize,
    ) -> Result<Vec<(Cursor, User)>, MemoryStoreError> {
        let rows = self.rows.read()?;
        let start = after.map_or(Bound::Unbounded, |cursor| Bound::Excluded(cursor.position()));
        Ok(rows
            .by_position
            .range((start, Bound::Unbounded))
            .take(limit)
            .map(|(position, user)| (Cursor::new(*position), user.clone()))
            .collect())
    }

    fn replace_now(&self, user: User) -> Result<Option<User>, MemoryStoreError> {
        let mut rows = self.rows.write()?;
        let Some(position) = rows.positions.get(&user.id).copied() else {
            return Ok(None);
        };
        rows.by_position.insert(position, user.clone());
        Ok(Some(user))
    }

    fn delete_now(&self, id: UserId) -> Result<bool, MemoryStoreError> {
        let mut rows = self.rows.write()?;
        let Some(position) = rows.positions.remove(&id) else {
            return Ok(false);
        };
        rows.by_position.remove(&position);
        Ok(true)
    }
}

impl UserRepository for InMemoryUserRepository {
    fn insert(&self, user: User) -> impl Future<Output = Result<User, UserbookError>> + Send {
        let result = self.insert_now(user).map_err(UserbookError::from);
        async { result }
    }

    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, UserbookError>> + Send {
        let result = self.get_now(id).map_err(UserbookError::from);
        async { result }
    }

    fn list_after(
        &self,
        after: Option<Cursor>,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<(Cursor, User)>, UserbookError>> + Send {
        let result = self.list_now(after, limit).map_err(UserbookError::from);
        async { result }
    }

    fn replace(
        &self,
        user: User,
    ) -> impl Future<Output = Result<Option<User>, UserbookError>> + Send {
        let result = self.replace_now(user).map_err(UserbookError::from);
        async { result }
    }

    fn delete(&self, id: UserId) -> impl Future<Output = Result<bool, UserbookError>> + Send {
        let result = self.delete_now(id).map_err(UserbookError::from);
        async { result }
    }
}
