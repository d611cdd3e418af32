//! Storage port — the repository trait every backend implements.

use std::future::Future;

use userbook_domain::error::UserbookError;
use userbook_domain::id::UserId;
use userbook_domain::user::User;

use crate::cursor::Cursor;

/// Repository for persisting and querying [`User`]s.
///
/// Backends keep users in insertion order and hand out a [`Cursor`] for each
/// stored row. A cursor issued for a row stays meaningful after other rows are
/// inserted or deleted, which is what keeps page traversal stable.
pub trait UserRepository {
    /// Persist a new user. The id has already been assigned by the caller.
    ///
    /// Backends must reject a duplicate id rather than overwrite.
    fn insert(&self, user: User) -> impl Future<Output = Result<User, UserbookError>> + Send;

    /// Get a user by its unique identifier.
    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, UserbookError>> + Send;

    /// Return up to `limit` users stored strictly after `after` (or from the
    /// start when `None`), in insertion order, each paired with its cursor.
    fn list_after(
        &self,
        after: Option<Cursor>,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<(Cursor, User)>, UserbookError>> + Send;

    /// Replace every field of an existing user. Returns `None` when no user
    /// with that id exists.
    fn replace(
        &self,
        user: User,
    ) -> impl Future<Output = Result<Option<User>, UserbookError>> + Send;

    /// Delete a user. Returns `false` when no user with that id existed.
    fn delete(&self, id: UserId) -> impl Future<Output = Result<bool, UserbookError>> + Send;
}
