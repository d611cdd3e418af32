//! User service — the resource contract shared by every presentation.

use std::str::FromStr;

use userbook_domain::error::{NotFoundError, StorageFailure, UserbookError, ValidationError};
use userbook_domain::id::UserId;
use userbook_domain::page::{Page, PageSize, PageToken};
use userbook_domain::user::{User, UserDraft};

use crate::cursor::Cursor;
use crate::ports::UserRepository;

/// Application service for user CRUD and paginated listing.
///
/// This is the only place identities are assigned and page tokens are
/// encoded or decoded.
pub struct UserService<R> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Return at most `size` users, resuming after `token` when given.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPageToken`] for a token this service
    /// did not produce, or a storage error from the repository.
    pub async fn list(
        &self,
        size: PageSize,
        token: Option<&PageToken>,
    ) -> Result<Page<User>, UserbookError> {
        let after = token.map(Cursor::decode).transpose()?;
        let limit = size.get();

        // One extra row tells us whether another page exists without a
        // trailing empty page.
        let mut rows = self
            .repo
            .list_after(after, limit.saturating_add(1))
            .await?;

        let next_page_token = if rows.len() > limit {
            rows.truncate(limit);
            rows.last()
                .map(|(cursor, _)| cursor.encode())
                .transpose()
                .map_err(StorageFailure::new)?
        } else {
            None
        };

        Ok(Page {
            items: rows.into_iter().map(|(_, user)| user).collect(),
            next_page_token,
        })
    }

    /// Assign a fresh id to `draft` and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IdNotAssignable`] when the draft carries an
    /// id, [`ValidationError::EmptyRecord`] when it has no fields, or a
    /// storage error from the repository.
    pub async fn create(&self, draft: UserDraft) -> Result<User, UserbookError> {
        if draft.claimed_id().is_some() {
            return Err(ValidationError::IdNotAssignable.into());
        }
        draft.ensure_not_empty()?;
        let created = self.repo.insert(draft.into_user(UserId::new())).await?;
        tracing::info!(id = %created.id, fields = created.fields.len(), "user created");
        Ok(created)
    }

    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`UserbookError::NotFound`] when no user with `id` exists,
    /// or a storage error from the repository.
    pub async fn read(&self, id: &str) -> Result<User, UserbookError> {
        let user_id = parse_id(id)?;
        self.repo
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Replace every non-id field of an existing user with `draft`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IdMismatch`] when the draft claims a
    /// different id, [`UserbookError::NotFound`] when no user with `id`
    /// exists, [`ValidationError::EmptyRecord`] when an existing user would be
    /// left without fields, or a storage error from the repository.
    pub async fn update(&self, id: &str, draft: UserDraft) -> Result<User, UserbookError> {
        let user_id = parse_id(id)?;
        if let Some(claimed) = draft.claimed_id()
            && UserId::from_str(claimed).ok() != Some(user_id)
        {
            return Err(ValidationError::IdMismatch {
                id: user_id.to_string(),
                claimed: claimed.to_string(),
            }
            .into());
        }
        if draft.is_empty() {
            if self.repo.get_by_id(user_id).await?.is_none() {
                return Err(not_found(id));
            }
            return Err(ValidationError::EmptyRecord.into());
        }
        let updated = self
            .repo
            .replace(draft.into_user(user_id))
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!(id = %updated.id, fields = updated.fields.len(), "user replaced");
        Ok(updated)
    }

    /// Delete a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`UserbookError::NotFound`] when no user with `id` exists,
    /// including when it was already deleted.
    pub async fn delete(&self, id: &str) -> Result<(), UserbookError> {
        let user_id = parse_id(id)?;
        if !self.repo.delete(user_id).await? {
            return Err(not_found(id));
        }
        tracing::info!(id = %user_id, "user deleted");
        Ok(())
    }
}

/// An id that does not parse cannot name a stored user.
fn parse_id(id: &str) -> Result<UserId, UserbookError> {
    UserId::from_str(id).map_err(|_| not_found(id))
}

fn not_found(id: &str) -> UserbookError {
    tracing::debug!(id, "user not found");
    NotFoundError {
        entity: "User",
        id: id.to_string(),
    }
    .into()
}
