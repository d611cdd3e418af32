//! Common error types used across the workspace.
//!
//! Every layer converts its own failures into [`UserbookError`] via `#[from]`.
//! [`UserbookError::report`] is the single normalization step: it produces the
//! transport-neutral [`ErrorReport`] that both HTTP presentations are built from.

use serde::Serialize;

/// Top-level error returned by every store operation.
#[derive(Debug, thiserror::Error)]
pub enum UserbookError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Storage(#[from] StorageFailure),
}

/// Malformed or disallowed input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("id is assigned by the store and cannot be supplied")]
    IdNotAssignable,

    #[error("id {claimed} does not match {id}")]
    IdMismatch { id: String, claimed: String },

    #[error("record has no fields")]
    EmptyRecord,

    #[error("field name cannot be empty")]
    EmptyFieldName,

    #[error("field {0} must be a string, number or boolean")]
    NonScalarField(String),

    #[error("page size must be positive")]
    InvalidPageSize,

    #[error("page token is not valid")]
    InvalidPageToken,

    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

impl ValidationError {
    /// Stable machine-readable code for this validation failure.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::IdNotAssignable => "id_not_assignable",
            Self::IdMismatch { .. } => "id_mismatch",
            Self::EmptyRecord => "empty_record",
            Self::EmptyFieldName => "empty_field_name",
            Self::NonScalarField(_) => "non_scalar_field",
            Self::InvalidPageSize => "invalid_page_size",
            Self::InvalidPageToken => "invalid_page_token",
            Self::MalformedBody(_) => "malformed_body",
        }
    }
}

/// A lookup by id found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// The backing engine failed.
///
/// The source is boxed so the domain never names a driver type. Backends that
/// know a native error code (e.g. an `SQLite` extended result code) attach it
/// with [`StorageFailure::with_code`].
#[derive(Debug, thiserror::Error)]
#[error("storage error")]
pub struct StorageFailure {
    code: Option<String>,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl StorageFailure {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            code: None,
            source: source.into(),
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

/// Coarse category of a [`UserbookError`], used for status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Storage,
}

/// Normalized, transport-neutral shape of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub message: String,
    pub internal_code: Option<String>,
}

impl UserbookError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    #[must_use]
    pub fn internal_code(&self) -> Option<&str> {
        match self {
            Self::Validation(err) => Some(err.code()),
            Self::NotFound(_) => Some("not_found"),
            Self::Storage(err) => err.code(),
        }
    }

    /// Normalize into an [`ErrorReport`].
    ///
    /// Storage failures only expose their generic message; the boxed source
    /// stays on the error for logging.
    #[must_use]
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            message: self.to_string(),
            internal_code: self.internal_code().map(str::to_owned),
        }
    }
}
