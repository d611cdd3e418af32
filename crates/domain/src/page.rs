//! Pagination vocabulary: page size, opaque page token, and a page of results.

use std::fmt;
use std::num::NonZeroUsize;

use serde::Serialize;

use crate::error::ValidationError;

/// Maximum number of items returned by a single `list` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(NonZeroUsize);

impl PageSize {
    /// Page size used by both HTTP adapters unless configured otherwise.
    pub const DEFAULT: Self = Self(NonZeroUsize::new(10).unwrap());

    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPageSize`] when `size` is zero.
    pub fn new(size: usize) -> Result<Self, ValidationError> {
        NonZeroUsize::new(size)
            .map(Self)
            .ok_or(ValidationError::InvalidPageSize)
    }

    #[must_use]
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Opaque continuation token handed out by `list`.
///
/// Only the application layer knows how to read one. Everyone else passes it
/// through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PageToken(String);

impl PageToken {
    /// Wrap a raw token received from a client. Empty means "no token".
    #[must_use]
    pub fn from_raw(raw: Option<String>) -> Option<Self> {
        raw.filter(|value| !value.is_empty()).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PageToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Absent on the last page.
    pub next_page_token: Option<PageToken>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.next_page_token.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_reject_zero_page_size() {
        assert_eq!(PageSize::new(0), Err(ValidationError::InvalidPageSize));
    }

    #[test]
    fn should_default_to_ten_items_per_page() {
        assert_eq!(PageSize::default().get(), 10);
    }

    #[test]
    fn should_treat_empty_raw_token_as_absent() {
        assert!(PageToken::from_raw(Some(String::new())).is_none());
        assert!(PageToken::from_raw(None).is_none());
        assert_eq!(
            PageToken::from_raw(Some("abc".to_string())).map(|t| t.to_string()),
            Some("abc".to_string())
        );
    }

    #[test]
    fn should_serialize_page_with_camel_case_keys() {
        let page = Page {
            items: vec![1, 2],
            next_page_token: Some(PageToken::from("t1".to_string())),
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "items": [1, 2], "nextPageToken": "t1" })
        );
    }

    #[test]
    fn should_serialize_absent_token_as_null() {
        let page: Page<u8> = Page {
            items: vec![],
            next_page_token: None,
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["nextPageToken"], serde_json::Value::Null);
        assert!(page.is_last());
    }
}
