//! Page-token codec.
//!
//! A [`Cursor`] names the storage position of the last item a page returned.
//! On the wire it travels as a [`PageToken`]: the cursor serialized as JSON,
//! then base64url-encoded without padding so it survives query strings and
//! HTML links untouched.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use userbook_domain::error::ValidationError;
use userbook_domain::page::PageToken;

/// Resume point inside a backend's insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cursor {
    #[serde(rename = "after")]
    position: i64,
}

impl Cursor {
    /// Wrap a backend-assigned position. Positions are never negative.
    #[must_use]
    pub fn new(position: i64) -> Self {
        Self { position }
    }

    #[must_use]
    pub fn position(self) -> i64 {
        self.position
    }

    pub(crate) fn encode(self) -> Result<PageToken, serde_json::Error> {
        let json = serde_json::to_vec(&self)?;
        Ok(PageToken::from(URL_SAFE_NO_PAD.encode(json)))
    }

    pub(crate) fn decode(token: &PageToken) -> Result<Self, ValidationError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.as_str())
            .map_err(|_| ValidationError::InvalidPageToken)?;
        let cursor: Self =
            serde_json::from_slice(&bytes).map_err(|_| ValidationError::InvalidPageToken)?;
        if cursor.position < 0 {
            return Err(ValidationError::InvalidPageToken);
        }
        Ok(cursor)
    }
}
