//! User — the single resource the service manages.
//!
//! A user is an identity plus an open, schema-less set of scalar fields.
//! Callers never pick the identity; they submit a [`UserDraft`] and the store
//! turns it into a [`User`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::id::UserId;

/// Name of the reserved identity field.
pub const ID_FIELD: &str = "id";

/// A single scalar field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
}

impl FieldValue {
    fn from_json(name: &str, value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::String(s) => Ok(Self::String(s)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_u64().map(Self::UInt))
                .or_else(|| n.as_f64().map(Self::Float))
                .ok_or_else(|| ValidationError::NonScalarField(name.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => {
                Err(ValidationError::NonScalarField(name.to_string()))
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => b.fmt(f),
            Self::Int(i) => i.fmt(f),
            Self::UInt(u) => u.fmt(f),
            Self::Float(x) => x.fmt(f),
            Self::String(s) => s.fmt(f),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Field name to value, ordered by name.
pub type Fields = BTreeMap<String, FieldValue>;

/// A stored user.
///
/// Serializes as one flat object: `{"id": "...", "name": "Ada", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(flatten)]
    pub fields: Fields,
}

/// Caller-submitted payload for create and update: everything but the id.
///
/// An `id` key in the submitted data is not stored as a field. It is kept
/// aside as a *claim* so the service can reject it on create, or check it
/// against the path id on update.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDraft {
    fields: Fields,
    claimed_id: Option<String>,
}

impl UserDraft {
    /// Build a draft from already-typed fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyFieldName`] for a blank field name.
    pub fn from_fields(fields: Fields) -> Result<Self, ValidationError> {
        let mut draft = Self {
            fields: Fields::new(),
            claimed_id: None,
        };
        for (name, value) in fields {
            draft.insert(name, value)?;
        }
        Ok(draft)
    }

    /// Build a draft from a decoded JSON object.
    ///
    /// # Errors
    ///
    /// Same as [`UserDraft::from_fields`], plus
    /// [`ValidationError::NonScalarField`] for `null`, arrays and objects.
    pub fn from_json(object: serde_json::Map<String, Value>) -> Result<Self, ValidationError> {
        let mut draft = Self {
            fields: Fields::new(),
            claimed_id: None,
        };
        for (name, value) in object {
            if name == ID_FIELD {
                draft.claimed_id = Some(match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                });
                continue;
            }
            let value = FieldValue::from_json(&name, value)?;
            draft.insert(name, value)?;
        }
        Ok(draft)
    }

    /// Build a draft from URL-encoded form pairs. Every value is a string.
    ///
    /// # Errors
    ///
    /// Same as [`UserDraft::from_fields`].
    pub fn from_form<I>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut draft = Self {
            fields: Fields::new(),
            claimed_id: None,
        };
        for (name, value) in pairs {
            if name == ID_FIELD {
                draft.claimed_id = Some(value);
                continue;
            }
            draft.insert(name, FieldValue::String(value))?;
        }
        Ok(draft)
    }

    /// The `id` the caller tried to supply, if any.
    #[must_use]
    pub fn claimed_id(&self) -> Option<&str> {
        self.claimed_id.as_deref()
    }

    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Attach a store-assigned id, discarding any claim.
    #[must_use]
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            fields: self.fields,
        }
    }

    fn insert(&mut self, name: String, value: FieldValue) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyFieldName);
        }
        self.fields.insert(name, value);
        Ok(())
    }

    /// Whether the draft carries no fields besides a possible id claim.
    ///
    /// Emptiness is checked by the service, after the id rules and the
    /// existence check.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyRecord`] when the draft has no fields.
    pub fn ensure_not_empty(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyRecord);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn should_serialize_user_as_flat_object() {
        let draft = UserDraft::from_json(object(json!({ "name": "Ada", "age": 36 }))).unwrap();
        let id = UserId::new();
        let user = draft.into_user(id);

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json, json!({ "id": id.to_string(), "name": "Ada", "age": 36 }));
    }

    #[test]
    fn should_roundtrip_user_through_serde_json() {
        let draft = UserDraft::from_json(object(json!({
            "name": "Grace",
            "admin": true,
            "score": 9.5,
        })))
        .unwrap();
        let user = draft.into_user(UserId::new());

        let text = serde_json::to_string(&user).unwrap();
        let parsed: User = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, user);
    }

    #[test]
    fn should_keep_id_aside_as_claim() {
        let draft = UserDraft::from_json(object(json!({ "id": "x", "title": "t" }))).unwrap();
        assert_eq!(draft.claimed_id(), Some("x"));
        assert!(!draft.fields().contains_key(ID_FIELD));
    }

    #[test]
    fn should_reject_nested_values() {
        let result = UserDraft::from_json(object(json!({ "tags": ["a", "b"] })));
        assert_eq!(
            result,
            Err(ValidationError::NonScalarField("tags".to_string()))
        );
    }

    #[test]
    fn should_reject_null_values() {
        let result = UserDraft::from_json(object(json!({ "nickname": null })));
        assert!(matches!(result, Err(ValidationError::NonScalarField(_))));
    }

    #[test]
    fn should_leave_emptiness_to_the_caller() {
        let draft = UserDraft::from_json(serde_json::Map::new()).unwrap();
        assert!(draft.is_empty());
        assert_eq!(draft.ensure_not_empty(), Err(ValidationError::EmptyRecord));
    }

    #[test]
    fn should_keep_claim_of_record_holding_only_an_id() {
        let draft = UserDraft::from_json(object(json!({ "id": "x" }))).unwrap();
        assert!(draft.is_empty());
        assert_eq!(draft.claimed_id(), Some("x"));
    }

    #[test]
    fn should_keep_integers_above_i64_max_exact() {
        let draft = UserDraft::from_json(object(json!({ "big": u64::MAX }))).unwrap();
        assert_eq!(draft.fields()["big"], FieldValue::UInt(u64::MAX));

        let user = draft.into_user(UserId::new());
        let text = serde_json::to_string(&user).unwrap();
        assert!(text.contains("18446744073709551615"));

        let parsed: User = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.fields["big"], FieldValue::UInt(u64::MAX));
        assert_eq!(parsed, user);
    }

    #[test]
    fn should_keep_small_integers_signed() {
        let draft = UserDraft::from_json(object(json!({ "n": -3, "m": 7 }))).unwrap();
        assert_eq!(draft.fields()["n"], FieldValue::Int(-3));
        assert_eq!(draft.fields()["m"], FieldValue::Int(7));
    }

    #[test]
    fn should_reject_blank_field_name() {
        let result = UserDraft::from_form(vec![(" ".to_string(), "v".to_string())]);
        assert_eq!(result, Err(ValidationError::EmptyFieldName));
    }

    #[test]
    fn should_read_form_values_as_strings() {
        let draft = UserDraft::from_form(vec![
            ("name".to_string(), "Ada".to_string()),
            ("age".to_string(), "36".to_string()),
        ])
        .unwrap();
        assert_eq!(draft.fields()["age"], FieldValue::String("36".to_string()));
    }

    #[test]
    fn should_display_scalar_values_plainly() {
        assert_eq!(FieldValue::from("Ada").to_string(), "Ada");
        assert_eq!(FieldValue::from(42_i64).to_string(), "42");
        assert_eq!(FieldValue::from(true).to_string(), "true");
    }
}
