//! Free-form attributes carried by tile definitions.
//!
//! Tile data is shared by all expansions, so tiles and their features carry
//! a bag of attributes (`pennant`, `resource`, `pig-herd`, `volcano`, ...).
//! The engine reads the base-game ones itself; capabilities read theirs in
//! `init_tile` / `init_feature`.
//!
//! ## AttributeValue Types
//!
//! - `Bool`: Markers (volcano, pig-herd)
//! - `Int`: Counts (pennants)
//! - `Text`: Names (trade resource)

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::DefinitionError;

/// Key for accessing an attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeKey(pub String);

impl AttributeKey {
    /// Create a new attribute key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl From<&str> for AttributeKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Value of an attribute.
///
/// Untagged so tile data reads naturally as JSON:
/// `{"pennant": 1, "resource": "wine", "volcano": true}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl AttributeValue {
    /// Get as integer if this is an Int value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as bool if this is a Bool value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string reference if this is a Text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Int(i64::from(v))
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

/// Attribute bag with typed, validating accessors.
///
/// Accessors return `Ok(None)` for a missing key and an error for a key
/// holding the wrong kind of value, so malformed data is rejected instead of
/// silently ignored.
///
/// ```
/// use rust_cloister::board::Attributes;
///
/// let attrs = Attributes::default()
///     .with("pennant", 1)
///     .with("resource", "wine");
///
/// assert_eq!(attrs.int("pennant").unwrap(), Some(1));
/// assert_eq!(attrs.text("resource").unwrap(), Some("wine"));
/// assert!(attrs.int("resource").is_err());
/// assert!(!attrs.flag("volcano").unwrap());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(FxHashMap<AttributeKey, AttributeValue>);

impl Attributes {
    /// Add an attribute (builder pattern).
    #[must_use]
    pub fn with(mut self, key: impl Into<AttributeKey>, value: impl Into<AttributeValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Raw lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(&AttributeKey::new(key))
    }

    /// Is the attribute present at all?
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Integer attribute.
    pub fn int(&self, key: &str) -> Result<Option<i64>, DefinitionError> {
        self.typed(key, "an integer", AttributeValue::as_int)
    }

    /// Text attribute.
    pub fn text(&self, key: &str) -> Result<Option<&str>, DefinitionError> {
        self.typed(key, "a string", AttributeValue::as_text)
    }

    /// Marker attribute: absent means `false`.
    pub fn flag(&self, key: &str) -> Result<bool, DefinitionError> {
        Ok(self.typed(key, "a boolean", AttributeValue::as_bool)?.unwrap_or(false))
    }

    fn typed<'a, T>(
        &'a self,
        key: &str,
        expected: &'static str,
        extract: impl Fn(&'a AttributeValue) -> Option<T>,
    ) -> Result<Option<T>, DefinitionError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => extract(value).map(Some).ok_or_else(|| {
                DefinitionError::InvalidAttribute {
                    key: key.to_string(),
                    expected,
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_value_kinds() {
        assert_eq!(AttributeValue::Int(5).as_int(), Some(5));
        assert_eq!(AttributeValue::Int(5).as_bool(), None);
        assert_eq!(AttributeValue::Bool(true).as_bool(), Some(true));
        assert_eq!(AttributeValue::from("cloth").as_text(), Some("cloth"));
    }

    #[test]
    fn test_missing_is_none() {
        let attrs = Attributes::default();
        assert_eq!(attrs.int("pennant").unwrap(), None);
        assert_eq!(attrs.text("resource").unwrap(), None);
        assert!(!attrs.flag("volcano").unwrap());
        assert!(!attrs.contains("volcano"));
    }

    #[test]
    fn test_wrong_kind_is_error() {
        let attrs = Attributes::default().with("volcano", "yes");
        let err = attrs.flag("volcano").unwrap_err();
        assert_eq!(err.to_string(), "attribute `volcano` must be a boolean");
    }

    #[test]
    fn test_untagged_json() {
        let attrs: Attributes =
            serde_json::from_str(r#"{"pennant": 2, "resource": "grain", "pig-herd": true}"#).unwrap();

        assert_eq!(attrs.int("pennant").unwrap(), Some(2));
        assert_eq!(attrs.text("resource").unwrap(), Some("grain"));
        assert!(attrs.flag("pig-herd").unwrap());
    }
}
