//! Snapshot element tree.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{Position, SnapshotError};

/// A named node with string attributes and ordered children.
///
/// ```
/// use rust_cloister::snapshot::Element;
///
/// let player = Element::new("player").with_attr("index", 1).with_attr("wine", 3);
/// let root = Element::new("trade-goods").with_child(player);
///
/// let child = root.children_named("player").next().unwrap();
/// assert_eq!(child.parse::<u32>("wine").unwrap(), 3);
/// assert!(child.parse::<u32>("cloth").is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Element>,
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute (builder pattern).
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Add a child (builder pattern).
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Write `x` and `y` attributes (builder pattern).
    #[must_use]
    pub fn with_position(self, position: Position) -> Self {
        self.with_attr("x", position.x).with_attr("y", position.y)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl ToString) {
        self.attributes.insert(key.into(), value.to_string());
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn has_attr(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Attribute that must be present.
    pub fn require(&self, key: &str) -> Result<&str, SnapshotError> {
        self.attr(key).ok_or_else(|| SnapshotError::MissingAttribute {
            element: self.name.clone(),
            attribute: key.to_string(),
        })
    }

    /// Parse a required attribute.
    pub fn parse<T: FromStr>(&self, key: &str) -> Result<T, SnapshotError> {
        let raw = self.require(key)?;
        raw.parse().map_err(|_| SnapshotError::InvalidAttribute {
            element: self.name.clone(),
            attribute: key.to_string(),
            value: raw.to_string(),
        })
    }

    /// Parse an optional attribute.
    pub fn parse_opt<T: FromStr>(&self, key: &str) -> Result<Option<T>, SnapshotError> {
        if self.has_attr(key) {
            self.parse(key).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read the `x` and `y` attributes.
    pub fn position(&self) -> Result<Position, SnapshotError> {
        Ok(Position::new(self.parse("x")?, self.parse("y")?))
    }

    /// First child called `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}
