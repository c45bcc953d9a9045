//! Capability snapshots.
//!
//! Each capability saves its derived state into its own [`Element`], named
//! after its [`CapabilityId`](crate::capabilities::CapabilityId). The game
//! collects them under one root element, which can be encoded compactly with
//! `bincode` or readably with `serde_json`.
//!
//! ```
//! use rust_cloister::snapshot::{self, Element};
//!
//! let root = Element::new("capabilities")
//!     .with_child(Element::new("fairy").with_attr("x", 0).with_attr("y", 1));
//!
//! let bytes = snapshot::to_bytes(&root).unwrap();
//! assert_eq!(snapshot::from_bytes(&bytes).unwrap(), root);
//!
//! let json = snapshot::to_json(&root).unwrap();
//! assert_eq!(snapshot::from_json(&json).unwrap(), root);
//! ```

mod element;

pub use element::Element;

use crate::core::SnapshotError;

/// Name of the root element written by `Game::save_capabilities`.
pub const ROOT: &str = "capabilities";

/// Encode an element tree with `bincode`.
pub fn to_bytes(root: &Element) -> Result<Vec<u8>, SnapshotError> {
    Ok(bincode::serialize(root)?)
}

/// Decode an element tree written by [`to_bytes`].
pub fn from_bytes(bytes: &[u8]) -> Result<Element, SnapshotError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Encode an element tree as pretty JSON.
pub fn to_json(root: &Element) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(root)?)
}

/// Decode an element tree written by [`to_json`].
pub fn from_json(json: &str) -> Result<Element, SnapshotError> {
    Ok(serde_json::from_str(json)?)
}
