//! Stable identifiers for board entities.
//!
//! Tiles, tile-local features and meeples live in arenas owned by the
//! [`Board`](crate::board::Board). They are referenced everywhere by index
//! rather than by pointer, so the cyclic adjacency between features never
//! turns into a reference cycle.
//!
//! ## Usage
//!
//! ```
//! use rust_cloister::core::FeatureId;
//!
//! let a = FeatureId::new(3);
//! let b = FeatureId::from(3u32);
//!
//! assert_eq!(a, b);
//! assert_eq!(a.index(), 3);
//! assert_eq!(format!("{}", a), "Feature(3)");
//! ```

use serde::{Deserialize, Serialize};

/// Identifier of one tile-local feature in the feature arena.
///
/// Two features belong to the same logical feature iff their masters are
/// equal; see [`FeatureGraph::master`](crate::board::FeatureGraph::master).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeatureId(pub u32);

impl FeatureId {
    /// Create a new feature ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Arena index of this feature.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for FeatureId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Feature({})", self.0)
    }
}

/// Identifier of a placed tile, allocated in placement order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u32);

impl TileId {
    /// Create a new tile ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Arena index of this tile.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tile({})", self.0)
    }
}

/// Identifier of a meeple (follower, pig, barn, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MeepleId(pub u32);

impl MeepleId {
    /// Create a new meeple ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Arena index of this meeple.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for MeepleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Meeple({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_id_index() {
        assert_eq!(FeatureId::new(0).index(), 0);
        assert_eq!(FeatureId::new(17).index(), 17);
        assert_eq!(FeatureId::from(5).raw(), 5);
    }

    #[test]
    fn test_ordering() {
        assert!(FeatureId::new(1) < FeatureId::new(2));
        assert!(TileId::new(0) < TileId::new(9));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", FeatureId(42)), "Feature(42)");
        assert_eq!(format!("{}", TileId(3)), "Tile(3)");
        assert_eq!(format!("{}", MeepleId(7)), "Meeple(7)");
    }

    #[test]
    fn test_serialization() {
        let id = MeepleId(123);
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: MeepleId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
