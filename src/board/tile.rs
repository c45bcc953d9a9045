//! Placed tiles and meeples.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{FeatureId, MeepleId, PlayerId, Position, Rotation, TileId};

/// Special effect printed on a tile, set by capabilities in `init_tile`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileTrigger {
    Volcano,
    Dragon,
    Festival,
}

/// A tile on the board.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub id: TileId,
    /// Name of the [`TileDefinition`](super::TileDefinition) it was built from.
    pub definition: String,
    pub position: Position,
    pub rotation: Rotation,
    pub trigger: Option<TileTrigger>,
    /// Features of this tile, in definition order.
    pub features: SmallVec<[FeatureId; 6]>,
}

impl Tile {
    /// A tile not yet on the board. The graph assigns id and features.
    #[must_use]
    pub fn new(definition: impl Into<String>, position: Position, rotation: Rotation) -> Self {
        Self {
            id: TileId::new(0),
            definition: definition.into(),
            position,
            rotation,
            trigger: None,
            features: SmallVec::new(),
        }
    }
}

/// Kind of a meeple figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeepleKind {
    Follower,
    LargeFollower,
    Pig,
    Barn,
}

impl MeepleKind {
    /// Weight in majority counts. Pigs and barns never own a feature.
    #[must_use]
    pub const fn strength(self) -> u32 {
        match self {
            MeepleKind::Follower => 1,
            MeepleKind::LargeFollower => 2,
            MeepleKind::Pig | MeepleKind::Barn => 0,
        }
    }

    /// Does this figure count as a follower?
    #[must_use]
    pub const fn is_follower(self) -> bool {
        self.strength() > 0
    }
}

/// A meeple owned by a player, deployed on at most one feature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Meeple {
    pub id: MeepleId,
    pub player: PlayerId,
    pub kind: MeepleKind,
    pub feature: Option<FeatureId>,
    pub position: Option<Position>,
}

impl Meeple {
    #[must_use]
    pub fn is_deployed(&self) -> bool {
        self.feature.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength() {
        assert_eq!(MeepleKind::Follower.strength(), 1);
        assert_eq!(MeepleKind::LargeFollower.strength(), 2);
        assert!(!MeepleKind::Pig.is_follower());
        assert!(!MeepleKind::Barn.is_follower());
    }
}
