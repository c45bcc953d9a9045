//! Game event types.
//!
//! Events report what the engine did: a tile was placed, a feature
//! completed, points were booked. They are delivered to capabilities first,
//! then to bus subscribers, in the order they were fired.

use serde::{Deserialize, Serialize};

use crate::board::FeatureKind;
use crate::core::{FeatureId, MeepleId, PlayerId, PointCategory, Position, TileId};

/// Something that happened during a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A tile joined the board.
    TilePlaced {
        tile: TileId,
        definition: String,
        position: Position,
        player: PlayerId,
    },

    /// A completed logical feature was scored (or found to have no owner).
    FeatureCompleted {
        master: FeatureId,
        kind: FeatureKind,
        /// Distinct tile positions of the feature.
        positions: Vec<Position>,
        points: u32,
        /// Trade tokens on a completed city, by resource slot.
        resources: [u32; 3],
        /// Player whose turn it was.
        player: PlayerId,
    },

    /// Points were booked for a feature. Fired exactly once per
    /// `score_feature` call.
    Scored {
        feature: FeatureId,
        player: PlayerId,
        points: u32,
        category: PointCategory,
        /// Human-readable breakdown, e.g. `"8 + 3"` with a fairy bonus.
        label: String,
        follower: Option<MeepleId>,
        final_scoring: bool,
    },

    /// Points were booked without a feature (trade goods, bonuses).
    PointsAwarded {
        player: PlayerId,
        points: u32,
        category: PointCategory,
    },

    PlayerActivated {
        player: PlayerId,
    },

    DragonMoved {
        position: Position,
    },

    CastleBuilt {
        castle: FeatureId,
        player: PlayerId,
    },

    MeepleDeployed {
        meeple: MeepleId,
        feature: FeatureId,
        player: PlayerId,
    },

    MeepleReturned {
        meeple: MeepleId,
        feature: FeatureId,
        player: PlayerId,
    },

    GameOver,
}

impl GameEvent {
    /// The player the event concerns, if any.
    #[must_use]
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            GameEvent::TilePlaced { player, .. }
            | GameEvent::FeatureCompleted { player, .. }
            | GameEvent::Scored { player, .. }
            | GameEvent::PointsAwarded { player, .. }
            | GameEvent::PlayerActivated { player }
            | GameEvent::CastleBuilt { player, .. }
            | GameEvent::MeepleDeployed { player, .. }
            | GameEvent::MeepleReturned { player, .. } => Some(*player),
            GameEvent::DragonMoved { .. } | GameEvent::GameOver => None,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            GameEvent::TilePlaced { .. } => "tile-placed",
            GameEvent::FeatureCompleted { .. } => "feature-completed",
            GameEvent::Scored { .. } => "scored",
            GameEvent::PointsAwarded { .. } => "points-awarded",
            GameEvent::PlayerActivated { .. } => "player-activated",
            GameEvent::DragonMoved { .. } => "dragon-moved",
            GameEvent::CastleBuilt { .. } => "castle-built",
            GameEvent::MeepleDeployed { .. } => "meeple-deployed",
            GameEvent::MeepleReturned { .. } => "meeple-returned",
            GameEvent::GameOver => "game-over",
        }
    }
}
