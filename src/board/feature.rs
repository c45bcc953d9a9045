//! Tile-local features.
//!
//! A [`Feature`] is one piece of a region on one tile: a city segment, a
//! road segment, a farm region, a cloister. Features on neighbouring tiles
//! are merged into logical features by the [`FeatureGraph`](super::FeatureGraph);
//! the record itself never changes its tile or geometry after placement.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::attributes::Attributes;
use crate::core::{DefinitionError, FarmEdge, FeatureId, MeepleId, PointCategory, Position, Side, TileId};

/// Feature type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Road,
    City,
    Farm,
    Cloister,
    Castle,
}

impl FeatureKind {
    /// Category points for this kind of feature are booked under.
    #[must_use]
    pub const fn point_category(self) -> PointCategory {
        match self {
            FeatureKind::Road => PointCategory::Road,
            FeatureKind::City => PointCategory::City,
            FeatureKind::Farm => PointCategory::Farm,
            FeatureKind::Cloister => PointCategory::Cloister,
            FeatureKind::Castle => PointCategory::Castle,
        }
    }

    /// Can a union of this kind close by matching connectors?
    #[must_use]
    pub const fn closes_by_edges(self) -> bool {
        matches!(self, FeatureKind::Road | FeatureKind::City)
    }
}

/// Trade goods printed on city tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeResource {
    Wine,
    Grain,
    Cloth,
}

impl TradeResource {
    pub const ALL: [TradeResource; 3] = [TradeResource::Wine, TradeResource::Grain, TradeResource::Cloth];

    /// Position in [`TradeResource::ALL`] and in per-resource count arrays.
    #[must_use]
    pub const fn slot(self) -> usize {
        self as usize
    }

    /// Lowercase name, as used in tile data and snapshots.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TradeResource::Wine => "wine",
            TradeResource::Grain => "grain",
            TradeResource::Cloth => "cloth",
        }
    }
}

impl std::str::FromStr for TradeResource {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TradeResource::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DefinitionError::UnknownResource(s.to_string()))
    }
}

/// One tile-local feature.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub tile: TileId,
    pub position: Position,
    pub kind: FeatureKind,

    /// Rotated sides reached by a road or city.
    pub sides: SmallVec<[Side; 4]>,

    /// Rotated half-sides reached by a farm.
    pub farm_edges: SmallVec<[FarmEdge; 8]>,

    /// Non-owning reference to the meeple standing here.
    pub meeple: Option<MeepleId>,

    /// Features on other tiles this one was merged with at placement time.
    pub neighbours: SmallVec<[FeatureId; 4]>,

    /// Farms only: cities (or castles) on the same tile this farm touches.
    pub adjoining_cities: SmallVec<[FeatureId; 4]>,

    pub pennants: u8,
    pub trade_resource: Option<TradeResource>,
    pub besieged: bool,
    pub pig_herd: bool,

    /// Attributes copied from the tile definition, for capabilities.
    pub attributes: Attributes,
}

impl Feature {
    /// Does this feature reach `side` of its tile?
    #[must_use]
    pub fn reaches(&self, side: Side) -> bool {
        self.sides.contains(&side)
    }

    /// Does this farm reach half-side `edge` of its tile?
    #[must_use]
    pub fn reaches_farm_edge(&self, edge: FarmEdge) -> bool {
        self.farm_edges.contains(&edge)
    }
}
