//! Tile definitions - static tile data.
//!
//! A `TileDefinition` describes one kind of tile in its unrotated
//! orientation: which features it carries, which sides or half-sides each
//! feature reaches, and free-form attributes for expansions.
//!
//! Placed tiles and their live features are created from a definition by
//! the [`FeatureGraph`](super::FeatureGraph).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::attributes::{AttributeKey, AttributeValue, Attributes};
use super::feature::FeatureKind;
use crate::core::{DefinitionError, FarmEdge, Rotation, Side};

/// What a tile side looks like. Neighbouring sides must show the same kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    City,
    Road,
    Field,
}

/// One feature of a tile definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub kind: FeatureKind,

    /// Sides reached by a road or city. A road reaching a single side ends
    /// on this tile.
    #[serde(default)]
    pub sides: SmallVec<[Side; 4]>,

    /// Half-sides reached by a farm.
    #[serde(default)]
    pub farm_edges: SmallVec<[FarmEdge; 8]>,

    /// For farms: indices of the city features on the same tile the farm
    /// touches.
    #[serde(default)]
    pub cities: SmallVec<[usize; 4]>,

    #[serde(default)]
    pub attributes: Attributes,
}

impl FeatureSpec {
    fn bare(kind: FeatureKind) -> Self {
        Self {
            kind,
            sides: SmallVec::new(),
            farm_edges: SmallVec::new(),
            cities: SmallVec::new(),
            attributes: Attributes::default(),
        }
    }

    /// A city segment reaching `sides`.
    #[must_use]
    pub fn city(sides: &[Side]) -> Self {
        Self {
            sides: sides.iter().copied().collect(),
            ..Self::bare(FeatureKind::City)
        }
    }

    /// A road segment reaching `sides`.
    #[must_use]
    pub fn road(sides: &[Side]) -> Self {
        Self {
            sides: sides.iter().copied().collect(),
            ..Self::bare(FeatureKind::Road)
        }
    }

    /// A farm region reaching `edges`.
    #[must_use]
    pub fn farm(edges: &[FarmEdge]) -> Self {
        Self {
            farm_edges: edges.iter().copied().collect(),
            ..Self::bare(FeatureKind::Farm)
        }
    }

    /// A cloister in the middle of the tile.
    #[must_use]
    pub fn cloister() -> Self {
        Self::bare(FeatureKind::Cloister)
    }

    /// Declare the tile-local cities this farm touches (builder pattern).
    #[must_use]
    pub fn touching(mut self, cities: &[usize]) -> Self {
        self.cities = cities.iter().copied().collect();
        self
    }

    /// Add an attribute (builder pattern).
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<AttributeKey>, value: impl Into<AttributeValue>) -> Self {
        self.attributes = self.attributes.with(key, value);
        self
    }
}

/// Static tile definition.
///
/// ```
/// use rust_cloister::board::{FeatureSpec, TileDefinition};
/// use rust_cloister::core::{FarmEdge, Side};
///
/// let cap = TileDefinition::new("city-cap")
///     .with_feature(FeatureSpec::city(&[Side::North]))
///     .with_feature(
///         FeatureSpec::farm(&[
///             FarmEdge::EastNorth, FarmEdge::EastSouth,
///             FarmEdge::SouthEast, FarmEdge::SouthWest,
///             FarmEdge::WestSouth, FarmEdge::WestNorth,
///         ])
///         .touching(&[0]),
///     );
///
/// assert!(cap.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileDefinition {
    /// Unique name of this tile kind.
    pub name: String,

    pub features: Vec<FeatureSpec>,

    /// Tile-wide attributes (`volcano`, `dragon`, `festival`).
    #[serde(default)]
    pub attributes: Attributes,
}

impl TileDefinition {
    /// Create an empty tile definition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: Vec::new(),
            attributes: Attributes::default(),
        }
    }

    /// Add a feature (builder pattern).
    #[must_use]
    pub fn with_feature(mut self, feature: FeatureSpec) -> Self {
        self.features.push(feature);
        self
    }

    /// Add a tile attribute (builder pattern).
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<AttributeKey>, value: impl Into<AttributeValue>) -> Self {
        self.attributes = self.attributes.with(key, value);
        self
    }

    /// What the tile shows on `side` once rotated by `rotation`.
    #[must_use]
    pub fn edge(&self, side: Side, rotation: Rotation) -> EdgeKind {
        let reaches = |spec: &FeatureSpec| spec.sides.iter().any(|s| s.rotate(rotation) == side);
        if self.features.iter().any(|f| f.kind == FeatureKind::City && reaches(f)) {
            EdgeKind::City
        } else if self.features.iter().any(|f| f.kind == FeatureKind::Road && reaches(f)) {
            EdgeKind::Road
        } else {
            EdgeKind::Field
        }
    }

    /// Check farm-to-city references and attribute shapes used by the base
    /// game.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        for (feature, spec) in self.features.iter().enumerate() {
            for &index in &spec.cities {
                let target = self
                    .features
                    .get(index)
                    .ok_or(DefinitionError::InvalidFeatureIndex { feature, index })?;
                if !matches!(target.kind, FeatureKind::City | FeatureKind::Castle) {
                    return Err(DefinitionError::InvalidFeatureIndex { feature, index });
                }
            }
            spec.attributes.int("pennant")?;
        }
        Ok(())
    }
}
