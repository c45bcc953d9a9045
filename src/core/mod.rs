//! Core engine types: identifiers, players, geometry, configuration, errors.
//!
//! Everything here is expansion-agnostic. Capabilities and score contexts
//! build on these types rather than extending them.

pub mod entity;
pub mod player;
pub mod geometry;
pub mod config;
pub mod error;

pub use entity::{FeatureId, MeepleId, TileId};
pub use player::{PlayerId, PlayerMap, PlayerScore, PointCategory};
pub use geometry::{FarmEdge, Position, Rotation, Side};
pub use config::{Expansion, GameConfig};
pub use error::{
    CapabilityError, DefinitionError, DeployError, Error, PlacementError, ScoringError,
    SnapshotError,
};
