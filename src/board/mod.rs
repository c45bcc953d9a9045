//! Tiles, features and the board they are placed on.
//!
//! - [`TileDefinition`] / [`FeatureSpec`]: static tile data, loaded into a
//!   [`TileRegistry`]
//! - [`FeatureGraph`]: placed tiles, their features, and the union structure
//!   that merges features into logical features
//! - [`Board`]: the graph plus the meeples standing on it

mod attributes;
mod definition;
mod feature;
mod graph;
mod registry;
pub mod standard;
mod tile;

pub use attributes::{AttributeKey, AttributeValue, Attributes};
pub use definition::{EdgeKind, FeatureSpec, TileDefinition};
pub use feature::{Feature, FeatureKind, TradeResource};
pub use graph::{FeatureGraph, Placement, TileDraft};
pub use registry::TileRegistry;
pub use tile::{Meeple, MeepleKind, Tile, TileTrigger};

use im::Vector;
use tracing::debug;

use crate::core::{DeployError, FeatureId, MeepleId, PlayerId, Position};

/// The feature graph and every meeple of the game.
///
/// Meeples are created on demand; supply limits are the caller's business.
/// Cloning is cheap (persistent collections throughout).
#[derive(Clone, Debug, Default)]
pub struct Board {
    graph: FeatureGraph,
    meeples: Vector<Meeple>,
}

impl Board {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn graph(&self) -> &FeatureGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut FeatureGraph {
        &mut self.graph
    }

    // === Graph shortcuts ===

    #[must_use]
    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.graph.feature(id)
    }

    /// See [`FeatureGraph::master`].
    #[must_use]
    pub fn master(&self, id: FeatureId) -> FeatureId {
        self.graph.master(id)
    }

    pub fn members(&self, id: FeatureId) -> impl Iterator<Item = &Feature> + '_ {
        self.graph.members(id)
    }

    #[must_use]
    pub fn is_completed(&self, id: FeatureId) -> bool {
        self.graph.is_completed(id)
    }

    #[must_use]
    pub fn tile_at(&self, position: Position) -> Option<&Tile> {
        self.graph.tile_at(position)
    }

    // === Meeples ===

    /// Create an undeployed meeple for `player`.
    pub fn add_meeple(&mut self, player: PlayerId, kind: MeepleKind) -> MeepleId {
        let id = MeepleId::new(self.meeples.len() as u32);
        self.meeples.push_back(Meeple {
            id,
            player,
            kind,
            feature: None,
            position: None,
        });
        id
    }

    #[must_use]
    pub fn meeple(&self, id: MeepleId) -> Option<&Meeple> {
        self.meeples.get(id.index())
    }

    /// All meeples, deployed or not.
    pub fn meeples(&self) -> impl Iterator<Item = &Meeple> + '_ {
        self.meeples.iter()
    }

    /// Meeples standing on any member of the logical feature containing `id`.
    pub fn meeples_on(&self, id: FeatureId) -> impl Iterator<Item = &Meeple> + '_ {
        self.members(id)
            .filter_map(|f| f.meeple)
            .filter_map(|m| self.meeple(m))
    }

    /// Stand `meeple` on tile-local feature `feature`, leaving its previous
    /// spot if it had one.
    pub fn deploy(&mut self, meeple: MeepleId, feature: FeatureId) -> Result<(), DeployError> {
        let target = self.graph.feature(feature).ok_or(DeployError::UnknownFeature(feature))?;
        match target.meeple {
            Some(existing) if existing == meeple => return Ok(()),
            Some(_) => return Err(DeployError::Occupied(feature)),
            None => {}
        }
        let position = target.position;
        if self.meeple(meeple).is_none() {
            return Err(DeployError::UnknownMeeple(meeple));
        }
        if self.meeple(meeple).is_some_and(Meeple::is_deployed) {
            self.undeploy(meeple)?;
        }

        if let Some(target) = self.graph.feature_mut(feature) {
            target.meeple = Some(meeple);
        }
        if let Some(m) = self.meeples.get_mut(meeple.index()) {
            m.feature = Some(feature);
            m.position = Some(position);
        }
        debug!(%meeple, %feature, %position, "meeple deployed");
        Ok(())
    }

    /// Take `meeple` back to its owner's supply. Returns the feature it
    /// stood on.
    pub fn undeploy(&mut self, meeple: MeepleId) -> Result<FeatureId, DeployError> {
        let m = self.meeples.get_mut(meeple.index()).ok_or(DeployError::UnknownMeeple(meeple))?;
        let feature = m.feature.take().ok_or(DeployError::NotDeployed(meeple))?;
        m.position = None;
        if let Some(f) = self.graph.feature_mut(feature) {
            f.meeple = None;
        }
        debug!(%meeple, %feature, "meeple returned");
        Ok(feature)
    }
}
