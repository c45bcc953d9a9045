//! Feature graph: merges tile-local features into logical features and
//! detects completion.
//!
//! ## Representation
//!
//! Features live in an arena indexed by [`FeatureId`]. Every feature has a
//! master pointer; all members of a logical feature share the same master,
//! so "are these two features in the same city?" is one comparison. Merging
//! relabels the members of the smaller union (union by size), which keeps
//! [`FeatureGraph::master`] O(1) and means a master only ever changes by
//! being absorbed into a larger union. Unions never split.
//!
//! ## Completion
//!
//! Each road/city union counts its open connectors: member sides facing an
//! empty position. Placing a neighbour closes the connector on both sides.
//! A union with no open connectors is completed. A cloister is completed
//! when all eight surrounding positions hold a tile. Completion is sticky.
//!
//! All collections are persistent (`im`), so cloning a graph for a
//! speculative copy of the game is cheap.
//!
//! ## Placement
//!
//! ```
//! use rust_cloister::board::{standard, FeatureGraph};
//! use rust_cloister::core::{Position, Rotation};
//!
//! let mut graph = FeatureGraph::new();
//! graph.place(&standard::city_cap(), Position::new(0, 0), Rotation::R0).unwrap();
//! let placement = graph
//!     .place(&standard::city_cap(), Position::new(0, -1), Rotation::R180)
//!     .unwrap();
//!
//! // The two caps close one small city.
//! assert_eq!(placement.completed.len(), 1);
//! assert!(graph.is_completed(placement.completed[0]));
//! ```

use im::{HashMap as ImHashMap, Vector};
use smallvec::SmallVec;
use tracing::{debug, info};

use super::definition::{EdgeKind, TileDefinition};
use super::feature::{Feature, FeatureKind};
use super::tile::Tile;
use crate::core::{DefinitionError, FeatureId, PlacementError, Position, Rotation, Side, TileId};

/// Book-keeping for one logical feature, stored under its master.
#[derive(Clone, Debug)]
struct Union {
    members: Vector<FeatureId>,
    open: u32,
    completed: bool,
}

/// Result of a successful placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub tile: TileId,
    pub position: Position,
    /// Masters of every logical feature this placement completed, in
    /// detection order and without duplicates.
    pub completed: Vec<FeatureId>,
}

/// A tile and its features built from a definition but not yet merged.
///
/// Capabilities decorate drafts (`init_tile` / `init_feature`) before they
/// are committed, so a rejected tile never touches the graph.
#[derive(Clone, Debug)]
pub struct TileDraft {
    pub tile: Tile,
    pub features: Vec<Feature>,
}

/// Arena of features with a union structure over them.
#[derive(Clone, Debug, Default)]
pub struct FeatureGraph {
    features: Vector<Feature>,
    masters: Vector<FeatureId>,
    unions: ImHashMap<FeatureId, Union>,
    tiles: Vector<Tile>,
    by_position: ImHashMap<Position, TileId>,
}

impl FeatureGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Placement ===

    /// Validate, build and merge a tile in one step.
    pub fn place(
        &mut self,
        definition: &TileDefinition,
        position: Position,
        rotation: Rotation,
    ) -> Result<Placement, PlacementError> {
        self.check(definition, position, rotation)?;
        let draft = self
            .draft(definition, position, rotation)
            .map_err(|source| PlacementError::Rejected {
                definition: definition.name.clone(),
                source,
            })?;
        Ok(self.commit(draft))
    }

    /// Check that a tile may go to `position`: the square is free, touches
    /// at least one placed tile (except the very first), and every side
    /// matches the neighbour it faces.
    pub fn check(
        &self,
        definition: &TileDefinition,
        position: Position,
        rotation: Rotation,
    ) -> Result<(), PlacementError> {
        if self.by_position.contains_key(&position) {
            return Err(PlacementError::Occupied(position));
        }
        if !self.tiles.is_empty() && !position.adjacent().any(|p| self.is_occupied(p)) {
            return Err(PlacementError::NoNeighbour(position));
        }
        for side in Side::ALL {
            if let Some(neighbour) = self.tile_at(position.step(side)) {
                if self.edge_of(neighbour, side.opposite()) != definition.edge(side, rotation) {
                    return Err(PlacementError::EdgeMismatch { position, side });
                }
            }
        }
        Ok(())
    }

    /// Build the tile and feature records for a placement without touching
    /// the graph. Ids are the ones `commit` will use.
    pub fn draft(
        &self,
        definition: &TileDefinition,
        position: Position,
        rotation: Rotation,
    ) -> Result<TileDraft, DefinitionError> {
        definition.validate()?;

        let tile_id = TileId::new(self.tiles.len() as u32);
        let base = self.features.len() as u32;
        let mut tile = Tile::new(definition.name.clone(), position, rotation);
        tile.id = tile_id;

        let mut features = Vec::with_capacity(definition.features.len());
        for (offset, spec) in definition.features.iter().enumerate() {
            let pennants = spec.attributes.int("pennant")?.unwrap_or(0);
            let pennants = u8::try_from(pennants).map_err(|_| DefinitionError::InvalidAttribute {
                key: "pennant".to_string(),
                expected: "a count between 0 and 255",
            })?;

            let id = FeatureId::new(base + offset as u32);
            tile.features.push(id);
            features.push(Feature {
                id,
                tile: tile_id,
                position,
                kind: spec.kind,
                sides: spec.sides.iter().map(|s| s.rotate(rotation)).collect(),
                farm_edges: spec.farm_edges.iter().map(|e| e.rotate(rotation)).collect(),
                meeple: None,
                neighbours: SmallVec::new(),
                adjoining_cities: spec
                    .cities
                    .iter()
                    .map(|&index| FeatureId::new(base + index as u32))
                    .collect(),
                pennants,
                trade_resource: None,
                besieged: false,
                pig_herd: false,
                attributes: spec.attributes.clone(),
            });
        }

        Ok(TileDraft { tile, features })
    }

    /// Merge a drafted tile into the graph and report completed features.
    ///
    /// The draft must come from [`FeatureGraph::draft`] on this graph with
    /// no placement in between, and must have passed [`FeatureGraph::check`].
    pub fn commit(&mut self, draft: TileDraft) -> Placement {
        let TileDraft { tile, features } = draft;
        let tile_id = tile.id;
        let position = tile.position;
        debug_assert_eq!(tile_id.index(), self.tiles.len(), "stale tile draft");
        debug_assert_eq!(
            features.first().map(|f| f.id.index()),
            features.first().map(|_| self.features.len()),
            "stale tile draft"
        );

        self.by_position.insert(position, tile_id);
        self.tiles.push_back(tile);

        let new_ids: SmallVec<[FeatureId; 6]> = features.iter().map(|f| f.id).collect();
        for feature in features {
            let open = if feature.kind.closes_by_edges() {
                feature
                    .sides
                    .iter()
                    .filter(|&&side| !self.is_occupied(position.step(side)))
                    .count() as u32
            } else {
                0
            };
            self.masters.push_back(feature.id);
            self.unions.insert(
                feature.id,
                Union {
                    members: im::vector![feature.id],
                    open,
                    completed: false,
                },
            );
            self.features.push_back(feature);
        }

        for &id in &new_ids {
            self.connect(id);
        }

        let mut completed = Vec::new();
        for &id in &new_ids {
            let master = self.master(id);
            if self.feature_kind(id).closes_by_edges() && self.try_complete(master, |u| u.open == 0) {
                completed.push(master);
            }
        }
        for around in std::iter::once(position).chain(position.surrounding()) {
            let cloisters: SmallVec<[FeatureId; 2]> = match self.tile_at(around) {
                Some(tile) => tile
                    .features
                    .iter()
                    .copied()
                    .filter(|&f| self.feature_kind(f) == FeatureKind::Cloister)
                    .collect(),
                None => continue,
            };
            for cloister in cloisters {
                let surrounded = self.occupied_around(around) == 8;
                if self.try_complete(self.master(cloister), |_| surrounded) {
                    completed.push(self.master(cloister));
                }
            }
        }

        for &master in &completed {
            info!(feature = %master, kind = ?self.feature_kind(master), "feature completed");
        }
        Placement {
            tile: tile_id,
            position,
            completed,
        }
    }

    /// Merge a freshly added feature with matching features on neighbouring
    /// tiles.
    fn connect(&mut self, id: FeatureId) {
        let (position, kind, sides, farm_edges) = {
            let f = &self.features[id.index()];
            (f.position, f.kind, f.sides.clone(), f.farm_edges.clone())
        };

        for side in sides {
            let facing = side.opposite();
            let Some(other) = self.neighbour_feature(position.step(side), |f| {
                f.kind == kind && f.reaches(facing)
            }) else {
                continue;
            };
            let other_master = self.master(other);
            if let Some(union) = self.unions.get_mut(&other_master) {
                union.open = union.open.saturating_sub(1);
            }
            self.link(id, other);
        }

        for edge in farm_edges {
            let facing = edge.opposite();
            if let Some(other) = self.neighbour_feature(position.step(edge.side()), |f| {
                f.kind == FeatureKind::Farm && f.reaches_farm_edge(facing)
            }) {
                self.link(id, other);
            }
        }
    }

    fn neighbour_feature(&self, position: Position, matches: impl Fn(&Feature) -> bool) -> Option<FeatureId> {
        let tile = self.tile_at(position)?;
        tile.features
            .iter()
            .copied()
            .find(|f| matches(&self.features[f.index()]))
    }

    /// Record adjacency both ways and union the two logical features.
    fn link(&mut self, a: FeatureId, b: FeatureId) {
        for (from, to) in [(a, b), (b, a)] {
            if let Some(feature) = self.features.get_mut(from.index()) {
                if !feature.neighbours.contains(&to) {
                    feature.neighbours.push(to);
                }
            }
        }
        self.union(a, b);
    }

    fn union(&mut self, a: FeatureId, b: FeatureId) {
        let (ma, mb) = (self.master(a), self.master(b));
        if ma == mb {
            return;
        }
        let size = |m: FeatureId| self.unions.get(&m).map_or(0, |u| u.members.len());
        let (keep, absorb) = if size(ma) >= size(mb) { (ma, mb) } else { (mb, ma) };

        let Some(absorbed) = self.unions.remove(&absorb) else {
            return;
        };
        for member in absorbed.members.iter() {
            self.masters.set(member.index(), keep);
        }
        if let Some(kept) = self.unions.get_mut(&keep) {
            kept.members.append(absorbed.members);
            kept.open += absorbed.open;
            kept.completed |= absorbed.completed;
        }
        debug!(master = %keep, absorbed = %absorb, "merged features");
    }

    /// Mark a union completed if `ready` holds and it is not completed yet.
    /// Returns whether this call completed it.
    fn try_complete(&mut self, master: FeatureId, ready: impl Fn(&Union) -> bool) -> bool {
        match self.unions.get_mut(&master) {
            Some(union) if !union.completed && ready(union) => {
                union.completed = true;
                true
            }
            _ => false,
        }
    }

    // === Queries ===

    /// Master of the logical feature containing `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this graph.
    #[must_use]
    pub fn master(&self, id: FeatureId) -> FeatureId {
        self.masters[id.index()]
    }

    /// Was `id` issued by this graph?
    #[must_use]
    pub fn contains(&self, id: FeatureId) -> bool {
        id.index() < self.features.len()
    }

    /// Look up a feature.
    #[must_use]
    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(id.index())
    }

    pub(crate) fn feature_mut(&mut self, id: FeatureId) -> Option<&mut Feature> {
        self.features.get_mut(id.index())
    }

    fn feature_kind(&self, id: FeatureId) -> FeatureKind {
        self.features[id.index()].kind
    }

    /// Is the logical feature containing `id` completed?
    #[must_use]
    pub fn is_completed(&self, id: FeatureId) -> bool {
        self.contains(id)
            && self
                .unions
                .get(&self.master(id))
                .is_some_and(|u| u.completed)
    }

    /// Unmatched connectors of the logical feature containing `id`.
    #[must_use]
    pub fn open_connectors(&self, id: FeatureId) -> u32 {
        self.unions.get(&self.master(id)).map_or(0, |u| u.open)
    }

    /// Members of the logical feature containing `id`, master's union order.
    pub fn members(&self, id: FeatureId) -> impl Iterator<Item = &Feature> + '_ {
        self.unions
            .get(&self.master(id))
            .into_iter()
            .flat_map(|u| u.members.iter())
            .map(move |m| &self.features[m.index()])
    }

    /// Masters of all logical features, in ascending id order.
    #[must_use]
    pub fn logical_features(&self) -> Vec<FeatureId> {
        let mut masters: Vec<_> = self.unions.keys().copied().collect();
        masters.sort_unstable();
        masters
    }

    /// Iterate over every tile-local feature.
    pub fn features(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.features.iter()
    }

    /// The tile at `position`, if any.
    #[must_use]
    pub fn tile_at(&self, position: Position) -> Option<&Tile> {
        self.by_position
            .get(&position)
            .and_then(|id| self.tiles.get(id.index()))
    }

    /// Look up a tile.
    #[must_use]
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.index())
    }

    /// Iterate over placed tiles in placement order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.iter()
    }

    /// Number of placed tiles.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Is there a tile at `position`?
    #[must_use]
    pub fn is_occupied(&self, position: Position) -> bool {
        self.by_position.contains_key(&position)
    }

    /// Number of the eight surrounding positions holding a tile.
    #[must_use]
    pub fn occupied_around(&self, position: Position) -> usize {
        position.surrounding().filter(|&p| self.is_occupied(p)).count()
    }

    /// Turn every member of a logical feature into `kind`.
    pub(crate) fn retag(&mut self, id: FeatureId, kind: FeatureKind) {
        let members: Vec<FeatureId> = self.members(id).map(|f| f.id).collect();
        for member in members {
            if let Some(feature) = self.features.get_mut(member.index()) {
                feature.kind = kind;
            }
        }
    }

    /// What a placed tile shows on `side`.
    fn edge_of(&self, tile: &Tile, side: Side) -> EdgeKind {
        let reaching = || {
            tile.features
                .iter()
                .map(|f| &self.features[f.index()])
                .filter(move |f| f.reaches(side))
        };
        if reaching().any(|f| matches!(f.kind, FeatureKind::City | FeatureKind::Castle)) {
            EdgeKind::City
        } else if reaching().any(|f| f.kind == FeatureKind::Road) {
            EdgeKind::Road
        } else {
            EdgeKind::Field
        }
    }
}
