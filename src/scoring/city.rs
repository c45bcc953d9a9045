//! City scoring.

use rustc_hash::FxHashSet;

use super::context::{master_of, record_meeple, walk, CompletableScoreContext, OwnerTally, ScoreContext};
use crate::board::{Board, Feature, FeatureKind, TradeResource};
use crate::core::{FeatureId, PointCategory, ScoringError, TileId};

/// Two points per tile and per pennant; half (rounded down) when scored
/// incomplete at the end of the game.
#[derive(Clone, Debug)]
pub struct CityScoreContext {
    master: FeatureId,
    owners: OwnerTally,
    tiles: FxHashSet<TileId>,
    pennants: u32,
    resources: [u32; 3],
    besieged: bool,
    completed: bool,
}

impl CityScoreContext {
    /// Build and populate the context for the city containing `id`.
    pub fn new(board: &Board, id: FeatureId) -> Result<Self, ScoringError> {
        let master = master_of(board, id, &[FeatureKind::City])?;
        let mut context = Self {
            master,
            owners: OwnerTally::default(),
            tiles: FxHashSet::default(),
            pennants: 0,
            resources: [0; 3],
            besieged: false,
            completed: board.is_completed(master),
        };
        walk(board, &mut context);
        Ok(context)
    }

    /// Number of distinct tiles the city spans.
    #[must_use]
    pub fn tile_count(&self) -> u32 {
        self.tiles.len() as u32
    }

    #[must_use]
    pub fn pennants(&self) -> u32 {
        self.pennants
    }

    /// Trade tokens on the city, indexed by [`TradeResource::slot`].
    #[must_use]
    pub fn resources(&self) -> [u32; 3] {
        self.resources
    }

    #[must_use]
    pub fn resource(&self, resource: TradeResource) -> u32 {
        self.resources[resource.slot()]
    }

    /// Does any member carry the besieged flag?
    #[must_use]
    pub fn is_besieged(&self) -> bool {
        self.besieged
    }

    fn full_points(&self) -> u32 {
        2 * self.tile_count() + 2 * self.pennants
    }
}

impl ScoreContext for CityScoreContext {
    fn master(&self) -> FeatureId {
        self.master
    }

    fn category(&self) -> PointCategory {
        PointCategory::City
    }

    fn visit(&mut self, board: &Board, feature: &Feature) {
        self.tiles.insert(feature.tile);
        self.pennants += u32::from(feature.pennants);
        if let Some(resource) = feature.trade_resource {
            self.resources[resource.slot()] += 1;
        }
        self.besieged |= feature.besieged;
        record_meeple(&mut self.owners, board, feature);
    }

    fn owners(&self) -> &OwnerTally {
        &self.owners
    }
}

impl CompletableScoreContext for CityScoreContext {
    fn is_completed(&self) -> bool {
        self.completed
    }

    fn points(&self) -> u32 {
        if self.completed {
            self.full_points()
        } else {
            self.full_points() / 2
        }
    }
}
