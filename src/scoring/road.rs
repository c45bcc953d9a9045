//! Road scoring.

use rustc_hash::FxHashSet;

use super::context::{master_of, record_meeple, walk, CompletableScoreContext, OwnerTally, ScoreContext};
use crate::board::{Board, Feature, FeatureKind};
use crate::core::{FeatureId, PointCategory, ScoringError, TileId};

/// One point per tile, complete or not.
#[derive(Clone, Debug)]
pub struct RoadScoreContext {
    master: FeatureId,
    owners: OwnerTally,
    tiles: FxHashSet<TileId>,
    completed: bool,
}

impl RoadScoreContext {
    pub fn new(board: &Board, id: FeatureId) -> Result<Self, ScoringError> {
        let master = master_of(board, id, &[FeatureKind::Road])?;
        let mut context = Self {
            master,
            owners: OwnerTally::default(),
            tiles: FxHashSet::default(),
            completed: board.is_completed(master),
        };
        walk(board, &mut context);
        Ok(context)
    }
}

impl ScoreContext for RoadScoreContext {
    fn master(&self) -> FeatureId {
        self.master
    }

    fn category(&self) -> PointCategory {
        PointCategory::Road
    }

    fn visit(&mut self, board: &Board, feature: &Feature) {
        self.tiles.insert(feature.tile);
        record_meeple(&mut self.owners, board, feature);
    }

    fn owners(&self) -> &OwnerTally {
        &self.owners
    }
}

impl CompletableScoreContext for RoadScoreContext {
    fn is_completed(&self) -> bool {
        self.completed
    }

    fn points(&self) -> u32 {
        self.tiles.len() as u32
    }
}
