//! Cloister scoring.

use super::context::{master_of, record_meeple, walk, CompletableScoreContext, OwnerTally, ScoreContext};
use crate::board::{Board, Feature, FeatureKind};
use crate::core::{FeatureId, PointCategory, Position, ScoringError};

/// One point for the cloister tile and one per occupied neighbour.
#[derive(Clone, Debug)]
pub struct CloisterScoreContext {
    master: FeatureId,
    owners: OwnerTally,
    position: Position,
    neighbours: u32,
    completed: bool,
}

impl CloisterScoreContext {
    pub fn new(board: &Board, id: FeatureId) -> Result<Self, ScoringError> {
        let master = master_of(board, id, &[FeatureKind::Cloister])?;
        let position = board.feature(master).ok_or(ScoringError::UnknownFeature(master))?.position;
        let mut context = Self {
            master,
            owners: OwnerTally::default(),
            position,
            neighbours: board.graph().occupied_around(position) as u32,
            completed: board.is_completed(master),
        };
        walk(board, &mut context);
        Ok(context)
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }
}

impl ScoreContext for CloisterScoreContext {
    fn master(&self) -> FeatureId {
        self.master
    }

    fn category(&self) -> PointCategory {
        PointCategory::Cloister
    }

    fn visit(&mut self, board: &Board, feature: &Feature) {
        record_meeple(&mut self.owners, board, feature);
    }

    fn owners(&self) -> &OwnerTally {
        &self.owners
    }
}

impl CompletableScoreContext for CloisterScoreContext {
    fn is_completed(&self) -> bool {
        self.completed
    }

    fn points(&self) -> u32 {
        1 + self.neighbours
    }
}
