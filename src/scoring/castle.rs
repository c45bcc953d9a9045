//! Castle scoring.
//!
//! A castle is worth whatever the first feature completed in its vicinity
//! was worth. The castle capability captures that value; this context only
//! pairs it with the castle's keeper.

use super::context::{master_of, record_meeple, walk, CompletableScoreContext, OwnerTally, ScoreContext};
use crate::board::{Board, Feature, FeatureKind};
use crate::core::{FeatureId, PointCategory, ScoringError};

#[derive(Clone, Debug)]
pub struct CastleScoreContext {
    master: FeatureId,
    owners: OwnerTally,
    captured: Option<u32>,
}

impl CastleScoreContext {
    /// `captured` is the value of the feature the castle captured, `None`
    /// if nothing completed nearby yet.
    pub fn new(board: &Board, id: FeatureId, captured: Option<u32>) -> Result<Self, ScoringError> {
        let master = master_of(board, id, &[FeatureKind::Castle])?;
        let mut context = Self {
            master,
            owners: OwnerTally::default(),
            captured,
        };
        walk(board, &mut context);
        Ok(context)
    }
}

impl ScoreContext for CastleScoreContext {
    fn master(&self) -> FeatureId {
        self.master
    }

    fn category(&self) -> PointCategory {
        PointCategory::Castle
    }

    fn visit(&mut self, board: &Board, feature: &Feature) {
        record_meeple(&mut self.owners, board, feature);
    }

    fn owners(&self) -> &OwnerTally {
        &self.owners
    }
}

impl CompletableScoreContext for CastleScoreContext {
    /// Resolved once it has captured a neighbour's value.
    fn is_completed(&self) -> bool {
        self.captured.is_some()
    }

    fn points(&self) -> u32 {
        self.captured.unwrap_or(0)
    }
}
