//! Barn scoring.

use super::context::{ScoreContext, OwnerTally, ScoringRules};
use super::farm::{CityCache, FarmScoreContext, ScoredCities};
use crate::board::{Board, Feature};
use crate::core::{FeatureId, PlayerId, PointCategory, ScoringError};

/// A farm seen from its barns: owners are the barn holders, points are
/// [`FarmScoreContext::barn_points`].
#[derive(Clone, Debug)]
pub struct BarnScoreContext {
    farm: FarmScoreContext,
}

impl BarnScoreContext {
    pub fn new(board: &Board, id: FeatureId, rules: ScoringRules) -> Result<Self, ScoringError> {
        Ok(Self {
            farm: FarmScoreContext::new(board, id, rules)?,
        })
    }

    pub fn with_cache(board: &Board, id: FeatureId, rules: ScoringRules, cache: CityCache) -> Result<Self, ScoringError> {
        Ok(Self {
            farm: FarmScoreContext::with_cache(board, id, rules, cache)?,
        })
    }

    #[must_use]
    pub fn farm(&self) -> &FarmScoreContext {
        &self.farm
    }

    #[must_use]
    pub fn into_cache(self) -> CityCache {
        self.farm.into_cache()
    }

    #[must_use]
    pub fn points(&self, player: PlayerId, scored: Option<&mut ScoredCities>) -> u32 {
        self.farm.barn_points(player, scored)
    }
}

impl ScoreContext for BarnScoreContext {
    fn master(&self) -> FeatureId {
        self.farm.master()
    }

    fn category(&self) -> PointCategory {
        PointCategory::Barn
    }

    fn visit(&mut self, board: &Board, feature: &Feature) {
        self.farm.visit(board, feature);
    }

    fn owners(&self) -> &OwnerTally {
        self.farm.barns()
    }
}
