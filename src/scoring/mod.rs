//! Score contexts.
//!
//! One context type per feature kind, all populated by a single walk over
//! the members of a logical feature:
//!
//! - [`CityScoreContext`], [`RoadScoreContext`], [`CloisterScoreContext`]
//!   and [`CastleScoreContext`] score on completion (or reduced at the end
//!   of the game) and implement [`CompletableScoreContext`]
//! - [`FarmScoreContext`] and [`BarnScoreContext`] score per player and
//!   optionally inside a batched pass sharing a [`FarmBatch`]
//!
//! Contexts only compute. Booking points and firing events is the
//! [`Game`](crate::game::Game)'s job.

mod barn;
mod castle;
mod city;
mod cloister;
mod context;
mod farm;
mod road;

pub use barn::BarnScoreContext;
pub use castle::CastleScoreContext;
pub use city::CityScoreContext;
pub use cloister::CloisterScoreContext;
pub use context::{walk, CompletableScoreContext, OwnerTally, ScoreContext, ScoringRules};
pub use farm::{
    CityCache, FarmBatch, FarmScoreContext, ScoredCities, BARN_CONNECTED_POINTS_PER_CITY,
    BARN_POINTS_PER_CASTLE, BARN_POINTS_PER_CITY, FARM_POINTS_PER_CITY,
};
pub use road::RoadScoreContext;
