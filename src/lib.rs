//! # rust-cloister
//!
//! Feature graph and scoring engine for tile-placement board games.
//!
//! ## Design Principles
//!
//! 1. **Union by master**: every placed feature points at the master of its
//!    logical feature. Merges relabel the smaller side, so lookups never
//!    walk a chain.
//!
//! 2. **Expansions as capabilities**: rule extensions implement one fixed
//!    hook trait and return their side effects instead of reaching into the
//!    game.
//!
//! 3. **Cheap copies**: board and scores live in `im` persistent
//!    structures, so `Game::copy` is fast enough for speculative play.
//!
//! ## Modules
//!
//! - `core`: ids, players, geometry, configuration, errors
//! - `board`: tile definitions, the feature graph, meeples
//! - `scoring`: score contexts for every feature kind
//! - `capabilities`: the capability trait, registry and implementations
//! - `events`: game events and the subscriber bus
//! - `snapshot`: element trees for capability state
//! - `game`: the orchestrator
//!
//! ```
//! use rust_cloister::{Game, GameConfig, MeepleKind, PlayerId, PointCategory, Position, Rotation};
//!
//! let mut game = Game::new(GameConfig::new(2));
//! game.start();
//!
//! game.place_tile("road-end", Position::new(0, 0), Rotation::R0).unwrap();
//! let road = game.board().tile_at(Position::new(0, 0)).unwrap().features[0];
//! game.deploy(PlayerId::new(0), MeepleKind::Follower, road).unwrap();
//!
//! let placement = game.place_tile("road-end", Position::new(0, 1), Rotation::R180).unwrap();
//! for feature in placement.completed {
//!     game.score_completed_feature(feature).unwrap();
//! }
//!
//! assert_eq!(game.score(PlayerId::new(0)).unwrap().in_category(PointCategory::Road), 2);
//! ```

pub mod core;
pub mod board;
pub mod scoring;
pub mod capabilities;
pub mod events;
pub mod snapshot;
pub mod game;

// Re-export commonly used types
pub use crate::core::{
    Error, Expansion, FarmEdge, FeatureId, GameConfig, MeepleId, PlayerId, PlayerMap, PlayerScore,
    PointCategory, Position, Rotation, Side, TileId,
};

pub use crate::board::{
    Board, Feature, FeatureGraph, FeatureKind, FeatureSpec, Meeple, MeepleKind, Placement, Tile,
    TileDefinition, TileRegistry,
};

pub use crate::scoring::{CompletableScoreContext, ScoreContext, ScoringRules};

pub use crate::capabilities::{Capability, CapabilityId, CapabilityRegistry};

pub use crate::events::{EventBus, GameEvent, SubscriberId};

pub use crate::snapshot::Element;

pub use crate::game::Game;
