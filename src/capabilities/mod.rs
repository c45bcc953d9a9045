//! Pluggable rule capabilities.
//!
//! Expansions change the rules through capabilities: objects implementing
//! the fixed [`Capability`] hook trait. The game owns one instance per
//! [`CapabilityId`] for its whole life and calls the hooks at fixed points:
//!
//! | Hook              | Called when                                        |
//! |-------------------|----------------------------------------------------|
//! | `init_tile`       | a tile is drafted, before it joins the board       |
//! | `init_feature`    | each feature of a drafted tile                     |
//! | `init_player`     | `Game::start`, once per seat                       |
//! | `configure_rules` | `Game::start`, to collect [`ScoringRules`]          |
//! | `on_event`        | every fired [`GameEvent`], before bus subscribers  |
//! | `score_bonus`     | inside every `Game::score_feature`                 |
//! | `final_scoring`   | end of the game, after feature scoring             |
//!
//! Hooks never get the game itself. They read a [`GameView`] and push
//! awards and follow-up events into [`Reactions`], which the game applies
//! once the hook returns.

mod barn;
mod castle;
mod cathars;
mod dragon;
mod fairy;
mod festival;
mod pig_herd;
mod registry;
mod siege;
mod trade_goods;

pub use barn::BarnCapability;
pub use castle::{CastleCapability, CastleState};
pub use cathars::CatharsCapability;
pub use dragon::{DragonCapability, DragonMove};
pub use fairy::FairyCapability;
pub use festival::FestivalCapability;
pub use pig_herd::PigHerdCapability;
pub use registry::CapabilityRegistry;
pub use siege::SiegeCapability;
pub use trade_goods::{TradeGoodsCapability, TRADE_GOODS_POINTS};

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Feature, Meeple, Tile, TileDefinition};
use crate::core::{
    CapabilityError, DefinitionError, FeatureId, GameConfig, PlayerId, PointCategory, SnapshotError,
};
use crate::events::GameEvent;
use crate::scoring::ScoringRules;
use crate::snapshot::Element;

/// Identity of a capability implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityId {
    TradeGoods,
    Dragon,
    Fairy,
    Barn,
    Castle,
    Siege,
    Cathars,
    PigHerd,
    Festival,
}

impl CapabilityId {
    pub const ALL: [CapabilityId; 9] = [
        CapabilityId::TradeGoods,
        CapabilityId::Dragon,
        CapabilityId::Fairy,
        CapabilityId::Barn,
        CapabilityId::Castle,
        CapabilityId::Siege,
        CapabilityId::Cathars,
        CapabilityId::PigHerd,
        CapabilityId::Festival,
    ];

    /// Snapshot element name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CapabilityId::TradeGoods => "trade-goods",
            CapabilityId::Dragon => "dragon",
            CapabilityId::Fairy => "fairy",
            CapabilityId::Barn => "barn",
            CapabilityId::Castle => "castle",
            CapabilityId::Siege => "siege",
            CapabilityId::Cathars => "cathars",
            CapabilityId::PigHerd => "pig-herd",
            CapabilityId::Festival => "festival",
        }
    }

    /// Inverse of [`CapabilityId::name`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }
}

/// Read-only state handed to capability hooks.
#[derive(Clone, Copy, Debug)]
pub struct GameView<'a> {
    pub board: &'a Board,
    pub turn_player: PlayerId,
    pub player_count: usize,
    pub rules: ScoringRules,
    pub final_scoring: bool,
}

/// Points a capability wants booked.
///
/// With a `feature`, the points go through `Game::score_feature` with the
/// matching score context (a `Scored` event, bonuses apply). Without one,
/// they are booked directly and a `PointsAwarded` event is fired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Award {
    pub player: PlayerId,
    pub points: u32,
    pub category: PointCategory,
    pub feature: Option<FeatureId>,
}

/// Side effects returned by a hook.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reactions {
    pub awards: Vec<Award>,
    pub events: Vec<GameEvent>,
    /// Farms whose followers score as barn-connected and go home.
    pub barn_connected: Vec<FeatureId>,
}

impl Reactions {
    pub fn award(&mut self, award: Award) {
        self.awards.push(award);
    }

    pub fn fire(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.awards.is_empty() && self.events.is_empty() && self.barn_connected.is_empty()
    }
}

/// What `score_bonus` is asked about.
#[derive(Clone, Copy, Debug)]
pub struct ScoredFeature<'a> {
    pub feature: FeatureId,
    pub player: PlayerId,
    pub points: u32,
    pub follower: &'a Meeple,
}

/// Extra points granted on top of a feature score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bonus {
    pub points: u32,
    pub category: PointCategory,
}

/// A rule extension.
///
/// Every hook has a neutral default, so an implementation only overrides
/// what its expansion changes. Capabilities own nothing but their derived
/// state; the board and scores belong to the game.
pub trait Capability: std::fmt::Debug {
    fn id(&self) -> CapabilityId;

    /// Read tile-wide attributes from the definition. An error rejects the
    /// tile.
    fn init_tile(&self, _tile: &mut Tile, _definition: &TileDefinition) -> Result<(), DefinitionError> {
        Ok(())
    }

    /// Read feature attributes. An error rejects the tile.
    fn init_feature(&self, _feature: &mut Feature) -> Result<(), DefinitionError> {
        Ok(())
    }

    fn init_player(&mut self, _player: PlayerId) {}

    /// Switch on scoring rules this capability needs.
    fn configure_rules(&self, _rules: &mut ScoringRules) {}

    fn on_event(&mut self, _event: &GameEvent, _view: &GameView<'_>, _reactions: &mut Reactions) {}

    /// Extra points for a follower whose feature just scored.
    fn score_bonus(&self, _view: &GameView<'_>, _scored: &ScoredFeature<'_>) -> Option<Bonus> {
        None
    }

    /// End-of-game awards.
    fn final_scoring(&mut self, _view: &GameView<'_>, _reactions: &mut Reactions) {}

    /// Deep copy for `Game::copy`.
    fn clone_box(&self) -> Box<dyn Capability>;

    /// Save derived state into an element named after [`Capability::id`].
    fn save(&self) -> Element {
        Element::new(self.id().name())
    }

    /// Restore derived state saved by [`Capability::save`].
    fn load(&mut self, _element: &Element, _reactions: &mut Reactions) -> Result<(), SnapshotError> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl Clone for Box<dyn Capability> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Instantiate the capability `id` for `config`.
pub fn create(id: CapabilityId, config: &GameConfig) -> Result<Box<dyn Capability>, CapabilityError> {
    Ok(match id {
        CapabilityId::TradeGoods => Box::new(TradeGoodsCapability::new()),
        CapabilityId::Dragon => Box::new(DragonCapability::new(config.dragon_moves)?),
        CapabilityId::Fairy => Box::new(FairyCapability::new(config.fairy_points)),
        CapabilityId::Barn => Box::new(BarnCapability::new()),
        CapabilityId::Castle => Box::new(CastleCapability::new()),
        CapabilityId::Siege => Box::new(SiegeCapability),
        CapabilityId::Cathars => Box::new(CatharsCapability),
        CapabilityId::PigHerd => Box::new(PigHerdCapability),
        CapabilityId::Festival => Box::new(FestivalCapability::new()),
    })
}
