//! Game configuration types.
//!
//! A match is configured up front by providing:
//! - the number of players
//! - the [`Expansion`]s in play, each of which pulls in one or more
//!   capabilities
//! - extra capabilities requested directly (house rules, tests)
//! - tunables read by individual capabilities
//!
//! `Game::start` turns the configuration into live capability instances.

use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

use crate::capabilities::CapabilityId;

/// Optional expansion sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Expansion {
    Basic,
    TradersAndBuilders,
    PrincessAndDragon,
    AbbeyAndMayor,
    BridgesCastlesAndBazaars,
    Cathars,
    Besieged,
    Festival,
}

impl Expansion {
    /// Capabilities implementing this expansion's rules.
    ///
    /// Several expansions may share an implementation (`Cathars` and
    /// `Besieged` both need siege tracking); the game creates it once.
    #[must_use]
    pub fn capabilities(self) -> &'static [CapabilityId] {
        match self {
            Expansion::Basic => &[],
            Expansion::TradersAndBuilders => &[CapabilityId::TradeGoods, CapabilityId::PigHerd],
            Expansion::PrincessAndDragon => &[CapabilityId::Dragon, CapabilityId::Fairy],
            Expansion::AbbeyAndMayor => &[CapabilityId::Barn],
            Expansion::BridgesCastlesAndBazaars => &[CapabilityId::Castle],
            Expansion::Cathars => &[CapabilityId::Siege, CapabilityId::Cathars],
            Expansion::Besieged => &[CapabilityId::Siege],
            Expansion::Festival => &[CapabilityId::Festival],
        }
    }
}

/// Complete configuration of one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of seated players (1-255).
    #[serde(deserialize_with = "seated_players")]
    pub player_count: usize,

    /// Expansions in play.
    #[serde(default)]
    pub expansions: Vec<Expansion>,

    /// Capabilities requested in addition to those of the expansions.
    #[serde(default)]
    pub capabilities: Vec<CapabilityId>,

    /// Dragon moves per dragon tile.
    #[serde(default = "default_dragon_moves")]
    pub dragon_moves: u32,

    /// Bonus for a follower standing with the fairy when its feature scores.
    #[serde(default = "default_fairy_points")]
    pub fairy_points: u32,
}

fn seated_players<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let count = usize::deserialize(deserializer)?;
    if (1..=255).contains(&count) {
        Ok(count)
    } else {
        Err(D::Error::invalid_value(
            Unexpected::Unsigned(count as u64),
            &"a player count between 1 and 255",
        ))
    }
}

fn default_dragon_moves() -> u32 {
    6
}

fn default_fairy_points() -> u32 {
    3
}

impl GameConfig {
    /// Create a base-game configuration.
    pub fn new(player_count: usize) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        Self {
            player_count,
            expansions: Vec::new(),
            capabilities: Vec::new(),
            dragon_moves: default_dragon_moves(),
            fairy_points: default_fairy_points(),
        }
    }

    /// Parse a configuration from JSON. A player count outside 1-255 is an
    /// error here rather than a panic in `Game::new`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Add an expansion (builder pattern).
    #[must_use]
    pub fn with_expansion(mut self, expansion: Expansion) -> Self {
        if !self.expansions.contains(&expansion) {
            self.expansions.push(expansion);
        }
        self
    }

    /// Request a single capability (builder pattern).
    #[must_use]
    pub fn with_capability(mut self, capability: CapabilityId) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    /// Set the dragon move budget (builder pattern).
    #[must_use]
    pub fn with_dragon_moves(mut self, moves: u32) -> Self {
        self.dragon_moves = moves;
        self
    }

    /// Set the fairy bonus (builder pattern).
    #[must_use]
    pub fn with_fairy_points(mut self, points: u32) -> Self {
        self.fairy_points = points;
        self
    }

    /// Every capability requested by expansions and directly, deduplicated,
    /// in request order.
    #[must_use]
    pub fn requested_capabilities(&self) -> Vec<CapabilityId> {
        let mut requested = Vec::new();
        let from_expansions = self.expansions.iter().flat_map(|e| e.capabilities().iter().copied());
        for id in from_expansions.chain(self.capabilities.iter().copied()) {
            if !requested.contains(&id) {
                requested.push(id);
            }
        }
        requested
    }
}
