//! Player actions: tiles, meeples and expansion moves.

use std::sync::Arc;

use tracing::{info, warn};

use super::Game;
use crate::board::{FeatureKind, MeepleKind, Placement, TileDefinition, TileDraft};
use crate::capabilities::{
    BarnCapability, CapabilityId, CastleCapability, CastleState, DragonCapability, FairyCapability,
    FestivalCapability,
};
use crate::core::{
    CapabilityError, DefinitionError, DeployError, Error, FeatureId, MeepleId, PlacementError, PlayerId, Position,
    Rotation, ScoringError,
};
use crate::events::GameEvent;
use crate::scoring::{CityScoreContext, FarmScoreContext, ScoreContext};

impl Game {
    // === Tiles ===

    /// Place the tile `definition` at `position`.
    ///
    /// Capabilities read the definition's attributes before the tile joins
    /// the board; if one of them rejects it, the board is left untouched.
    /// Completed features are reported, not scored: call
    /// [`Game::score_completed_feature`] for each of them.
    pub fn place_tile(
        &mut self,
        definition: &str,
        position: Position,
        rotation: Rotation,
    ) -> Result<Placement, PlacementError> {
        if !self.started {
            return Err(PlacementError::NotStarted);
        }
        let tiles = Arc::clone(&self.tiles);
        let tile = tiles
            .get(definition)
            .ok_or_else(|| PlacementError::UnknownDefinition(definition.to_string()))?;
        self.board.graph().check(tile, position, rotation)?;
        let draft = self.draft(tile, position, rotation).map_err(|source| {
            warn!(definition, %position, %source, "tile rejected");
            PlacementError::Rejected {
                definition: definition.to_string(),
                source,
            }
        })?;

        let placement = self.board.graph_mut().commit(draft);
        info!(
            definition,
            %position,
            completed = placement.completed.len(),
            player = %self.turn_player,
            "tile placed"
        );
        self.emit(GameEvent::TilePlaced {
            tile: placement.tile,
            definition: definition.to_string(),
            position,
            player: self.turn_player,
        });
        self.flush();
        Ok(placement)
    }

    fn draft(
        &self,
        definition: &TileDefinition,
        position: Position,
        rotation: Rotation,
    ) -> Result<TileDraft, DefinitionError> {
        let mut draft = self.board.graph().draft(definition, position, rotation)?;
        for capability in self.capabilities.iter() {
            capability.init_tile(&mut draft.tile, definition)?;
            for feature in &mut draft.features {
                capability.init_feature(feature)?;
            }
        }
        Ok(draft)
    }

    // === Meeples ===

    /// Put a new `kind` meeple of `player` on the tile-local `feature`.
    pub fn deploy(&mut self, player: PlayerId, kind: MeepleKind, feature: FeatureId) -> Result<MeepleId, DeployError> {
        let meeple = self.deploy_quietly(player, kind, feature)?;
        self.flush();
        Ok(meeple)
    }

    /// Send `meeple` back to its owner.
    pub fn undeploy(&mut self, meeple: MeepleId) -> Result<FeatureId, DeployError> {
        let feature = self.undeploy_quietly(meeple)?;
        self.flush();
        Ok(feature)
    }

    /// Send every meeple on the logical feature containing `feature` home,
    /// barns excepted.
    pub fn return_meeples(&mut self, feature: FeatureId) -> Vec<MeepleId> {
        let returned = self.return_meeples_on(feature);
        self.flush();
        returned
    }

    fn deploy_quietly(&mut self, player: PlayerId, kind: MeepleKind, feature: FeatureId) -> Result<MeepleId, DeployError> {
        if player.index() >= self.player_count() {
            return Err(DeployError::UnknownPlayer(player));
        }
        let target = self.board.feature(feature).ok_or(DeployError::UnknownFeature(feature))?;
        if target.meeple.is_some() {
            return Err(DeployError::Occupied(feature));
        }
        let meeple = self.board.add_meeple(player, kind);
        self.board.deploy(meeple, feature)?;
        self.emit(GameEvent::MeepleDeployed {
            meeple,
            feature,
            player,
        });
        Ok(meeple)
    }

    fn undeploy_quietly(&mut self, meeple: MeepleId) -> Result<FeatureId, DeployError> {
        let player = self.board.meeple(meeple).ok_or(DeployError::UnknownMeeple(meeple))?.player;
        let feature = self.board.undeploy(meeple)?;
        self.emit(GameEvent::MeepleReturned {
            meeple,
            feature,
            player,
        });
        Ok(feature)
    }

    pub(super) fn return_meeples_on(&mut self, feature: FeatureId) -> Vec<MeepleId> {
        let meeples: Vec<MeepleId> = self
            .board
            .meeples_on(feature)
            .filter(|m| m.kind != MeepleKind::Barn)
            .map(|m| m.id)
            .collect();
        for &meeple in &meeples {
            if let Err(err) = self.undeploy_quietly(meeple) {
                warn!(%meeple, %err, "meeple not returned");
            }
        }
        meeples
    }

    // === Castles ===

    /// Turn the completed, unscored two-tile city containing `city` into a
    /// castle kept by the city's majority owner. A tied city has no single
    /// keeper and cannot become a castle.
    pub fn build_castle(&mut self, city: FeatureId) -> Result<FeatureId, Error> {
        if !self.has_capability(CapabilityId::Castle) {
            return Err(CapabilityError::Missing(CapabilityId::Castle).into());
        }
        let context = CityScoreContext::new(&self.board, city)?;
        let master = context.master();
        if self.scored.contains(&master) {
            return Err(ScoringError::AlreadyScored(master).into());
        }
        let candidate = |reason| ScoringError::NotACastleCandidate { feature: master, reason };
        if !self.board.is_completed(master) {
            return Err(candidate("the city is not completed").into());
        }
        if context.tile_count() != 2 {
            return Err(candidate("the city must span exactly two tiles").into());
        }
        let owner = match context.major_owners().as_slice() {
            [] => return Err(candidate("nobody holds the city").into()),
            [owner] => *owner,
            _ => return Err(candidate("the city is contested").into()),
        };

        let vicinity = CastleState::vicinity_of(&self.board, master);
        self.board.graph_mut().retag(master, FeatureKind::Castle);
        if let Some(castles) = self.capabilities.find_mut::<CastleCapability>() {
            castles.register(master, owner, vicinity);
        }
        info!(castle = %master, %owner, "castle built");
        self.emit(GameEvent::CastleBuilt {
            castle: master,
            player: owner,
        });
        self.flush();
        Ok(master)
    }

    // === Barns ===

    /// Put a barn of `player` on the tile-local farm `farm`. Followers
    /// already on the farm score it in full and go home.
    pub fn place_barn(&mut self, player: PlayerId, farm: FeatureId) -> Result<MeepleId, Error> {
        if !self.has_capability(CapabilityId::Barn) {
            return Err(CapabilityError::Missing(CapabilityId::Barn).into());
        }
        let kind = self.board.feature(farm).ok_or(ScoringError::UnknownFeature(farm))?.kind;
        if kind != FeatureKind::Farm {
            return Err(ScoringError::WrongKind { feature: farm, kind }.into());
        }

        let barn = self.deploy_quietly(player, MeepleKind::Barn, farm)?;
        let context = FarmScoreContext::new(&self.board, farm, self.rules)?;
        for owner in context.major_owners() {
            let points = context.points(owner, None);
            self.book_feature(points, &context, owner)?;
        }
        self.return_meeples_on(farm);
        self.flush();
        Ok(barn)
    }

    /// Barns on the board, in placement order.
    #[must_use]
    pub fn barns(&self) -> Vec<MeepleId> {
        self.capability::<BarnCapability>()
            .map(|b| b.barns().collect())
            .unwrap_or_default()
    }

    // === Dragon ===

    /// Start a dragon move for the player whose turn it is.
    pub fn trigger_dragon_move(&mut self) -> Result<(), CapabilityError> {
        let player = self.turn_player;
        self.capabilities
            .find_mut::<DragonCapability>()
            .ok_or(CapabilityError::Missing(CapabilityId::Dragon))?
            .trigger_move(player)
    }

    /// Tiles the dragon may move to now.
    #[must_use]
    pub fn dragon_moves(&self) -> Vec<Position> {
        let fairy = self.capability::<FairyCapability>().and_then(FairyCapability::position);
        self.capability::<DragonCapability>()
            .map(|d| d.available_moves(&self.board, fairy))
            .unwrap_or_default()
    }

    /// Move the dragon one step. Meeples on the tile it lands on go home,
    /// barns excepted.
    pub fn move_dragon(&mut self, to: Position) -> Result<(), CapabilityError> {
        let fairy = self.capability::<FairyCapability>().and_then(FairyCapability::position);
        self.capabilities
            .find_mut::<DragonCapability>()
            .ok_or(CapabilityError::Missing(CapabilityId::Dragon))?
            .move_to(&self.board, fairy, to)?;

        let eaten: Vec<MeepleId> = self
            .board
            .meeples()
            .filter(|m| m.position == Some(to) && m.kind != MeepleKind::Barn)
            .map(|m| m.id)
            .collect();
        for meeple in eaten {
            if let Err(err) = self.undeploy_quietly(meeple) {
                warn!(%meeple, %err, "dragon could not eat meeple");
            }
        }
        self.emit(GameEvent::DragonMoved { position: to });
        self.flush();
        Ok(())
    }

    /// Stop the current dragon move early.
    pub fn end_dragon_move(&mut self) -> Result<(), CapabilityError> {
        self.capabilities
            .find_mut::<DragonCapability>()
            .ok_or(CapabilityError::Missing(CapabilityId::Dragon))?
            .end_move();
        Ok(())
    }

    // === Fairy ===

    /// Put the fairy on the tile at `position`.
    pub fn move_fairy(&mut self, position: Position) -> Result<(), CapabilityError> {
        if self.board.tile_at(position).is_none() {
            return Err(CapabilityError::IllegalMove {
                capability: CapabilityId::Fairy,
                reason: format!("no tile at {position}"),
            });
        }
        self.capabilities
            .find_mut::<FairyCapability>()
            .ok_or(CapabilityError::Missing(CapabilityId::Fairy))?
            .set_position(position);
        Ok(())
    }

    // === Festival ===

    /// Meeples the player whose turn it is may take back at a festival.
    #[must_use]
    pub fn festival_returnable(&self) -> Vec<MeepleId> {
        self.capability::<FestivalCapability>()
            .map(|f| f.returnable_meeples(&self.board, self.turn_player))
            .unwrap_or_default()
    }

    /// Take `meeple` back during a festival.
    pub fn festival_return(&mut self, meeple: MeepleId) -> Result<FeatureId, Error> {
        let festival = self
            .capabilities
            .find::<FestivalCapability>()
            .ok_or(CapabilityError::Missing(CapabilityId::Festival))?;
        if !festival.returnable_meeples(&self.board, self.turn_player).contains(&meeple) {
            return Err(CapabilityError::IllegalMove {
                capability: CapabilityId::Festival,
                reason: format!("meeple {meeple} cannot be returned now"),
            }
            .into());
        }
        if let Some(festival) = self.capabilities.find_mut::<FestivalCapability>() {
            festival.consume();
        }
        Ok(self.undeploy(meeple)?)
    }
}
