//! Festivals.
//!
//! Placing a festival tile lets the player whose turn it is take one of
//! their deployed meeples back. The offer lasts until the next tile is
//! placed or a meeple is taken back.

use std::any::Any;

use super::{Capability, CapabilityId, GameView, Reactions};
use crate::board::{Board, Tile, TileDefinition, TileTrigger};
use crate::core::{DefinitionError, MeepleId, PlayerId, SnapshotError};
use crate::events::GameEvent;
use crate::snapshot::Element;

#[derive(Clone, Debug, Default)]
pub struct FestivalCapability {
    active: bool,
}

impl FestivalCapability {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Deployed meeples `player` may take back, empty outside a festival.
    #[must_use]
    pub fn returnable_meeples(&self, board: &Board, player: PlayerId) -> Vec<MeepleId> {
        if !self.active {
            return Vec::new();
        }
        board
            .meeples()
            .filter(|m| m.player == player && m.is_deployed())
            .map(|m| m.id)
            .collect()
    }

    /// Close the offer.
    pub fn consume(&mut self) {
        self.active = false;
    }
}

impl Capability for FestivalCapability {
    fn id(&self) -> CapabilityId {
        CapabilityId::Festival
    }

    fn init_tile(&self, tile: &mut Tile, definition: &TileDefinition) -> Result<(), DefinitionError> {
        if definition.attributes.flag("festival")? {
            tile.trigger = Some(TileTrigger::Festival);
        }
        Ok(())
    }

    fn on_event(&mut self, event: &GameEvent, view: &GameView<'_>, _reactions: &mut Reactions) {
        if let GameEvent::TilePlaced { position, .. } = event {
            self.active = view
                .board
                .tile_at(*position)
                .is_some_and(|t| t.trigger == Some(TileTrigger::Festival));
        }
    }

    fn clone_box(&self) -> Box<dyn Capability> {
        Box::new(self.clone())
    }

    fn save(&self) -> Element {
        let element = Element::new(self.id().name());
        if self.active {
            element.with_attr("active", true)
        } else {
            element
        }
    }

    fn load(&mut self, element: &Element, _reactions: &mut Reactions) -> Result<(), SnapshotError> {
        self.active = element.parse_opt("active")?.unwrap_or(false);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{standard, MeepleKind};
    use crate::core::{Position, Rotation, TileId};
    use crate::scoring::ScoringRules;

    fn place(board: &mut Board, festival: &mut FestivalCapability, definition: &TileDefinition, position: Position) {
        let mut draft = board.graph().draft(definition, position, Rotation::R0).unwrap();
        festival.init_tile(&mut draft.tile, definition).unwrap();
        let placement = board.graph_mut().commit(draft);
        let event = GameEvent::TilePlaced {
            tile: placement.tile,
            definition: definition.name.clone(),
            position,
            player: PlayerId::new(0),
        };
        let view = GameView {
            board,
            turn_player: PlayerId::new(0),
            player_count: 2,
            rules: ScoringRules::default(),
            final_scoring: false,
        };
        festival.on_event(&event, &view, &mut Reactions::default());
    }

    #[test]
    fn test_festival_opens_and_closes() {
        let mut board = Board::new();
        let mut festival = FestivalCapability::new();
        place(&mut board, &mut festival, &standard::field(), Position::new(0, 0));
        let farm = board.graph().tile(TileId::new(0)).unwrap().features[0];
        let mine = board.add_meeple(PlayerId::new(0), MeepleKind::Follower);
        board.deploy(mine, farm).unwrap();
        board.add_meeple(PlayerId::new(0), MeepleKind::Follower);

        assert!(festival.returnable_meeples(&board, PlayerId::new(0)).is_empty());

        place(&mut board, &mut festival, &standard::festival_field(), Position::new(1, 0));
        assert!(festival.is_active());
        assert_eq!(festival.returnable_meeples(&board, PlayerId::new(0)), vec![mine]);
        assert!(festival.returnable_meeples(&board, PlayerId::new(1)).is_empty());

        place(&mut board, &mut festival, &standard::field(), Position::new(2, 0));
        assert!(!festival.is_active());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut festival = FestivalCapability::new();
        festival.active = true;
        let mut restored = FestivalCapability::new();
        restored.load(&festival.save(), &mut Reactions::default()).unwrap();
        assert!(restored.is_active());
    }
}
