//! The dragon.
//!
//! The dragon appears on the volcano tile. A dragon tile sets it moving:
//! players take turns moving it one tile at a time, starting with the player
//! who drew the tile, never onto a tile it already visited during this move
//! or onto the fairy.

use std::any::Any;
use std::collections::BTreeSet;

use tracing::warn;

use super::{Capability, CapabilityId, GameView, Reactions};
use crate::board::{Board, Tile, TileDefinition, TileTrigger};
use crate::core::{CapabilityError, DefinitionError, PlayerId, Position, SnapshotError};
use crate::events::GameEvent;
use crate::snapshot::Element;

/// An in-progress dragon move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragonMove {
    pub moves_left: u32,
    pub moving_player: PlayerId,
    pub visited: BTreeSet<Position>,
}

#[derive(Clone, Debug)]
pub struct DragonCapability {
    budget: u32,
    position: Option<Position>,
    moving: Option<DragonMove>,
    player_count: usize,
}

impl DragonCapability {
    /// `budget` is the number of steps per dragon move.
    pub fn new(budget: u32) -> Result<Self, CapabilityError> {
        if budget == 0 {
            return Err(CapabilityError::InvalidConfig {
                capability: CapabilityId::Dragon,
                reason: "dragon must be allowed at least one move".to_string(),
            });
        }
        Ok(Self {
            budget,
            position: None,
            moving: None,
            player_count: 0,
        })
    }

    #[must_use]
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    #[must_use]
    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// The move in progress, if any.
    #[must_use]
    pub fn current_move(&self) -> Option<&DragonMove> {
        self.moving.as_ref()
    }

    #[must_use]
    pub fn moves_left(&self) -> u32 {
        self.moving.as_ref().map_or(0, |m| m.moves_left)
    }

    /// Start a dragon move for `player`.
    pub fn trigger_move(&mut self, player: PlayerId) -> Result<(), CapabilityError> {
        let position = self.position.ok_or_else(|| illegal("the dragon is not on the board"))?;
        self.moving = Some(DragonMove {
            moves_left: self.budget,
            moving_player: player,
            visited: BTreeSet::from([position]),
        });
        Ok(())
    }

    /// Tiles the dragon may step onto next.
    #[must_use]
    pub fn available_moves(&self, board: &Board, fairy: Option<Position>) -> Vec<Position> {
        let Some(position) = self.position else {
            return Vec::new();
        };
        position
            .adjacent()
            .filter(|&p| board.tile_at(p).is_some())
            .filter(|p| !self.moving.as_ref().is_some_and(|m| m.visited.contains(p)))
            .filter(|&p| Some(p) != fairy)
            .collect()
    }

    /// Step to `to` and hand the move to the next player. Ends the move
    /// when the budget runs out.
    pub fn move_to(&mut self, board: &Board, fairy: Option<Position>, to: Position) -> Result<(), CapabilityError> {
        if self.moving.is_none() {
            return Err(illegal("no dragon move in progress"));
        }
        if !self.available_moves(board, fairy).contains(&to) {
            return Err(illegal(format!("the dragon cannot move to {to}")));
        }
        self.position = Some(to);
        let player_count = self.player_count.max(1);
        if let Some(moving) = self.moving.as_mut() {
            moving.visited.insert(to);
            moving.moving_player = moving.moving_player.next(player_count);
            moving.moves_left = moving.moves_left.saturating_sub(1);
            if moving.moves_left == 0 {
                self.moving = None;
            }
        }
        Ok(())
    }

    pub fn end_move(&mut self) {
        self.moving = None;
    }
}

fn illegal(reason: impl Into<String>) -> CapabilityError {
    CapabilityError::IllegalMove {
        capability: CapabilityId::Dragon,
        reason: reason.into(),
    }
}

impl Capability for DragonCapability {
    fn id(&self) -> CapabilityId {
        CapabilityId::Dragon
    }

    fn init_tile(&self, tile: &mut Tile, definition: &TileDefinition) -> Result<(), DefinitionError> {
        if definition.attributes.flag("volcano")? {
            tile.trigger = Some(TileTrigger::Volcano);
        }
        if definition.attributes.flag("dragon")? {
            tile.trigger = Some(TileTrigger::Dragon);
        }
        Ok(())
    }

    fn init_player(&mut self, player: PlayerId) {
        self.player_count = self.player_count.max(player.index() + 1);
    }

    fn on_event(&mut self, event: &GameEvent, view: &GameView<'_>, reactions: &mut Reactions) {
        let GameEvent::TilePlaced { position, .. } = event else {
            return;
        };
        match view.board.tile_at(*position).and_then(|t| t.trigger) {
            Some(TileTrigger::Volcano) => {
                self.position = Some(*position);
                self.moving = None;
                reactions.fire(GameEvent::DragonMoved { position: *position });
            }
            Some(TileTrigger::Dragon) if self.position.is_some() => {
                // The dragon only moves once the volcano is out.
                if let Err(err) = self.trigger_move(view.turn_player) {
                    warn!(%err, "dragon move not started");
                }
            }
            _ => {}
        }
    }

    fn clone_box(&self) -> Box<dyn Capability> {
        Box::new(self.clone())
    }

    fn save(&self) -> Element {
        let mut element = Element::new(self.id().name());
        if let Some(position) = self.position {
            let mut dragon = Element::new("dragon").with_position(position);
            if let Some(moving) = self.moving.as_ref().filter(|m| m.moves_left > 0) {
                dragon.set_attr("moves", moving.moves_left);
                dragon.set_attr("movingPlayer", moving.moving_player.0);
                for &visited in &moving.visited {
                    dragon.push_child(Element::new("visited").with_position(visited));
                }
            }
            element.push_child(dragon);
        }
        element
    }

    fn load(&mut self, element: &Element, reactions: &mut Reactions) -> Result<(), SnapshotError> {
        let Some(dragon) = element.child("dragon") else {
            return Ok(());
        };
        let position = dragon.position()?;
        self.position = Some(position);
        reactions.fire(GameEvent::DragonMoved { position });

        self.moving = match dragon.parse_opt::<u32>("moves")? {
            Some(moves_left) if moves_left > 0 => Some(DragonMove {
                moves_left,
                moving_player: PlayerId::new(dragon.parse("movingPlayer")?),
                visited: dragon
                    .children_named("visited")
                    .map(Element::position)
                    .collect::<Result<_, _>>()?,
            }),
            _ => None,
        };
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
    use crate::board::standard;
    use crate::core::Rotation;

    /// A plus-shaped board of fields around the origin.
    fn plus_board() -> Board {
        let mut board = Board::new();
        let graph = board.graph_mut();
        graph.place(&standard::field(), Position::new(0, 0), Rotation::R0).unwrap();
        for p in Position::new(0, 0).adjacent() {
            graph.place(&standard::field(), p, Rotation::R0).unwrap();
        }
        board
    }

    fn dragon_at_origin(players: u8) -> DragonCapability {
        let mut dragon = DragonCapability::new(3).unwrap();
        for player in PlayerId::all(players as usize) {
            dragon.init_player(player);
        }
        dragon.position = Some(Position::new(0, 0));
        dragon
    }

    #[test]
    fn test_trigger_requires_dragon_on_board() {
        let mut dragon = DragonCapability::new(6).unwrap();
        assert!(dragon.trigger_move(PlayerId::new(0)).is_err());
        assert_eq!(dragon.moves_left(), 0);
    }

    #[test]
    fn test_available_moves_skip_visited_and_fairy() {
        let board = plus_board();
        let mut dragon = dragon_at_origin(2);
        dragon.trigger_move(PlayerId::new(0)).unwrap();

        assert_eq!(dragon.available_moves(&board, None).len(), 4);
        assert_eq!(dragon.available_moves(&board, Some(Position::new(1, 0))).len(), 3);

        dragon.move_to(&board, None, Position::new(1, 0)).unwrap();
        // From the east arm only the origin is adjacent, and it was visited.
        assert!(dragon.available_moves(&board, None).is_empty());
    }

    #[test]
    fn test_move_passes_to_next_player() {
        let board = plus_board();
        let mut dragon = dragon_at_origin(2);
        dragon.trigger_move(PlayerId::new(1)).unwrap();

        dragon.move_to(&board, None, Position::new(0, -1)).unwrap();

        let moving = dragon.current_move().unwrap();
        assert_eq!(moving.moving_player, PlayerId::new(0));
        assert_eq!(moving.moves_left, 2);
        assert!(moving.visited.contains(&Position::new(0, 0)));
        assert_eq!(dragon.position(), Some(Position::new(0, -1)));
    }

    #[test]
    fn test_illegal_move_rejected() {
        let board = plus_board();
        let mut dragon = dragon_at_origin(2);
        assert!(dragon.move_to(&board, None, Position::new(1, 0)).is_err());

        dragon.trigger_move(PlayerId::new(0)).unwrap();
        assert!(dragon.move_to(&board, None, Position::new(5, 5)).is_err());
        assert_eq!(dragon.position(), Some(Position::new(0, 0)));
    }

    #[test]
    fn test_snapshot_roundtrip_mid_move() {
        let board = plus_board();
        let mut dragon = dragon_at_origin(3);
        dragon.trigger_move(PlayerId::new(2)).unwrap();
        dragon.move_to(&board, None, Position::new(0, 1)).unwrap();

        let element = dragon.save();
        let mut restored = DragonCapability::new(3).unwrap();
        let mut reactions = Reactions::default();
        restored.load(&element, &mut reactions).unwrap();

        assert_eq!(restored.position(), Some(Position::new(0, 1)));
        assert_eq!(restored.current_move(), dragon.current_move());
        assert_eq!(reactions.events, vec![GameEvent::DragonMoved { position: Position::new(0, 1) }]);
    }

    #[test]
    fn test_dragon_tile_starts_move_for_turn_player() {
        let mut board = plus_board();
        let mut dragon = dragon_at_origin(2);
        let mut draft = board.graph().draft(&standard::dragon_field(), Position::new(2, 0), Rotation::R0).unwrap();
        dragon.init_tile(&mut draft.tile, &standard::dragon_field()).unwrap();
        let placement = board.graph_mut().commit(draft);

        let view = GameView {
            board: &board,
            turn_player: PlayerId::new(1),
            player_count: 2,
            rules: crate::scoring::ScoringRules::default(),
            final_scoring: false,
        };
        let event = GameEvent::TilePlaced {
            tile: placement.tile,
            definition: "dragon-field".to_string(),
            position: Position::new(2, 0),
            player: PlayerId::new(1),
        };
        let mut reactions = Reactions::default();
        dragon.on_event(&event, &view, &mut reactions);

        assert_eq!(dragon.moves_left(), 3);
        assert_eq!(dragon.current_move().unwrap().moving_player, PlayerId::new(1));
        assert!(reactions.is_empty());
    }

    #[test]
    fn test_volcano_trigger() {
        let dragon = DragonCapability::new(6).unwrap();
        let mut tile = Tile::new("volcano", Position::new(0, 0), Rotation::R0);
        dragon.init_tile(&mut tile, &standard::volcano()).unwrap();
        assert_eq!(tile.trigger, Some(TileTrigger::Volcano));
    }
}
