//! Castles.
//!
//! A completed two-tile city holding a follower can be turned into a castle
//! instead of scoring (`Game::build_castle`). The castle then waits for the
//! first feature completed in its vicinity: the castle's tiles and the tiles
//! orthogonally next to them. Its keeper scores that feature's value as
//! castle points.

use std::any::Any;
use std::collections::BTreeSet;

use tracing::info;

use super::{Award, Capability, CapabilityId, GameView, Reactions};
use crate::board::Board;
use crate::core::{FeatureId, PlayerId, PointCategory, Position, SnapshotError};
use crate::events::GameEvent;
use crate::snapshot::Element;

/// One castle and what it captured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CastleState {
    pub castle: FeatureId,
    pub owner: PlayerId,
    pub vicinity: BTreeSet<Position>,
    pub captured: Option<u32>,
}

impl CastleState {
    /// Vicinity of a castle built on `board` from the city `castle`.
    #[must_use]
    pub fn vicinity_of(board: &Board, castle: FeatureId) -> BTreeSet<Position> {
        let mut vicinity = BTreeSet::new();
        for member in board.members(castle) {
            vicinity.insert(member.position);
            vicinity.extend(member.position.adjacent());
        }
        vicinity
    }
}

#[derive(Clone, Debug, Default)]
pub struct CastleCapability {
    castles: Vec<CastleState>,
}

impl CastleCapability {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, castle: FeatureId, owner: PlayerId, vicinity: BTreeSet<Position>) {
        self.castles.push(CastleState {
            castle,
            owner,
            vicinity,
            captured: None,
        });
    }

    #[must_use]
    pub fn castle(&self, castle: FeatureId) -> Option<&CastleState> {
        self.castles.iter().find(|c| c.castle == castle)
    }

    /// Points captured by `castle`, if it captured anything yet.
    #[must_use]
    pub fn captured(&self, castle: FeatureId) -> Option<u32> {
        self.castle(castle).and_then(|c| c.captured)
    }

    pub fn castles(&self) -> impl Iterator<Item = &CastleState> + '_ {
        self.castles.iter()
    }
}

impl Capability for CastleCapability {
    fn id(&self) -> CapabilityId {
        CapabilityId::Castle
    }

    fn on_event(&mut self, event: &GameEvent, _view: &GameView<'_>, reactions: &mut Reactions) {
        let GameEvent::FeatureCompleted {
            master,
            positions,
            points,
            ..
        } = event
        else {
            return;
        };
        for state in &mut self.castles {
            if state.captured.is_some() || state.castle == *master {
                continue;
            }
            if positions.iter().any(|p| state.vicinity.contains(p)) {
                info!(castle = %state.castle, feature = %master, points, "castle captured a feature");
                state.captured = Some(*points);
                reactions.award(Award {
                    player: state.owner,
                    points: *points,
                    category: PointCategory::Castle,
                    feature: Some(state.castle),
                });
            }
        }
    }

    fn clone_box(&self) -> Box<dyn Capability> {
        Box::new(self.clone())
    }

    fn save(&self) -> Element {
        let mut element = Element::new(self.id().name());
        for state in &self.castles {
            let mut child = Element::new("castle")
                .with_attr("feature", state.castle.0)
                .with_attr("owner", state.owner.0);
            if let Some(captured) = state.captured {
                child.set_attr("captured", captured);
            }
            for &position in &state.vicinity {
                child.push_child(Element::new("tile").with_position(position));
            }
            element.push_child(child);
        }
        element
    }

    fn load(&mut self, element: &Element, _reactions: &mut Reactions) -> Result<(), SnapshotError> {
        self.castles = element
            .children_named("castle")
            .map(|child| -> Result<CastleState, SnapshotError> {
                Ok(CastleState {
                    castle: FeatureId::new(child.parse("feature")?),
                    owner: PlayerId::new(child.parse("owner")?),
                    vicinity: child
                        .children_named("tile")
                        .map(Element::position)
                        .collect::<Result<_, _>>()?,
                    captured: child.parse_opt("captured")?,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
