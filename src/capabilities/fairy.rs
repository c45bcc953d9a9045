//! The fairy: a follower on the fairy's tile earns a bonus whenever its
//! feature scores.

use std::any::Any;

use super::{Bonus, Capability, CapabilityId, GameView, ScoredFeature};
use crate::core::{PointCategory, Position, SnapshotError};
use crate::snapshot::Element;

#[derive(Clone, Debug)]
pub struct FairyCapability {
    points: u32,
    position: Option<Position>,
}

impl FairyCapability {
    #[must_use]
    pub fn new(points: u32) -> Self {
        Self { points, position: None }
    }

    #[must_use]
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = Some(position);
    }

    /// Bonus per scoring follower next to the fairy.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }
}

impl Capability for FairyCapability {
    fn id(&self) -> CapabilityId {
        CapabilityId::Fairy
    }

    fn score_bonus(&self, _view: &GameView<'_>, scored: &ScoredFeature<'_>) -> Option<Bonus> {
        let position = self.position?;
        (self.points > 0 && scored.follower.position == Some(position)).then_some(Bonus {
            points: self.points,
            category: PointCategory::Fairy,
        })
    }

    fn clone_box(&self) -> Box<dyn Capability> {
        Box::new(self.clone())
    }

    fn save(&self) -> Element {
        let mut element = Element::new(self.id().name());
        if let Some(position) = self.position {
            element.push_child(Element::new("fairy").with_position(position));
        }
        element
    }

    fn load(&mut self, element: &Element, _reactions: &mut super::Reactions) -> Result<(), SnapshotError> {
        self.position = element.child("fairy").map(Element::position).transpose()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
