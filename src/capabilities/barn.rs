//! Barns.
//!
//! A barn stands on a farm corner and scores that farm's cities for its
//! owner at the end of the game. Whenever a tile joins a farm holding a barn
//! to followers, those followers score at the barn-connected rate and go
//! home; the game does that when it sees the farm in
//! [`Reactions::barn_connected`].

use std::any::Any;
use std::collections::BTreeSet;

use super::{Capability, CapabilityId, GameView, Reactions};
use crate::board::{Board, FeatureKind, MeepleKind};
use crate::core::{FeatureId, MeepleId, SnapshotError};
use crate::events::GameEvent;
use crate::snapshot::Element;

#[derive(Clone, Debug, Default)]
pub struct BarnCapability {
    barns: BTreeSet<MeepleId>,
}

impl BarnCapability {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Barns on the board.
    pub fn barns(&self) -> impl Iterator<Item = MeepleId> + '_ {
        self.barns.iter().copied()
    }

    #[must_use]
    pub fn has_barn_on(&self, board: &Board, farm: FeatureId) -> bool {
        board.meeples_on(farm).any(|m| self.barns.contains(&m.id))
    }

    /// Distinct farm masters holding at least one barn.
    #[must_use]
    pub fn barn_farms(&self, board: &Board) -> Vec<FeatureId> {
        self.barns
            .iter()
            .filter_map(|&id| board.meeple(id)?.feature)
            .map(|f| board.master(f))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl Capability for BarnCapability {
    fn id(&self) -> CapabilityId {
        CapabilityId::Barn
    }

    fn on_event(&mut self, event: &GameEvent, view: &GameView<'_>, reactions: &mut Reactions) {
        match event {
            GameEvent::MeepleDeployed { meeple, .. } => {
                if view.board.meeple(*meeple).is_some_and(|m| m.kind == MeepleKind::Barn) {
                    self.barns.insert(*meeple);
                }
            }
            GameEvent::MeepleReturned { meeple, .. } => {
                self.barns.remove(meeple);
            }
            GameEvent::TilePlaced { tile, .. } => {
                let board = view.board;
                let Some(tile) = board.graph().tile(*tile) else {
                    return;
                };
                let mut farms: Vec<FeatureId> = tile
                    .features
                    .iter()
                    .filter(|&&f| board.feature(f).is_some_and(|f| f.kind == FeatureKind::Farm))
                    .map(|&f| board.master(f))
                    .collect();
                farms.sort_unstable();
                farms.dedup();
                for farm in farms {
                    let has_follower = board.meeples_on(farm).any(|m| m.kind.is_follower());
                    if has_follower && self.has_barn_on(board, farm) {
                        reactions.barn_connected.push(farm);
                    }
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
        for barn in &self.barns {
            element.push_child(Element::new("barn").with_attr("meeple", barn.0));
        }
        element
    }

    fn load(&mut self, element: &Element, _reactions: &mut Reactions) -> Result<(), SnapshotError> {
        self.barns = element
            .children_named("barn")
            .map(|b| b.parse("meeple").map(MeepleId::new))
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
