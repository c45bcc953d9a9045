//! Cathars: in a batched end-game farm pass a city feeds at most one farm
//! per player.

use std::any::Any;

use super::{Capability, CapabilityId};
use crate::scoring::ScoringRules;

#[derive(Clone, Copy, Debug, Default)]
pub struct CatharsCapability;

impl Capability for CatharsCapability {
    fn id(&self) -> CapabilityId {
        CapabilityId::Cathars
    }

    fn configure_rules(&self, rules: &mut ScoringRules) {
        rules.dedupe_cities = true;
    }

    fn clone_box(&self) -> Box<dyn Capability> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
