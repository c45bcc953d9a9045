use std::any::Any;

use super::{Capability, CapabilityId};
use crate::board::{Feature, FeatureKind};
use crate::core::DefinitionError;

/// Marks farms printed with a pig herd. Each herd adds one point per city
/// to everyone scoring the farm.
#[derive(Clone, Copy, Debug, Default)]
pub struct PigHerdCapability;

impl Capability for PigHerdCapability {
    fn id(&self) -> CapabilityId {
        CapabilityId::PigHerd
    }

    fn init_feature(&self, feature: &mut Feature) -> Result<(), DefinitionError> {
        if feature.kind == FeatureKind::Farm {
            feature.pig_herd = feature.attributes.flag("pig-herd")?;
        }
        Ok(())
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
