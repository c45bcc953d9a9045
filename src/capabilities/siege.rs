//! Sieges: cities printed besieged count twice for farms.

use std::any::Any;

use super::{Capability, CapabilityId};
use crate::board::{Feature, FeatureKind};
use crate::core::DefinitionError;
use crate::scoring::ScoringRules;

#[derive(Clone, Copy, Debug, Default)]
pub struct SiegeCapability;

impl Capability for SiegeCapability {
    fn id(&self) -> CapabilityId {
        CapabilityId::Siege
    }

    fn init_feature(&self, feature: &mut Feature) -> Result<(), DefinitionError> {
        if feature.kind == FeatureKind::City {
            feature.besieged = feature.attributes.flag("besieged")?;
        }
        Ok(())
    }

    fn configure_rules(&self, rules: &mut ScoringRules) {
        rules.besiege_tracking = true;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{standard, Board};
    use crate::core::{Position, Rotation};

    #[test]
    fn test_reads_besieged_flag() {
        let board = Board::new();
        let mut draft = board
            .graph()
            .draft(&standard::city_cap_besieged(), Position::new(0, 0), Rotation::R0)
            .unwrap();
        for feature in &mut draft.features {
            SiegeCapability.init_feature(feature).unwrap();
        }
        assert!(draft.features[0].besieged);
        assert!(draft.features.iter().skip(1).all(|f| !f.besieged));
    }

    #[test]
    fn test_enables_tracking() {
        let mut rules = ScoringRules::default();
        SiegeCapability.configure_rules(&mut rules);
        assert!(rules.besiege_tracking);
        assert!(!rules.dedupe_cities);
    }
}
