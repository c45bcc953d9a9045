//! Capability registry.
//!
//! Holds at most one instance per [`CapabilityId`], in registration order.
//! Dispatch follows that order.

use tracing::debug;

use super::{Capability, CapabilityId};

#[derive(Clone, Debug, Default)]
pub struct CapabilityRegistry {
    capabilities: Vec<Box<dyn Capability>>,
}

impl CapabilityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a capability. Returns `false` and drops it if one with the same
    /// id is already registered.
    pub fn insert(&mut self, capability: Box<dyn Capability>) -> bool {
        let id = capability.id();
        if self.contains(id) {
            debug!(capability = ?id, "capability already registered");
            return false;
        }
        self.capabilities.push(capability);
        true
    }

    #[must_use]
    pub fn contains(&self, id: CapabilityId) -> bool {
        self.capabilities.iter().any(|c| c.id() == id)
    }

    #[must_use]
    pub fn get(&self, id: CapabilityId) -> Option<&dyn Capability> {
        self.capabilities.iter().find(|c| c.id() == id).map(|c| &**c)
    }

    pub fn get_mut(&mut self, id: CapabilityId) -> Option<&mut (dyn Capability + 'static)> {
        self.capabilities.iter_mut().find(|c| c.id() == id).map(|c| &mut **c)
    }

    /// Typed lookup.
    #[must_use]
    pub fn find<T: Capability + 'static>(&self) -> Option<&T> {
        self.capabilities.iter().find_map(|c| c.as_any().downcast_ref::<T>())
    }

    /// Typed mutable lookup.
    pub fn find_mut<T: Capability + 'static>(&mut self) -> Option<&mut T> {
        self.capabilities
            .iter_mut()
            .find_map(|c| c.as_any_mut().downcast_mut::<T>())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Capability> {
        self.capabilities.iter().map(|c| &**c)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Capability>> {
        self.capabilities.iter_mut()
    }

    /// Registered ids in dispatch order.
    #[must_use]
    pub fn ids(&self) -> Vec<CapabilityId> {
        self.capabilities.iter().map(|c| c.id()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{CatharsCapability, FairyCapability, SiegeCapability};
    use crate::core::Position;

    #[test]
    fn test_one_instance_per_id() {
        let mut registry = CapabilityRegistry::new();
        assert!(registry.insert(Box::new(SiegeCapability)));
        assert!(registry.insert(Box::new(CatharsCapability)));
        assert!(!registry.insert(Box::new(SiegeCapability)));

        assert_eq!(registry.ids(), vec![CapabilityId::Siege, CapabilityId::Cathars]);
    }

    #[test]
    fn test_typed_lookup() {
        let mut registry = CapabilityRegistry::new();
        registry.insert(Box::new(FairyCapability::new(3)));

        assert!(registry.find::<SiegeCapability>().is_none());
        registry.find_mut::<FairyCapability>().unwrap().set_position(Position::new(1, 2));
        assert_eq!(registry.find::<FairyCapability>().unwrap().position(), Some(Position::new(1, 2)));
    }

    #[test]
    fn test_clone_is_deep() {
        let mut registry = CapabilityRegistry::new();
        registry.insert(Box::new(FairyCapability::new(3)));
        let copy = registry.clone();

        registry.find_mut::<FairyCapability>().unwrap().set_position(Position::new(0, 0));
        assert_eq!(copy.find::<FairyCapability>().unwrap().position(), None);
    }
}
