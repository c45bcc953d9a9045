//! Tile registry for definition lookup.
//!
//! The `TileRegistry` stores every tile definition a game may place, keyed
//! by name. Definitions are usually loaded from JSON tile data.

use rustc_hash::FxHashMap;

use super::definition::TileDefinition;
use crate::core::DefinitionError;

/// Registry of tile definitions.
///
/// ## Example
///
/// ```
/// use rust_cloister::board::{standard, TileRegistry};
///
/// let mut registry = TileRegistry::new();
/// registry.register(standard::city_cap()).unwrap();
///
/// assert!(registry.get("city-cap").is_some());
/// assert!(registry.register(standard::city_cap()).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct TileRegistry {
    tiles: FxHashMap<String, TileDefinition>,
}

impl TileRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of tile definitions.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let definitions: Vec<TileDefinition> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Register a definition after validating it.
    pub fn register(&mut self, definition: TileDefinition) -> Result<(), DefinitionError> {
        if self.tiles.contains_key(&definition.name) {
            return Err(DefinitionError::Duplicate(definition.name));
        }
        definition.validate()?;
        self.tiles.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Get a definition by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TileDefinition> {
        self.tiles.get(name)
    }

    /// Check if a definition is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tiles.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Iterate over all definitions, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TileDefinition> {
        self.tiles.values()
    }
}
