//! Static registry of hammer variants.
//!
//! A variant = definition + hooks. Variants are registered once at startup;
//! actors refer to them by `HammerId`.

use std::collections::HashMap;
use std::sync::Arc;

use bevy::prelude::*;

use super::definition::WeaponDefinition;
use super::hooks::{HammerHooks, NoHooks};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct HammerId(pub u32);

impl HammerId {
    /// The plain Guardian Hammer registered by `HammerRegistry::with_stock_hammers`.
    pub const GUARDIAN: HammerId = HammerId(0);
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("hammer {0:?} is already registered")]
    Duplicate(HammerId),

    #[error("hammer {0:?} is not registered")]
    Unknown(HammerId),
}

pub type SharedHooks = Arc<dyn HammerHooks + Send + Sync>;

#[derive(Clone)]
pub struct HammerVariant {
    pub name: &'static str,
    pub definition: WeaponDefinition,
    pub hooks: SharedHooks,
}

impl std::fmt::Debug for HammerVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HammerVariant")
            .field("name", &self.name)
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

#[derive(Resource, Debug, Default)]
pub struct HammerRegistry {
    variants: HashMap<HammerId, HammerVariant>,
}

impl HammerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the plain Guardian Hammer under [`HammerId::GUARDIAN`].
    pub fn with_stock_hammers() -> Self {
        let mut registry = Self::new();
        registry.variants.insert(
            HammerId::GUARDIAN,
            HammerVariant {
                name: "guardian_hammer",
                definition: WeaponDefinition::default(),
                hooks: Arc::new(NoHooks),
            },
        );
        registry
    }

    pub fn register(
        &mut self,
        id: HammerId,
        name: &'static str,
        definition: WeaponDefinition,
        hooks: SharedHooks,
    ) -> Result<(), RegistryError> {
        if self.variants.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        self.variants.insert(
            id,
            HammerVariant {
                name,
                definition,
                hooks,
            },
        );
        Ok(())
    }

    pub fn get(&self, id: HammerId) -> Result<&HammerVariant, RegistryError> {
        self.variants.get(&id).ok_or(RegistryError::Unknown(id))
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
