//! Resource definitions and the global cheat switches that exempt resources from draw.

use std::collections::BTreeMap;

/// Cheat switches that make whole classes of resources inexhaustible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheatOptions {
    /// Massless resources (electric charge and the like) are never drawn.
    pub infinite_electricity: bool,
    /// Resources with mass are never drawn.
    pub infinite_propellant: bool,
}

/// A single resource definition. Density is in tonnes per unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDefinition {
    pub name: String,
    pub density: f64,
}

/// Read-only lookup of resource definitions plus the active cheat switches.
#[derive(Debug, Clone, Default)]
pub struct ResourceLibrary {
    definitions: BTreeMap<String, ResourceDefinition>,
    cheats: CheatOptions,
}

impl ResourceLibrary {
    pub fn new<I>(definitions: I, cheats: CheatOptions) -> Self
    where
        I: IntoIterator<Item = ResourceDefinition>,
    {
        let definitions = definitions
            .into_iter()
            .map(|def| (def.name.clone(), def))
            .collect();
        Self {
            definitions,
            cheats,
        }
    }

    pub fn definition(&self, name: &str) -> Option<&ResourceDefinition> {
        self.definitions.get(name)
    }

    pub fn density(&self, name: &str) -> Option<f64> {
        self.definition(name).map(|def| def.density)
    }

    /// Whether a cheat switch makes `name` inexhaustible.
    ///
    /// Unknown resources are never exempt.
    pub fn is_exempt(&self, name: &str) -> bool {
        match self.density(name) {
            Some(density) if density <= 0.0 => self.cheats.infinite_electricity,
            Some(_) => self.cheats.infinite_propellant,
            None => false,
        }
    }

    /// Total mass (tonnes) of the given resource amounts. Unknown resources weigh nothing.
    pub fn resource_mass<'a, I>(&self, amounts: I) -> f64
    where
        I: IntoIterator<Item = (&'a String, &'a f64)>,
    {
        amounts
            .into_iter()
            .map(|(name, amount)| amount * self.density(name).unwrap_or(0.0))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
