//! Part definitions: what the host knows about a part independent of any save.

use std::collections::BTreeMap;

use thrust_propulsion::RawPropellant;

/// One thrust-producing sub-module of a part.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineDefinition {
    /// Maximum thrust in kN.
    pub max_thrust: f64,
    pub propellants: Vec<RawPropellant>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartDefinition {
    pub name: String,
    /// Display title.
    pub title: String,
    /// Whether the part carries a persistent engine module.
    pub persistent: bool,
    pub engines: Vec<EngineDefinition>,
}

/// Part definitions keyed by part name.
#[derive(Debug, Clone, Default)]
pub struct PartCatalog {
    parts: BTreeMap<String, PartDefinition>,
}

impl PartCatalog {
    pub fn new<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = PartDefinition>,
    {
        Self {
            parts: parts
                .into_iter()
                .map(|part| (part.name.clone(), part))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PartDefinition> {
        self.parts.get(name)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
