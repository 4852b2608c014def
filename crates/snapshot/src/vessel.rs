//! Vessel, part, and module snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::autopilot::AutopilotMode;
use crate::store::FieldStore;

/// Module name under which persistent engines store their fields.
pub const PERSISTENT_ENGINE_MODULE: &str = "PersistentEngine";

/// One persisted part module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSnapshot {
    pub module_name: String,
    #[serde(default)]
    pub fields: FieldStore,
}

/// One persisted part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSnapshot {
    pub persistent_id: u32,
    /// Part name, used to look up the part definition.
    pub part_name: String,
    #[serde(default)]
    pub modules: Vec<ModuleSnapshot>,
}

impl PartSnapshot {
    /// First module named `name`, with its index in the module list.
    pub fn find_module(&self, name: &str) -> Option<(usize, &ModuleSnapshot)> {
        self.modules
            .iter()
            .enumerate()
            .find(|(_, module)| module.module_name == name)
    }
}

/// A vessel as persisted while unloaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselSnapshot {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub landed: bool,
    #[serde(default)]
    pub splashed: bool,
    #[serde(default)]
    pub autopilot_mode: AutopilotMode,
    /// Mass without resources, in tonnes.
    #[serde(default)]
    pub dry_mass: f64,
    /// Resource amounts across the whole vessel.
    #[serde(default)]
    pub resources: BTreeMap<String, f64>,
    #[serde(default)]
    pub parts: Vec<PartSnapshot>,
}

impl VesselSnapshot {
    pub fn landed_or_splashed(&self) -> bool {
        self.landed || self.splashed
    }

    /// Module at the given part and module indices.
    pub fn module_at(&self, part_index: usize, module_index: usize) -> Option<&ModuleSnapshot> {
        self.parts.get(part_index)?.modules.get(module_index)
    }
}
