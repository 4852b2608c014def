//! Per-vessel background state and its engine registry.

use std::collections::BTreeMap;

use thrust_core::vector::{self, Vector3};
use thrust_orbits::{
    AutopilotCommand, FlightContext, HeadingError, KeplerOrbit, ManeuverPlan, TargetRef,
    VesselKinematics, heading_vector,
};
use thrust_propulsion::{PropellantMixture, ResourceLibrary};
use thrust_snapshot::{AutopilotMode, PersistedTargeting, VesselSnapshot};

/// Runtime state of one persistent engine, keyed in the registry by persisted part id.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub part_index: usize,
    pub persistent_part_id: u32,
    pub module_index: usize,
    /// Part display title.
    pub title: String,
    /// Summed maximum thrust of the part's engine modules (kN).
    pub max_thrust: f64,
    /// Persisted thrust (kN), refreshed every tick.
    pub persistent_thrust: f64,
    /// Propellants per engine module.
    pub mixtures: Vec<PropellantMixture>,
    /// Delta-v (m/s) produced by the last applied tick.
    pub delta_v: f64,
    /// Propellant units drawn by the last applied tick.
    pub propellant_demand: f64,
}

/// A signed amount of one resource to add to (or remove from) the vessel.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceChangeRequest {
    pub resource: String,
    pub amount: f64,
}

/// Receiver of resource changes; implemented by whoever owns the resource pools.
pub trait ResourceLedger {
    fn apply(&mut self, resource: &str, amount: f64);
}

impl ResourceLedger for BTreeMap<String, f64> {
    fn apply(&mut self, resource: &str, amount: f64) {
        *self.entry(resource.to_string()).or_insert(0.0) += amount;
    }
}

/// Persisted target and maneuver settings, as last read from a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VesselTargeting {
    pub target_body_name: String,
    pub target_vessel_id: String,
    pub maneuver_ut: f64,
    pub maneuver_tolerance_deg: f64,
    pub maneuver_next_patch: bool,
}

impl VesselTargeting {
    /// Overwrite the fields that were persisted; absent ones keep their value.
    pub fn merge(&mut self, persisted: &PersistedTargeting) {
        if let Some(name) = &persisted.target_body_name {
            self.target_body_name.clone_from(name);
        }
        if let Some(id) = &persisted.target_vessel_id {
            self.target_vessel_id.clone_from(id);
        }
        if let Some(ut) = persisted.maneuver_ut {
            self.maneuver_ut = ut;
        }
        if let Some(tolerance) = persisted.maneuver_tolerance_deg {
            self.maneuver_tolerance_deg = tolerance;
        }
        if let Some(next_patch) = persisted.maneuver_next_patch {
            self.maneuver_next_patch = next_patch;
        }
    }

    pub fn target(&self) -> Option<TargetRef> {
        TargetRef::from_persisted(&self.target_vessel_id, &self.target_body_name)
    }
}

/// Everything the background processor tracks for one unloaded vessel.
#[derive(Debug, Clone)]
pub struct VesselBackgroundState {
    pub vessel_id: String,
    pub kinematics: VesselKinematics,
    pub autopilot_mode: AutopilotMode,
    pub targeting: VesselTargeting,
    /// Planned orbit after the next maneuver node, if any.
    pub maneuver_patch: Option<KeplerOrbit>,
    /// Heading resolved on the last tick; zero when unresolved.
    pub heading_vector: Vector3,
    /// Sum of persisted thrust (kN) over engines that were processed this tick.
    pub total_persistent_thrust: f64,
    pub has_any_active_persistent_engine: bool,
    /// Mass without resources (tonnes).
    pub dry_mass: f64,
    pub available_resources: BTreeMap<String, f64>,
    /// Resource changes accumulated during the current tick.
    pub resource_changes: BTreeMap<String, f64>,
    engines: BTreeMap<u32, EngineSnapshot>,
}

impl VesselBackgroundState {
    pub fn new(vessel_id: impl Into<String>, kinematics: VesselKinematics) -> Self {
        Self {
            vessel_id: vessel_id.into(),
            kinematics,
            autopilot_mode: AutopilotMode::default(),
            targeting: VesselTargeting::default(),
            maneuver_patch: None,
            heading_vector: vector::ZERO,
            total_persistent_thrust: 0.0,
            has_any_active_persistent_engine: false,
            dry_mass: 0.0,
            available_resources: BTreeMap::new(),
            resource_changes: BTreeMap::new(),
            engines: BTreeMap::new(),
        }
    }

    /// Copy the per-tick vessel-level values out of a snapshot.
    pub fn sync_from_snapshot(&mut self, vessel: &VesselSnapshot) {
        self.autopilot_mode = vessel.autopilot_mode;
        self.dry_mass = vessel.dry_mass;
        self.available_resources.clone_from(&vessel.resources);
    }

    pub fn engines(&self) -> impl Iterator<Item = &EngineSnapshot> {
        self.engines.values()
    }

    pub fn engine(&self, persistent_part_id: u32) -> Option<&EngineSnapshot> {
        self.engines.get(&persistent_part_id)
    }

    pub fn engine_mut(&mut self, persistent_part_id: u32) -> Option<&mut EngineSnapshot> {
        self.engines.get_mut(&persistent_part_id)
    }

    pub fn engine_ids(&self) -> Vec<u32> {
        self.engines.keys().copied().collect()
    }

    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }

    /// Register an engine. Returns `false`, leaving the registry untouched,
    /// when the persisted part id is already taken.
    pub(crate) fn register_engine(&mut self, engine: EngineSnapshot) -> bool {
        if self.engines.contains_key(&engine.persistent_part_id) {
            return false;
        }
        self.engines.insert(engine.persistent_part_id, engine);
        true
    }

    pub(crate) fn clear_engines(&mut self) {
        self.engines.clear();
        self.has_any_active_persistent_engine = false;
    }

    /// The current autopilot mode with the persisted data it needs.
    pub fn autopilot_command(&self) -> Result<AutopilotCommand, HeadingError> {
        let maneuver = if self.targeting.maneuver_next_patch {
            self.maneuver_patch.clone().map(|patch| ManeuverPlan {
                patch,
                ut: self.targeting.maneuver_ut,
                tolerance_deg: self.targeting.maneuver_tolerance_deg,
            })
        } else {
            None
        };
        AutopilotCommand::from_mode(self.autopilot_mode, self.targeting.target(), maneuver)
    }

    /// Resolve and cache the heading for `ut`. Failures cache the zero vector.
    pub fn refresh_heading(
        &mut self,
        flight: &dyn FlightContext,
        ut: f64,
    ) -> Result<Vector3, HeadingError> {
        let resolved = self
            .autopilot_command()
            .and_then(|command| heading_vector(&command, &self.kinematics, flight, ut));
        self.heading_vector = *resolved.as_ref().unwrap_or(&vector::ZERO);
        resolved
    }

    /// Dry mass plus the mass of every available resource (tonnes).
    pub fn vessel_mass(&self, library: &ResourceLibrary) -> f64 {
        self.dry_mass + library.resource_mass(&self.available_resources)
    }

    /// Accumulate a granted request and draw it from what later engines see.
    pub(crate) fn record_resource_change(&mut self, request: &ResourceChangeRequest) {
        self.resource_changes.apply(&request.resource, request.amount);
        self.available_resources.apply(&request.resource, request.amount);
    }
}
