//! Typed deserialization of a persistent engine's module fields.
//!
//! All persisted reads happen here, in one pass, after the field store has
//! been migrated to [`FIELD_SCHEMA_VERSION`].

use std::borrow::Cow;

use tracing::debug;

use crate::formula::{FormulaError, ResourceChangeFormula};
use crate::store::FieldStore;

/// Current layout of persisted engine fields.
pub const FIELD_SCHEMA_VERSION: u32 = 1;

/// Persisted field names.
pub mod keys {
    pub const FIELD_VERSION: &str = "persistentFieldVersion";
    pub const HAS_PERSISTENT_THRUST: &str = "HasPersistentThrust";
    pub const PERSISTENT_THRUST: &str = "persistentThrust";
    pub const PERSISTENT_THROTTLE: &str = "persistentThrottle";
    pub const MAX_THRUST: &str = "maxThrust";
    pub const VESSEL_ALIGNMENT: &str = "vesselAlignmentWithAutopilotMode";
    pub const RESOURCE_CHANGE: &str = "persistentResourceChange";
    pub const AVERAGE_DENSITY: &str = "persistentAverageDensity";
    pub const ISP: &str = "persistentIsp";
    pub const TARGET_BODY_NAME: &str = "persistentVesselTargetBodyName";
    pub const TARGET_VESSEL_ID: &str = "persistentVesselTargetId";
    pub const MANEUVER_UT: &str = "persistentManeuverUT";
    pub const MANEUVER_TOLERANCE: &str = "maneuverToleranceInDegree";
    pub const MANEUVER_NEXT_PATCH: &str = "persistentManeuverNextPatch";
}

/// Bring a field store up to [`FIELD_SCHEMA_VERSION`].
///
/// Version 0 stores predate the explicit `HasPersistentThrust` flag; it is
/// derived from the persisted thrust. Stores already at (or past) the current
/// version are borrowed untouched.
pub fn migrated(store: &FieldStore) -> Cow<'_, FieldStore> {
    let version = store
        .get_raw(keys::FIELD_VERSION)
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .unwrap_or(0);
    if version >= FIELD_SCHEMA_VERSION {
        return Cow::Borrowed(store);
    }

    let mut upgraded = store.clone();
    if !upgraded.contains(keys::HAS_PERSISTENT_THRUST) {
        let active = upgraded
            .try_f64(keys::PERSISTENT_THRUST)
            .is_some_and(|thrust| thrust > 0.0);
        upgraded.set(keys::HAS_PERSISTENT_THRUST, if active { "True" } else { "False" });
    }
    upgraded.set(keys::FIELD_VERSION, FIELD_SCHEMA_VERSION);
    debug!(from = version, to = FIELD_SCHEMA_VERSION, "migrated persisted engine fields");
    Cow::Owned(upgraded)
}

/// Target and maneuver fields; each is `None` when absent from the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedTargeting {
    pub target_body_name: Option<String>,
    pub target_vessel_id: Option<String>,
    pub maneuver_ut: Option<f64>,
    pub maneuver_tolerance_deg: Option<f64>,
    pub maneuver_next_patch: Option<bool>,
}

/// Every persisted scalar a background tick needs, read once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedEngineFields {
    pub has_persistent_thrust: Option<bool>,
    pub persistent_thrust: Option<f64>,
    pub persistent_throttle: Option<f64>,
    pub max_thrust: Option<f64>,
    pub vessel_alignment: Option<f64>,
    /// `None` when no formula is persisted; `Some(Err)` when it does not parse.
    pub resource_change: Option<Result<ResourceChangeFormula, FormulaError>>,
    pub average_density: Option<f64>,
    pub isp: Option<f64>,
    pub targeting: PersistedTargeting,
}

impl PersistedEngineFields {
    pub fn read(store: &FieldStore) -> Self {
        let store = migrated(store);
        Self {
            has_persistent_thrust: store.try_bool(keys::HAS_PERSISTENT_THRUST),
            persistent_thrust: store.try_f64(keys::PERSISTENT_THRUST),
            persistent_throttle: store.try_f64(keys::PERSISTENT_THROTTLE),
            max_thrust: store.try_f32(keys::MAX_THRUST),
            vessel_alignment: store.try_f64(keys::VESSEL_ALIGNMENT),
            resource_change: store
                .try_string(keys::RESOURCE_CHANGE)
                .map(str::parse::<ResourceChangeFormula>),
            average_density: store.try_f64(keys::AVERAGE_DENSITY),
            isp: store.try_f32(keys::ISP),
            targeting: PersistedTargeting {
                target_body_name: store.try_string(keys::TARGET_BODY_NAME).map(str::to_string),
                target_vessel_id: store.try_string(keys::TARGET_VESSEL_ID).map(str::to_string),
                maneuver_ut: store.try_f64(keys::MANEUVER_UT),
                maneuver_tolerance_deg: store.try_f64(keys::MANEUVER_TOLERANCE),
                maneuver_next_patch: store.try_bool(keys::MANEUVER_NEXT_PATCH),
            },
        }
    }

    /// Persisted thrust × throttle, when both parse.
    pub fn requested_thrust(&self) -> Option<f64> {
        Some(self.persistent_thrust? * self.persistent_throttle?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_store_gains_thrust_flag() {
        let store: FieldStore = [(keys::PERSISTENT_THRUST, "4")].into_iter().collect();
        let upgraded = migrated(&store);
        assert!(matches!(upgraded, Cow::Owned(_)));
        assert_eq!(upgraded.try_bool(keys::HAS_PERSISTENT_THRUST), Some(true));

        let idle: FieldStore = [(keys::PERSISTENT_THRUST, "0")].into_iter().collect();
        assert_eq!(
            migrated(&idle).try_bool(keys::HAS_PERSISTENT_THRUST),
            Some(false)
        );
    }

    #[test]
    fn current_store_is_borrowed() {
        let store: FieldStore = [
            (keys::FIELD_VERSION, "1"),
            (keys::HAS_PERSISTENT_THRUST, "False"),
            (keys::PERSISTENT_THRUST, "4"),
        ]
        .into_iter()
        .collect();
        let view = migrated(&store);
        assert!(matches!(view, Cow::Borrowed(_)));
        assert_eq!(view.try_bool(keys::HAS_PERSISTENT_THRUST), Some(false));
    }

    #[test]
    fn reads_every_field_in_one_pass() {
        let store: FieldStore = [
            (keys::FIELD_VERSION, "1"),
            (keys::HAS_PERSISTENT_THRUST, "True"),
            (keys::PERSISTENT_THRUST, "10"),
            (keys::PERSISTENT_THROTTLE, "0.5"),
            (keys::VESSEL_ALIGNMENT, "0.999"),
            (keys::RESOURCE_CHANGE, "LiquidFuel=-1;Oxidizer=-1.1"),
            (keys::ISP, "320"),
            (keys::TARGET_BODY_NAME, "Mun"),
            (keys::MANEUVER_NEXT_PATCH, "False"),
        ]
        .into_iter()
        .collect();
        let fields = PersistedEngineFields::read(&store);

        assert_eq!(fields.has_persistent_thrust, Some(true));
        assert_eq!(fields.requested_thrust(), Some(5.0));
        assert_eq!(fields.isp, Some(320.0));
        assert_eq!(fields.average_density, None);
        assert_eq!(fields.max_thrust, None);
        assert!(matches!(fields.resource_change, Some(Ok(ref f)) if f.len() == 2));
        assert_eq!(fields.targeting.target_body_name.as_deref(), Some("Mun"));
        assert_eq!(fields.targeting.target_vessel_id, None);
        assert_eq!(fields.targeting.maneuver_next_patch, Some(false));
    }

    #[test]
    fn requested_thrust_needs_both_scalars() {
        let store: FieldStore = [(keys::PERSISTENT_THRUST, "10"), (keys::PERSISTENT_THROTTLE, "full")]
            .into_iter()
            .collect();
        assert_eq!(PersistedEngineFields::read(&store).requested_thrust(), None);
    }
}
