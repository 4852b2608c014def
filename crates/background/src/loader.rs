//! Builds a vessel's engine registry from its persisted parts.

use thrust_propulsion::{PropellantMixture, ResourceLibrary, build_propellant_list};
use thrust_snapshot::{PERSISTENT_ENGINE_MODULE, PartSnapshot, PersistedEngineFields, VesselSnapshot};
use tracing::{debug, info, warn};

use crate::parts::{PartCatalog, PartDefinition};
use crate::state::{EngineSnapshot, VesselBackgroundState};

/// Register the persistent engine on one part.
///
/// Returns the registered engine only when it has persisted thrust and so
/// needs background processing. `None` covers every other case: no
/// persistent engine on the part, an inactive engine, or incomplete engine
/// data. An inactive engine is still registered.
pub fn load_persistent_engine<'a>(
    part_index: usize,
    part: &PartSnapshot,
    state: &'a mut VesselBackgroundState,
    definition: Option<&PartDefinition>,
    library: &ResourceLibrary,
) -> Option<&'a EngineSnapshot> {
    let definition = definition.filter(|def| def.persistent)?;
    let (module_index, module) = part.find_module(PERSISTENT_ENGINE_MODULE)?;

    let fields = PersistedEngineFields::read(&module.fields);
    let persistent_thrust = fields.persistent_thrust.unwrap_or(0.0);

    let engine = EngineSnapshot {
        part_index,
        persistent_part_id: part.persistent_id,
        module_index,
        title: definition.title.clone(),
        max_thrust: 0.0,
        persistent_thrust,
        mixtures: Vec::new(),
        delta_v: 0.0,
        propellant_demand: 0.0,
    };
    if !state.register_engine(engine) {
        warn!(
            vessel = %state.vessel_id,
            persistent_id = part.persistent_id,
            "duplicate persistent part id; engine not registered"
        );
        return None;
    }

    if definition.engines.is_empty() {
        debug!(part = %definition.name, "part has no engine modules");
        return None;
    }

    let mut max_thrust = 0.0;
    let mut mixtures = Vec::with_capacity(definition.engines.len());
    for engine_def in &definition.engines {
        max_thrust += engine_def.max_thrust;
        let propellants = match build_propellant_list(&engine_def.propellants, library) {
            Ok(list) if !list.is_empty() => list,
            Ok(_) => {
                debug!(part = %definition.name, "engine module declares no propellants");
                return None;
            }
            Err(err) => {
                warn!(part = %definition.name, error = %err, "invalid propellant definition");
                return None;
            }
        };
        mixtures.push(PropellantMixture::new(propellants));
    }

    let engine = state.engine_mut(part.persistent_id)?;
    engine.max_thrust = max_thrust;
    engine.mixtures = mixtures;

    if persistent_thrust > 0.0 {
        state.has_any_active_persistent_engine = true;
        state.engine(part.persistent_id)
    } else {
        None
    }
}

/// Rebuild the whole registry from a vessel snapshot.
///
/// Returns how many engines need background processing.
pub fn rebuild_engines(
    state: &mut VesselBackgroundState,
    vessel: &VesselSnapshot,
    catalog: &PartCatalog,
    library: &ResourceLibrary,
) -> usize {
    state.clear_engines();
    let mut active = 0;
    for (part_index, part) in vessel.parts.iter().enumerate() {
        let definition = catalog.get(&part.part_name);
        if load_persistent_engine(part_index, part, state, definition, library).is_some() {
            active += 1;
        }
    }
    info!(
        vessel = %vessel.id,
        engines = state.engine_count(),
        active,
        "rebuilt background engine registry"
    );
    active
}
