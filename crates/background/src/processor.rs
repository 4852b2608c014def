//! Per-tick background processing of a vessel's persistent engines.

use std::collections::BTreeMap;
use std::fmt;

use thrust_core::vector::{self, Vector3};
use thrust_orbits::FlightContext;
use thrust_propulsion::{ResourceLibrary, burn_step};
use thrust_snapshot::{PersistedEngineFields, ResourceChangeFormula, VesselSnapshot};
use tracing::{debug, warn};

use crate::state::{ResourceChangeRequest, ResourceLedger, VesselBackgroundState};

/// Minimum alignment (cosine between vessel heading and the autopilot
/// direction) at which an engine fires, about 5.7°.
pub const ALIGNMENT_THRESHOLD: f64 = 0.995;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundSettings {
    pub alignment_threshold: f64,
    /// Another background simulator owns resource processing; engines stay idle.
    pub external_background_simulation: bool,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            alignment_threshold: ALIGNMENT_THRESHOLD,
            external_background_simulation: false,
        }
    }
}

/// Read-only inputs shared by every engine in one tick.
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    /// Universal time at the start of the step.
    pub ut: f64,
    /// Step length in seconds.
    pub elapsed: f64,
    pub library: &'a ResourceLibrary,
    pub flight: &'a dyn FlightContext,
    pub settings: &'a BackgroundSettings,
}

/// Why an engine did nothing this tick.
#[derive(Debug, Clone, PartialEq)]
pub enum IdleReason {
    SnapshotMissing,
    NoPersistentThrust,
    DeferredToExternal,
    MissingEngineRecord,
    ThrustDisabled,
    ThrustUnavailable,
    NoThrustRequested,
    Misaligned { alignment: Option<f64> },
    NoResourceChange,
    MalformedResourceChange { error: String },
    ZeroRate,
    NoHeading { cause: Option<String> },
    MissingIsp,
    MissingAverageDensity,
    InsufficientPropellant,
}

impl IdleReason {
    pub fn label(&self) -> &'static str {
        match self {
            IdleReason::SnapshotMissing => "snapshot_missing",
            IdleReason::NoPersistentThrust => "no_persistent_thrust",
            IdleReason::DeferredToExternal => "deferred_to_external",
            IdleReason::MissingEngineRecord => "missing_engine_record",
            IdleReason::ThrustDisabled => "thrust_disabled",
            IdleReason::ThrustUnavailable => "thrust_unavailable",
            IdleReason::NoThrustRequested => "no_thrust_requested",
            IdleReason::Misaligned { .. } => "misaligned",
            IdleReason::NoResourceChange => "no_resource_change",
            IdleReason::MalformedResourceChange { .. } => "malformed_resource_change",
            IdleReason::ZeroRate => "zero_rate",
            IdleReason::NoHeading { .. } => "no_heading",
            IdleReason::MissingIsp => "missing_isp",
            IdleReason::MissingAverageDensity => "missing_average_density",
            IdleReason::InsufficientPropellant => "insufficient_propellant",
        }
    }
}

impl fmt::Display for IdleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdleReason::Misaligned {
                alignment: Some(alignment),
            } => write!(f, "misaligned ({alignment:.4})"),
            IdleReason::MalformedResourceChange { error } => {
                write!(f, "malformed resource change: {error}")
            }
            IdleReason::NoHeading { cause: Some(cause) } => write!(f, "no heading: {cause}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Result of one engine's background update.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundUpdate {
    /// Nothing happened.
    Idle { title: String, reason: IdleReason },
    /// Propellant was drawn and delta-v produced.
    Applied {
        title: String,
        requests: Vec<ResourceChangeRequest>,
        fuel_requirement_met: f64,
        /// Effective thrust (kN) after scaling by the fuel requirement.
        thrust: f64,
        delta_v: f64,
        delta_v_vector: Vector3,
        propellant_demand: f64,
    },
}

impl BackgroundUpdate {
    /// Part title, for diagnostics.
    pub fn title(&self) -> &str {
        match self {
            BackgroundUpdate::Idle { title, .. } | BackgroundUpdate::Applied { title, .. } => title,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, BackgroundUpdate::Applied { .. })
    }

    fn idle(title: &str, reason: IdleReason) -> Self {
        BackgroundUpdate::Idle {
            title: title.to_string(),
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutcome {
    pub persistent_part_id: u32,
    pub update: BackgroundUpdate,
}

/// Summary of one vessel tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub ut: f64,
    pub elapsed: f64,
    /// The vessel was landed or splashed and nothing was processed.
    pub landed: bool,
    pub total_persistent_thrust: f64,
    pub outcomes: Vec<EngineOutcome>,
    /// Merged resource changes, by resource name.
    pub resource_changes: BTreeMap<String, f64>,
    /// Sum of every applied engine's delta-v vector.
    pub delta_v_vector: Vector3,
}

impl TickReport {
    fn new(ctx: &TickContext<'_>) -> Self {
        Self {
            ut: ctx.ut,
            elapsed: ctx.elapsed,
            landed: false,
            total_persistent_thrust: 0.0,
            outcomes: Vec::new(),
            resource_changes: BTreeMap::new(),
            delta_v_vector: vector::ZERO,
        }
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.update.is_applied()).count()
    }

    pub fn delta_v(&self) -> f64 {
        vector::norm(&self.delta_v_vector)
    }
}

/// Process every registered engine of an unloaded vessel for one step.
///
/// Resource changes are applied to `ledger` as each engine produces them and
/// are also accumulated in `state.resource_changes`.
pub fn process_unloaded_engines(
    state: &mut VesselBackgroundState,
    vessel: &VesselSnapshot,
    ledger: &mut dyn ResourceLedger,
    ctx: &TickContext<'_>,
) -> TickReport {
    let mut report = TickReport::new(ctx);
    state.sync_from_snapshot(vessel);
    state.resource_changes.clear();
    state.total_persistent_thrust = 0.0;

    if vessel.landed_or_splashed() {
        debug!(vessel = %vessel.id, "vessel landed or splashed; background thrust skipped");
        report.landed = true;
        return report;
    }

    for id in state.engine_ids() {
        let Some(engine) = state.engine(id) else {
            continue;
        };
        let (part_index, module_index) = (engine.part_index, engine.module_index);
        let title = engine.title.clone();

        // The snapshot arrays may have been rebuilt since registration.
        let module = vessel
            .parts
            .get(part_index)
            .filter(|part| part.persistent_id == id)
            .and_then(|_| vessel.module_at(part_index, module_index));
        let Some(module) = module else {
            warn!(vessel = %vessel.id, persistent_id = id, "engine snapshot no longer present");
            report.outcomes.push(EngineOutcome {
                persistent_part_id: id,
                update: BackgroundUpdate::idle(&title, IdleReason::SnapshotMissing),
            });
            continue;
        };

        let fields = PersistedEngineFields::read(&module.fields);
        let thrust = fields.persistent_thrust.unwrap_or(0.0);
        if let Some(engine) = state.engine_mut(id) {
            engine.persistent_thrust = thrust;
            if thrust > 0.0 {
                engine.max_thrust = fields.max_thrust.filter(|max| *max > 0.0).unwrap_or(thrust);
            }
        }
        if thrust <= 0.0 {
            report.outcomes.push(EngineOutcome {
                persistent_part_id: id,
                update: BackgroundUpdate::idle(&title, IdleReason::NoPersistentThrust),
            });
            continue;
        }

        state.total_persistent_thrust += thrust;

        let update = if ctx.settings.external_background_simulation {
            BackgroundUpdate::idle(&title, IdleReason::DeferredToExternal)
        } else {
            background_update_execution(state, id, &fields, ctx)
        };

        if let BackgroundUpdate::Applied {
            requests,
            delta_v_vector,
            ..
        } = &update
        {
            for request in requests {
                ledger.apply(&request.resource, request.amount);
                state.record_resource_change(request);
            }
            report.delta_v_vector = vector::add(&report.delta_v_vector, delta_v_vector);
        }
        report.outcomes.push(EngineOutcome {
            persistent_part_id: id,
            update,
        });
    }

    report.total_persistent_thrust = state.total_persistent_thrust;
    report.resource_changes.clone_from(&state.resource_changes);
    report
}

/// Run the gate sequence for one engine and, if every gate passes, draw
/// propellant and compute this tick's delta-v.
///
/// The first failing gate decides the [`IdleReason`]. On success the engine
/// record's `delta_v` and `propellant_demand` are updated.
pub fn background_update_execution(
    state: &mut VesselBackgroundState,
    persistent_part_id: u32,
    fields: &PersistedEngineFields,
    ctx: &TickContext<'_>,
) -> BackgroundUpdate {
    let Some(engine) = state.engine(persistent_part_id) else {
        warn!(
            vessel = %state.vessel_id,
            persistent_id = persistent_part_id,
            "no engine data registered for part"
        );
        return BackgroundUpdate::idle(
            &format!("part {persistent_part_id}"),
            IdleReason::MissingEngineRecord,
        );
    };
    let title = engine.title.clone();
    let idle = |reason: IdleReason| {
        debug!(part = %title, %reason, "engine idle");
        BackgroundUpdate::idle(&title, reason)
    };

    if fields.has_persistent_thrust != Some(true) {
        return idle(IdleReason::ThrustDisabled);
    }
    let Some(requested_thrust) = fields.requested_thrust() else {
        return idle(IdleReason::ThrustUnavailable);
    };
    if requested_thrust <= 0.0 {
        return idle(IdleReason::NoThrustRequested);
    }
    match fields.vessel_alignment {
        Some(alignment) if alignment >= ctx.settings.alignment_threshold => {}
        alignment => return idle(IdleReason::Misaligned { alignment }),
    }
    let formula = match &fields.resource_change {
        None => return idle(IdleReason::NoResourceChange),
        Some(Err(err)) => {
            return idle(IdleReason::MalformedResourceChange {
                error: err.to_string(),
            });
        }
        Some(Ok(formula)) => formula,
    };
    if formula.has_zero_rate() {
        return idle(IdleReason::ZeroRate);
    }

    state.targeting.merge(&fields.targeting);
    if let Err(err) = state.refresh_heading(ctx.flight, ctx.ut) {
        return idle(IdleReason::NoHeading {
            cause: Some(err.to_string()),
        });
    }
    if vector::is_zero(&state.heading_vector) {
        return idle(IdleReason::NoHeading { cause: None });
    }

    let Some(isp) = fields.isp else {
        return idle(IdleReason::MissingIsp);
    };
    let Some(average_density) = fields.average_density else {
        return idle(IdleReason::MissingAverageDensity);
    };

    let met = fuel_requirement_met(formula, &state.available_resources, ctx.library, ctx.elapsed);
    if met <= 0.0 {
        return idle(IdleReason::InsufficientPropellant);
    }

    let requests: Vec<ResourceChangeRequest> = formula
        .iter()
        .filter(|rate| !ctx.library.is_exempt(&rate.resource))
        .map(|rate| ResourceChangeRequest {
            resource: rate.resource.clone(),
            amount: rate.rate * met * ctx.elapsed,
        })
        .collect();

    let thrust = requested_thrust * met;
    let direction = vector::normalize(&state.heading_vector);
    let burn = burn_step(
        average_density,
        state.vessel_mass(ctx.library),
        ctx.elapsed,
        thrust,
        isp,
        &direction,
    );

    if let Some(engine) = state.engine_mut(persistent_part_id) {
        engine.delta_v = burn.delta_v;
        engine.propellant_demand = burn.propellant_demand;
    }
    debug!(
        part = %title,
        fuel_requirement_met = met,
        thrust,
        delta_v = burn.delta_v,
        "engine applied"
    );

    BackgroundUpdate::Applied {
        title,
        requests,
        fuel_requirement_met: met,
        thrust,
        delta_v: burn.delta_v,
        delta_v_vector: burn.delta_v_vector,
        propellant_demand: burn.propellant_demand,
    }
}

/// Fraction (0..=1) of the requested draw the vessel can supply over `elapsed`.
///
/// Each resource contributes `available / required`; a resource that is
/// missing, empty, or not actually consumed contributes 0. Resources exempted
/// by a cheat switch always count as fully supplied.
pub fn fuel_requirement_met(
    formula: &ResourceChangeFormula,
    available: &BTreeMap<String, f64>,
    library: &ResourceLibrary,
    elapsed: f64,
) -> f64 {
    formula.iter().fold(1.0_f64, |met, rate| {
        if library.is_exempt(&rate.resource) {
            return met;
        }
        let required = -rate.rate * elapsed;
        let ratio = match available.get(&rate.resource) {
            Some(&amount) if amount > 0.0 && required > 0.0 => amount / required,
            _ => 0.0,
        };
        met.min(ratio)
    })
}
