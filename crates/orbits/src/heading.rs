//! Heading commanded by each autopilot mode.
//!
//! Headings are direction vectors and are not normalized (except stability
//! assist, which uses the vessel's unit facing). Callers only rely on their
//! direction and on the zero vector meaning "no usable heading".

use std::fmt;

use thiserror::Error;
use thrust_core::vector::{self, Vector3};
use thrust_snapshot::AutopilotMode;

use crate::context::FlightContext;
use crate::kepler::KeplerOrbit;

/// The unloaded vessel's own trajectory and attitude.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselKinematics {
    pub orbit: KeplerOrbit,
    /// Direction the vessel's nose points ("up" in part space).
    pub facing: Vector3,
}

/// Something a vessel can point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetRef {
    Vessel(String),
    Body(String),
}

impl TargetRef {
    /// Resolve persisted target identifiers: a vessel id wins over a body name.
    ///
    /// An all-zero id (the host's empty GUID) counts as absent.
    pub fn from_persisted(vessel_id: &str, body_name: &str) -> Option<Self> {
        let vessel_id = vessel_id.trim();
        if !vessel_id.is_empty() && !is_nil_id(vessel_id) {
            return Some(TargetRef::Vessel(vessel_id.to_string()));
        }
        let body_name = body_name.trim();
        if !body_name.is_empty() {
            return Some(TargetRef::Body(body_name.to_string()));
        }
        None
    }
}

fn is_nil_id(id: &str) -> bool {
    id.chars().all(|c| c == '0' || c == '-')
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetRef::Vessel(id) => write!(f, "vessel {id}"),
            TargetRef::Body(name) => write!(f, "body {name}"),
        }
    }
}

/// A planned maneuver: the orbit after the burn, when it happens, and how
/// close is close enough.
#[derive(Debug, Clone, PartialEq)]
pub struct ManeuverPlan {
    pub patch: KeplerOrbit,
    pub ut: f64,
    pub tolerance_deg: f64,
}

/// An autopilot mode together with exactly the data it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum AutopilotCommand {
    StabilityAssist,
    Prograde,
    Retrograde,
    Normal,
    Antinormal,
    RadialIn,
    RadialOut,
    Target(TargetRef),
    AntiTarget(TargetRef),
    Maneuver(ManeuverPlan),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum HeadingError {
    #[error("no target is persisted")]
    NoTarget,
    #[error("{0} could not be found")]
    TargetNotFound(TargetRef),
    #[error("reference body '{0}' could not be found")]
    ReferenceBodyNotFound(String),
    #[error("no maneuver patch is planned")]
    NoManeuver,
    #[error("maneuver patch orbits '{patch}' but the vessel orbits '{vessel}'")]
    ManeuverFrameMismatch { patch: String, vessel: String },
    #[error("maneuver is complete within tolerance")]
    ManeuverComplete,
}

impl AutopilotCommand {
    /// Attach the data `mode` needs, or report what is missing.
    pub fn from_mode(
        mode: AutopilotMode,
        target: Option<TargetRef>,
        maneuver: Option<ManeuverPlan>,
    ) -> Result<Self, HeadingError> {
        Ok(match mode {
            AutopilotMode::StabilityAssist => AutopilotCommand::StabilityAssist,
            AutopilotMode::Prograde => AutopilotCommand::Prograde,
            AutopilotMode::Retrograde => AutopilotCommand::Retrograde,
            AutopilotMode::Normal => AutopilotCommand::Normal,
            AutopilotMode::Antinormal => AutopilotCommand::Antinormal,
            AutopilotMode::RadialIn => AutopilotCommand::RadialIn,
            AutopilotMode::RadialOut => AutopilotCommand::RadialOut,
            AutopilotMode::Target => AutopilotCommand::Target(target.ok_or(HeadingError::NoTarget)?),
            AutopilotMode::AntiTarget => {
                AutopilotCommand::AntiTarget(target.ok_or(HeadingError::NoTarget)?)
            }
            AutopilotMode::Maneuver => {
                AutopilotCommand::Maneuver(maneuver.ok_or(HeadingError::NoManeuver)?)
            }
        })
    }

    pub fn mode(&self) -> AutopilotMode {
        match self {
            AutopilotCommand::StabilityAssist => AutopilotMode::StabilityAssist,
            AutopilotCommand::Prograde => AutopilotMode::Prograde,
            AutopilotCommand::Retrograde => AutopilotMode::Retrograde,
            AutopilotCommand::Normal => AutopilotMode::Normal,
            AutopilotCommand::Antinormal => AutopilotMode::Antinormal,
            AutopilotCommand::RadialIn => AutopilotMode::RadialIn,
            AutopilotCommand::RadialOut => AutopilotMode::RadialOut,
            AutopilotCommand::Target(_) => AutopilotMode::Target,
            AutopilotCommand::AntiTarget(_) => AutopilotMode::AntiTarget,
            AutopilotCommand::Maneuver(_) => AutopilotMode::Maneuver,
        }
    }
}

/// Heading commanded by `command` at `ut`.
pub fn heading_vector(
    command: &AutopilotCommand,
    vessel: &VesselKinematics,
    flight: &dyn FlightContext,
    ut: f64,
) -> Result<Vector3, HeadingError> {
    let (radial, velocity) = vessel.orbit.state_at(ut);
    let heading = match command {
        AutopilotCommand::StabilityAssist => {
            if vector::is_zero(&vessel.facing) {
                vector::normalize(&velocity)
            } else {
                vector::normalize(&vessel.facing)
            }
        }
        AutopilotCommand::Prograde => velocity,
        AutopilotCommand::Retrograde => vector::neg(&velocity),
        AutopilotCommand::Normal => vector::cross(&velocity, &radial),
        AutopilotCommand::Antinormal => vector::neg(&vector::cross(&velocity, &radial)),
        AutopilotCommand::RadialIn => {
            vector::neg(&vector::cross(&velocity, &vector::cross(&velocity, &radial)))
        }
        AutopilotCommand::RadialOut => {
            vector::cross(&velocity, &vector::cross(&velocity, &radial))
        }
        AutopilotCommand::Target(target) => vector_to_target(target, vessel, flight, ut)?,
        AutopilotCommand::AntiTarget(target) => {
            vector::neg(&vector_to_target(target, vessel, flight, ut)?)
        }
        AutopilotCommand::Maneuver(plan) => thrust_vector_to_maneuver(&vessel.orbit, plan)?,
    };
    Ok(heading)
}

/// [`heading_vector`], with every unresolvable case collapsed to the zero vector.
pub fn heading_vector_or_zero(
    command: &AutopilotCommand,
    vessel: &VesselKinematics,
    flight: &dyn FlightContext,
    ut: f64,
) -> Vector3 {
    heading_vector(command, vessel, flight, ut).unwrap_or(vector::ZERO)
}

fn vector_to_target(
    target: &TargetRef,
    vessel: &VesselKinematics,
    flight: &dyn FlightContext,
    ut: f64,
) -> Result<Vector3, HeadingError> {
    let target_position = match target {
        TargetRef::Vessel(id) => flight.vessel_position_at(id, ut),
        TargetRef::Body(name) => flight.body_position_at(name, ut),
    }
    .ok_or_else(|| HeadingError::TargetNotFound(target.clone()))?;

    let reference = &vessel.orbit.reference_body;
    let body_position = flight
        .body_position_at(reference, ut)
        .ok_or_else(|| HeadingError::ReferenceBodyNotFound(reference.clone()))?;
    let vessel_position = vector::add(&body_position, &vessel.orbit.relative_position_at(ut));
    Ok(vector::sub(&target_position, &vessel_position))
}

/// Velocity change still needed to match the maneuver patch at the node.
///
/// Once the remaining change subtends less than the tolerance angle of the
/// planned velocity, the maneuver is complete.
fn thrust_vector_to_maneuver(
    orbit: &KeplerOrbit,
    plan: &ManeuverPlan,
) -> Result<Vector3, HeadingError> {
    if plan.patch.reference_body != orbit.reference_body {
        return Err(HeadingError::ManeuverFrameMismatch {
            patch: plan.patch.reference_body.clone(),
            vessel: orbit.reference_body.clone(),
        });
    }
    let planned = plan.patch.velocity_at(plan.ut);
    let current = orbit.velocity_at(plan.ut);
    let remaining = vector::sub(&planned, &current);
    let tolerance = plan.tolerance_deg.max(0.0).to_radians();
    if vector::norm(&remaining) <= vector::norm(&planned) * tolerance {
        return Err(HeadingError::ManeuverComplete);
    }
    Ok(remaining)
}
