//! Conversion from configuration records to runtime simulation inputs.

use thiserror::Error;
use thrust_background::{BackgroundSettings, EngineDefinition, PartCatalog, PartDefinition};
use thrust_config::{
    BodyConfig, OrbitConfig, PartConfig, ResourceConfig, ScenarioConfig, SettingsConfig,
};
use thrust_core::units::deg_to_rad;
use thrust_orbits::{
    CelestialBody, KeplerOrbit, OrbitError, SolarSystem, Universe, VesselKinematics,
};
use thrust_propulsion::{CheatOptions, RawPropellant, ResourceDefinition, ResourceLibrary};
use thrust_snapshot::VesselSnapshot;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("orbit of {owner} references unknown body {body}")]
    UnknownBody { owner: String, body: String },
    #[error("invalid orbit for {owner}: {source}")]
    InvalidOrbit {
        owner: String,
        #[source]
        source: OrbitError,
    },
}

/// Everything needed to run background ticks for one unloaded vessel.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub universe: Universe,
    pub kinematics: VesselKinematics,
    pub snapshot: VesselSnapshot,
    pub maneuver_patch: Option<KeplerOrbit>,
    /// Universal time at which simulation starts.
    pub ut: f64,
}

/// Build a resource library with the cheat switches from `settings`.
pub fn resource_library(resources: &[ResourceConfig], settings: &SettingsConfig) -> ResourceLibrary {
    let cheats = CheatOptions {
        infinite_electricity: settings.infinite_electricity,
        infinite_propellant: settings.infinite_propellant,
    };
    ResourceLibrary::new(
        resources.iter().map(|resource| ResourceDefinition {
            name: resource.name.clone(),
            density: resource.density,
        }),
        cheats,
    )
}

pub fn part_catalog(parts: &[PartConfig]) -> PartCatalog {
    PartCatalog::new(parts.iter().map(part_definition))
}

pub fn background_settings(settings: &SettingsConfig) -> BackgroundSettings {
    BackgroundSettings {
        alignment_threshold: settings.alignment_threshold,
        external_background_simulation: settings.external_background_simulation,
    }
}

fn part_definition(part: &PartConfig) -> PartDefinition {
    PartDefinition {
        name: part.name.clone(),
        title: part.title.clone().unwrap_or_else(|| part.name.clone()),
        persistent: part.persistent,
        engines: part
            .engines
            .iter()
            .map(|engine| EngineDefinition {
                max_thrust: engine.max_thrust,
                propellants: engine
                    .propellants
                    .iter()
                    .map(|propellant| RawPropellant {
                        name: propellant.name.clone(),
                        ratio: propellant.ratio,
                    })
                    .collect(),
            })
            .collect(),
    }
}

impl TryFrom<&ScenarioConfig> for Scenario {
    type Error = ScenarioError;

    fn try_from(config: &ScenarioConfig) -> Result<Self, Self::Error> {
        let mut system = SolarSystem::default();
        for body in &config.bodies {
            let orbit = body
                .orbit
                .as_ref()
                .map(|orbit| kepler_orbit(&body.name, orbit, &config.bodies))
                .transpose()?;
            system.insert(CelestialBody {
                name: body.name.clone(),
                mu: body.mu,
                radius: body.radius,
                orbit,
            });
        }

        let mut universe = Universe::new(system);
        for vessel in &config.vessels {
            if vessel.id == config.vessel.snapshot.id {
                warn!(vessel = %vessel.id, "live vessel shares the unloaded vessel's id; skipped");
                continue;
            }
            let orbit = kepler_orbit(&vessel.id, &vessel.orbit, &config.bodies)?;
            universe.add_vessel(vessel.id.clone(), orbit);
        }

        let unloaded = &config.vessel;
        let owner = &unloaded.snapshot.id;
        let orbit = kepler_orbit(owner, &unloaded.orbit, &config.bodies)?;
        let maneuver_patch = unloaded
            .maneuver_patch
            .as_ref()
            .map(|patch| kepler_orbit(owner, patch, &config.bodies))
            .transpose()?;
        universe.add_vessel(owner.clone(), orbit.clone());

        Ok(Scenario {
            universe,
            kinematics: VesselKinematics {
                orbit,
                facing: unloaded.facing,
            },
            snapshot: unloaded.snapshot.clone(),
            maneuver_patch,
            ut: config.ut,
        })
    }
}

fn kepler_orbit(
    owner: &str,
    orbit: &OrbitConfig,
    bodies: &[BodyConfig],
) -> Result<KeplerOrbit, ScenarioError> {
    let parent = bodies
        .iter()
        .find(|body| body.name == orbit.reference_body)
        .ok_or_else(|| ScenarioError::UnknownBody {
            owner: owner.to_string(),
            body: orbit.reference_body.clone(),
        })?;
    let kepler = KeplerOrbit {
        reference_body: parent.name.clone(),
        mu: parent.mu,
        semi_major_axis: orbit.semi_major_axis_m,
        eccentricity: orbit.eccentricity,
        inclination: deg_to_rad(orbit.inclination_deg),
        longitude_ascending_node: deg_to_rad(orbit.longitude_ascending_node_deg),
        argument_periapsis: deg_to_rad(orbit.argument_periapsis_deg),
        mean_anomaly_at_epoch: orbit.mean_anomaly_at_epoch_rad,
        epoch: orbit.epoch,
    };
    kepler
        .validate()
        .map_err(|source| ScenarioError::InvalidOrbit {
            owner: owner.to_string(),
            source,
        })?;
    Ok(kepler)
}
