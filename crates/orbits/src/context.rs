//! Read-only lookups of celestial bodies and live vessels.

use std::collections::BTreeMap;

use thrust_core::vector::{self, Vector3};

use crate::kepler::KeplerOrbit;

/// Body-chain depth past which a lookup is treated as a cycle.
const MAX_BODY_DEPTH: usize = 16;

/// Positions of bodies and vessels at a given time, in one shared inertial frame.
pub trait FlightContext {
    /// Position of the body named exactly `name`.
    fn body_position_at(&self, name: &str, ut: f64) -> Option<Vector3>;
    /// Position of the live vessel with exactly this id.
    fn vessel_position_at(&self, id: &str, ut: f64) -> Option<Vector3>;
}

/// A celestial body. The root body has no orbit and sits at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialBody {
    pub name: String,
    pub mu: f64,
    pub radius: f64,
    pub orbit: Option<KeplerOrbit>,
}

/// Every known body, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SolarSystem {
    bodies: BTreeMap<String, CelestialBody>,
}

impl SolarSystem {
    pub fn new<I>(bodies: I) -> Self
    where
        I: IntoIterator<Item = CelestialBody>,
    {
        Self {
            bodies: bodies
                .into_iter()
                .map(|body| (body.name.clone(), body))
                .collect(),
        }
    }

    pub fn insert(&mut self, body: CelestialBody) {
        self.bodies.insert(body.name.clone(), body);
    }

    pub fn body(&self, name: &str) -> Option<&CelestialBody> {
        self.bodies.get(name)
    }

    /// Inertial position of a body, chaining through its parents.
    pub fn body_position_at(&self, name: &str, ut: f64) -> Option<Vector3> {
        let mut position = vector::ZERO;
        let mut current = self.body(name)?;
        for _ in 0..MAX_BODY_DEPTH {
            match &current.orbit {
                None => return Some(position),
                Some(orbit) => {
                    position = vector::add(&position, &orbit.relative_position_at(ut));
                    current = self.body(&orbit.reference_body)?;
                }
            }
        }
        None
    }

    /// Inertial position of anything on `orbit`.
    pub fn orbit_position_at(&self, orbit: &KeplerOrbit, ut: f64) -> Option<Vector3> {
        let body = self.body_position_at(&orbit.reference_body, ut)?;
        Some(vector::add(&body, &orbit.relative_position_at(ut)))
    }
}

/// Bodies plus the live vessels that can be targeted.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    pub system: SolarSystem,
    vessels: BTreeMap<String, KeplerOrbit>,
}

impl Universe {
    pub fn new(system: SolarSystem) -> Self {
        Self {
            system,
            vessels: BTreeMap::new(),
        }
    }

    pub fn add_vessel(&mut self, id: impl Into<String>, orbit: KeplerOrbit) {
        self.vessels.insert(id.into(), orbit);
    }

    pub fn vessel_orbit(&self, id: &str) -> Option<&KeplerOrbit> {
        self.vessels.get(id)
    }
}

impl FlightContext for Universe {
    fn body_position_at(&self, name: &str, ut: f64) -> Option<Vector3> {
        self.system.body_position_at(name, ut)
    }

    fn vessel_position_at(&self, id: &str, ut: f64) -> Option<Vector3> {
        let orbit = self.vessels.get(id)?;
        self.system.orbit_position_at(orbit, ut)
    }
}
