//! Rocket-equation helpers for a single discrete burn step.
//!
//! Thrust is in kN, masses in tonnes, isp in seconds. Every function is total:
//! a non-positive isp means no propulsion and a burn that would consume the
//! whole vessel yields zero delta-v.

use thrust_core::constants::G0;
use thrust_core::vector::{self, Vector3};

/// Propellant mass flow (t/s) for the given thrust and specific impulse.
pub fn mass_flow_rate(thrust: f64, isp: f64) -> f64 {
    if isp > 0.0 { thrust / (isp * G0) } else { 0.0 }
}

/// Mass expelled over `elapsed` seconds.
pub fn delta_mass(mass_flow_rate: f64, elapsed: f64) -> f64 {
    mass_flow_rate * elapsed
}

/// Units of propellant needed to expel `delta_mass` tonnes.
pub fn propellant_mass_demand(delta_mass: f64, average_density: f64) -> f64 {
    if average_density > 0.0 {
        delta_mass / average_density
    } else {
        0.0
    }
}

/// Tsiolkovsky delta-v (m/s) for burning `thrust` over `elapsed` seconds.
pub fn delta_v(vessel_mass: f64, elapsed: f64, thrust: f64, isp: f64) -> f64 {
    if isp <= 0.0 || vessel_mass <= 0.0 {
        return 0.0;
    }
    let expelled = delta_mass(mass_flow_rate(thrust, isp), elapsed);
    let remaining_mass = vessel_mass - expelled;
    let mass_ratio = if remaining_mass > 0.0 {
        vessel_mass / remaining_mass
    } else {
        1.0
    };
    isp * G0 * mass_ratio.ln()
}

/// [`delta_v`] scaled along `direction`.
pub fn delta_v_vector(
    vessel_mass: f64,
    elapsed: f64,
    thrust: f64,
    isp: f64,
    direction: &Vector3,
) -> Vector3 {
    vector::scale(direction, delta_v(vessel_mass, elapsed, thrust, isp))
}

/// Outcome of one burn step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurnStep {
    pub delta_v: f64,
    pub delta_v_vector: Vector3,
    /// Tonnes expelled.
    pub delta_mass: f64,
    /// Units of propellant drawn, given the mixture's average density.
    pub propellant_demand: f64,
}

/// Delta-v and propellant demand for one burn step along `direction`.
pub fn burn_step(
    average_density: f64,
    vessel_mass: f64,
    elapsed: f64,
    thrust: f64,
    isp: f64,
    direction: &Vector3,
) -> BurnStep {
    let expelled = delta_mass(mass_flow_rate(thrust, isp), elapsed);
    let dv = delta_v(vessel_mass, elapsed, thrust, isp);
    BurnStep {
        delta_v: dv,
        delta_v_vector: vector::scale(direction, dv),
        delta_mass: expelled,
        propellant_demand: propellant_mass_demand(expelled, average_density),
    }
}
