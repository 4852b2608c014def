//! Orbit helpers for background thrust: Keplerian propagation, body and vessel
//! lookups, and the heading each autopilot mode commands.

pub mod context;
pub mod heading;
pub mod kepler;

pub use context::{CelestialBody, FlightContext, SolarSystem, Universe};
pub use heading::{
    AutopilotCommand, HeadingError, ManeuverPlan, TargetRef, VesselKinematics, heading_vector,
    heading_vector_or_zero,
};
pub use kepler::{KeplerOrbit, OrbitError};
