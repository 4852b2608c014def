//! Background thrust for unloaded vessels.
//!
//! The member crates hold the physics and processing; this facade re-exports
//! them under short names and adds [`scenario`], which turns configuration
//! records into the runtime types a simulation needs.

pub use thrust_background as background;
pub use thrust_config as config;
pub use thrust_core as common;
pub use thrust_export as export;
pub use thrust_orbits as orbits;
pub use thrust_propulsion as propulsion;
pub use thrust_snapshot as snapshot;

pub mod scenario;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
