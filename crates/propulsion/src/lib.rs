//! Propellant mixtures, resource definitions, and rocket-equation helpers.

pub mod deltav;
pub mod propellant;
pub mod resources;

pub use deltav::{
    BurnStep, burn_step, delta_mass, delta_v, delta_v_vector, mass_flow_rate,
    propellant_mass_demand,
};
pub use propellant::{
    PropellantError, PropellantMixture, PropellantSpec, RawPropellant, average_density,
    build_propellant_list,
};
pub use resources::{CheatOptions, ResourceDefinition, ResourceLibrary};
