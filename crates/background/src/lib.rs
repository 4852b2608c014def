//! Background thrust for vessels that only exist as persisted snapshots.
//!
//! [`loader`] builds a vessel's engine registry when it goes unloaded;
//! [`processor`] runs once per simulation step, drawing propellant and
//! computing delta-v for every engine that is allowed to fire.

pub mod loader;
pub mod parts;
pub mod processor;
pub mod state;

pub use loader::{load_persistent_engine, rebuild_engines};
pub use parts::{EngineDefinition, PartCatalog, PartDefinition};
pub use processor::{
    ALIGNMENT_THRESHOLD, BackgroundSettings, BackgroundUpdate, EngineOutcome, IdleReason,
    TickContext, TickReport, background_update_execution, fuel_requirement_met,
    process_unloaded_engines,
};
pub use state::{
    EngineSnapshot, ResourceChangeRequest, ResourceLedger, VesselBackgroundState,
    VesselTargeting,
};
