//! Persisted vessel snapshots and the typed view over their module field storage.
//!
//! Hosts persist engine state as string-keyed scalars. This crate owns that
//! representation ([`FieldStore`]) and the single deserialization pass that
//! turns it into [`PersistedEngineFields`].

pub mod autopilot;
pub mod fields;
pub mod formula;
pub mod store;
pub mod vessel;

pub use autopilot::{AutopilotMode, ParseAutopilotModeError};
pub use fields::{FIELD_SCHEMA_VERSION, PersistedEngineFields, PersistedTargeting, keys, migrated};
pub use formula::{FormulaError, ResourceChangeFormula, ResourceRate};
pub use store::FieldStore;
pub use vessel::{ModuleSnapshot, PERSISTENT_ENGINE_MODULE, PartSnapshot, VesselSnapshot};
