//! Configuration models and loaders for background thrust simulation.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use thrust_snapshot::VesselSnapshot;

/// Resource definition parsed from resource catalogs.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ResourceConfig {
    pub name: String,
    /// Tonnes per unit; zero or negative for massless resources such as electric charge.
    pub density: f64,
}

/// Part definition parsed from part catalogs.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PartConfig {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Whether the part carries a persistent engine module.
    #[serde(default = "default_true")]
    pub persistent: bool,
    #[serde(default)]
    pub engines: Vec<EngineModuleConfig>,
}

/// One thrust-producing module on a part.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EngineModuleConfig {
    /// Maximum thrust in kN.
    pub max_thrust: f64,
    #[serde(default)]
    pub propellants: Vec<PropellantConfig>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PropellantConfig {
    pub name: String,
    pub ratio: f64,
}

/// Simulation switches.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SettingsConfig {
    /// Minimum persisted alignment at which an engine fires.
    pub alignment_threshold: f64,
    /// Massless resources are never consumed.
    pub infinite_electricity: bool,
    /// Resources with mass are never consumed.
    pub infinite_propellant: bool,
    /// Another simulator owns background resource processing.
    pub external_background_simulation: bool,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            alignment_threshold: 0.995,
            infinite_electricity: false,
            infinite_propellant: false,
            external_background_simulation: false,
        }
    }
}

/// Keplerian elements; angles in degrees except the mean anomaly (radians).
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OrbitConfig {
    pub reference_body: String,
    pub semi_major_axis_m: f64,
    #[serde(default)]
    pub eccentricity: f64,
    #[serde(default)]
    pub inclination_deg: f64,
    #[serde(default)]
    pub longitude_ascending_node_deg: f64,
    #[serde(default)]
    pub argument_periapsis_deg: f64,
    #[serde(default)]
    pub mean_anomaly_at_epoch_rad: f64,
    #[serde(default)]
    pub epoch: f64,
}

/// Celestial body; the root body has no orbit.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BodyConfig {
    pub name: String,
    /// Gravitational parameter in m³/s².
    pub mu: f64,
    /// Mean radius in metres.
    pub radius: f64,
    #[serde(default)]
    pub orbit: Option<OrbitConfig>,
}

/// Another vessel that can be targeted.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct VesselOrbitConfig {
    pub id: String,
    pub orbit: OrbitConfig,
}

/// The unloaded vessel under simulation.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct UnloadedVesselConfig {
    pub snapshot: VesselSnapshot,
    pub orbit: OrbitConfig,
    /// Direction the vessel was facing when it was unloaded.
    #[serde(default)]
    pub facing: [f64; 3],
    /// Planned orbit after the next maneuver node.
    #[serde(default)]
    pub maneuver_patch: Option<OrbitConfig>,
}

/// A complete background simulation scenario.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScenarioConfig {
    /// Universal time at which simulation starts.
    #[serde(default)]
    pub ut: f64,
    pub bodies: Vec<BodyConfig>,
    #[serde(default)]
    pub vessels: Vec<VesselOrbitConfig>,
    pub vessel: UnloadedVesselConfig,
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read YAML: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load resource definitions from a YAML file or a directory of TOML files.
pub fn load_resources<P: AsRef<Path>>(path: P) -> Result<Vec<ResourceConfig>, ConfigError> {
    let resources: Vec<ResourceConfig> = load_records(path)?;
    for resource in &resources {
        if !resource.density.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "resource {} has a non-finite density",
                resource.name
            )));
        }
    }
    Ok(resources)
}

/// Load part definitions from a YAML file or a directory of TOML files.
pub fn load_parts<P: AsRef<Path>>(path: P) -> Result<Vec<PartConfig>, ConfigError> {
    let parts: Vec<PartConfig> = load_records(path)?;
    for part in &parts {
        for engine in &part.engines {
            if !engine.max_thrust.is_finite() || engine.max_thrust < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "part {} has invalid max_thrust {}",
                    part.name, engine.max_thrust
                )));
            }
        }
    }
    Ok(parts)
}

/// Load simulation settings from a TOML or YAML file.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<SettingsConfig, ConfigError> {
    let settings: SettingsConfig = load_document(path)?;
    if !(-1.0..=1.0).contains(&settings.alignment_threshold) {
        return Err(ConfigError::Invalid(format!(
            "alignment_threshold {} is outside [-1, 1]",
            settings.alignment_threshold
        )));
    }
    Ok(settings)
}

/// Load a scenario from a YAML or TOML file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    let scenario: ScenarioConfig = load_document(path)?;
    if scenario.bodies.is_empty() {
        return Err(ConfigError::Invalid("scenario defines no bodies".into()));
    }
    Ok(scenario)
}

fn load_document<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn settings_default_when_keys_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "infinite_electricity = true\n").unwrap();
        let settings = load_settings(&path).unwrap();
        assert!(settings.infinite_electricity);
        assert!(!settings.infinite_propellant);
        assert!((settings.alignment_threshold - 0.995).abs() < 1e-12);
    }

    #[test]
    fn settings_reject_out_of_range_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "alignment_threshold = 1.5\n").unwrap();
        assert!(matches!(load_settings(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn parts_directory_reads_sorted_toml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("b_ion.toml"),
            "name = \"ionEngine\"\n[[engines]]\nmax_thrust = 2.0\n[[engines.propellants]]\nname = \"XenonGas\"\nratio = 0.1\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("a_battery.toml"),
            "name = \"batteryPack\"\npersistent = false\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let parts = load_parts(dir.path()).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, "batteryPack");
        assert!(!parts[0].persistent);
        assert!(parts[1].persistent);
        assert_eq!(parts[1].engines[0].propellants[0].name, "XenonGas");
    }

    #[test]
    fn resources_yaml_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources.yaml");
        fs::write(
            &path,
            "- name: LiquidFuel\n  density: 0.005\n- name: ElectricCharge\n  density: 0\n",
        )
        .unwrap();
        let resources = load_resources(&path).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[1].density, 0.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_resources("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
