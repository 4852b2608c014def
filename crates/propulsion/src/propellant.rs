//! Propellant mixtures and their mass-ratio weighted density.

use thiserror::Error;

use crate::resources::ResourceLibrary;

/// Propellant entry as declared on an engine definition, before density lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPropellant {
    pub name: String,
    pub ratio: f64,
}

/// A propellant with its resolved density (tonnes per unit).
#[derive(Debug, Clone, PartialEq)]
pub struct PropellantSpec {
    pub name: String,
    pub ratio: f64,
    pub density: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum PropellantError {
    #[error("propellant '{name}' has negative mass ratio {ratio}")]
    NegativeRatio { name: String, ratio: f64 },
    #[error("propellant '{name}' has a non-finite mass ratio")]
    NonFiniteRatio { name: String },
}

/// Resolve densities for an engine's propellants.
///
/// Zero-ratio entries are kept. Resources missing from the library are treated
/// as massless.
pub fn build_propellant_list(
    raw: &[RawPropellant],
    library: &ResourceLibrary,
) -> Result<Vec<PropellantSpec>, PropellantError> {
    raw.iter()
        .map(|propellant| {
            if !propellant.ratio.is_finite() {
                return Err(PropellantError::NonFiniteRatio {
                    name: propellant.name.clone(),
                });
            }
            if propellant.ratio < 0.0 {
                return Err(PropellantError::NegativeRatio {
                    name: propellant.name.clone(),
                    ratio: propellant.ratio,
                });
            }
            Ok(PropellantSpec {
                name: propellant.name.clone(),
                ratio: propellant.ratio,
                density: library.density(&propellant.name).unwrap_or(0.0),
            })
        })
        .collect()
}

/// Σ(ratio × density) / Σ(ratio), or 0 when the ratios sum to 0.
pub fn average_density(propellants: &[PropellantSpec]) -> f64 {
    let total_ratio: f64 = propellants.iter().map(|p| p.ratio).sum();
    if total_ratio <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = propellants.iter().map(|p| p.ratio * p.density).sum();
    weighted / total_ratio
}

/// One thrust-producing sub-module's propellants with their cached average density.
#[derive(Debug, Clone, PartialEq)]
pub struct PropellantMixture {
    pub propellants: Vec<PropellantSpec>,
    pub average_density: f64,
}

impl PropellantMixture {
    pub fn new(propellants: Vec<PropellantSpec>) -> Self {
        let average_density = average_density(&propellants);
        Self {
            propellants,
            average_density,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.propellants.is_empty()
    }
}
