//! Persisted resource-change formula: `name=rate` entries separated by `;`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A resource and its signed per-second rate (negative for consumption).
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRate {
    pub resource: String,
    pub rate: f64,
}

/// Parsed resource-change formula, in persisted order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceChangeFormula {
    rates: Vec<ResourceRate>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FormulaError {
    #[error("resource-change formula is empty")]
    Empty,
    #[error("entry '{0}' is not of the form name=rate")]
    MalformedEntry(String),
    #[error("entry '{entry}' has an unparsable rate")]
    InvalidRate { entry: String },
    #[error("resource '{0}' appears more than once")]
    DuplicateResource(String),
}

impl ResourceChangeFormula {
    pub fn new(rates: Vec<ResourceRate>) -> Result<Self, FormulaError> {
        if rates.is_empty() {
            return Err(FormulaError::Empty);
        }
        for (i, rate) in rates.iter().enumerate() {
            if rates[..i].iter().any(|r| r.resource == rate.resource) {
                return Err(FormulaError::DuplicateResource(rate.resource.clone()));
            }
        }
        Ok(Self { rates })
    }

    pub fn rates(&self) -> &[ResourceRate] {
        &self.rates
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceRate> {
        self.rates.iter()
    }

    /// A rate of exactly zero marks the persisted formula as unusable.
    pub fn has_zero_rate(&self) -> bool {
        self.rates.iter().any(|r| r.rate == 0.0)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl FromStr for ResourceChangeFormula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rates = Vec::new();
        // A trailing separator is tolerated.
        for entry in s.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, rate) = entry
                .split_once('=')
                .ok_or_else(|| FormulaError::MalformedEntry(entry.to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(FormulaError::MalformedEntry(entry.to_string()));
            }
            let rate = rate
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|r| r.is_finite())
                .ok_or_else(|| FormulaError::InvalidRate {
                    entry: entry.to_string(),
                })?;
            rates.push(ResourceRate {
                resource: name.to_string(),
                rate,
            });
        }
        Self::new(rates)
    }
}

impl fmt::Display for ResourceChangeFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rate) in self.rates.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}={}", rate.resource, rate.rate)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_in_order() {
        let formula: ResourceChangeFormula = "LiquidFuel=-1; Oxidizer=-1.1".parse().unwrap();
        let names: Vec<_> = formula.iter().map(|r| r.resource.as_str()).collect();
        assert_eq!(names, ["LiquidFuel", "Oxidizer"]);
        assert_eq!(formula.rates()[1].rate, -1.1);
        assert!(!formula.has_zero_rate());
        assert_eq!(formula.to_string(), "LiquidFuel=-1;Oxidizer=-1.1");
    }

    #[test]
    fn zero_rate_is_detected() {
        let formula: ResourceChangeFormula = "XenonGas=-0.2;ElectricCharge=0".parse().unwrap();
        assert!(formula.has_zero_rate());
    }

    #[test]
    fn malformed_formulas_are_errors() {
        assert_eq!(
            "".parse::<ResourceChangeFormula>().unwrap_err(),
            FormulaError::Empty
        );
        assert!(matches!(
            "LiquidFuel".parse::<ResourceChangeFormula>(),
            Err(FormulaError::MalformedEntry(_))
        ));
        assert!(matches!(
            "LiquidFuel=lots".parse::<ResourceChangeFormula>(),
            Err(FormulaError::InvalidRate { .. })
        ));
        assert_eq!(
            "A=-1;A=-2".parse::<ResourceChangeFormula>().unwrap_err(),
            FormulaError::DuplicateResource("A".into())
        );
    }
}
