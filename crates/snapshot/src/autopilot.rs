//! Persisted autopilot mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Autopilot modes, in the host's persisted ordinal order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AutopilotMode {
    #[default]
    StabilityAssist,
    Prograde,
    Retrograde,
    Normal,
    Antinormal,
    RadialIn,
    RadialOut,
    Target,
    AntiTarget,
    Maneuver,
}

impl AutopilotMode {
    pub const ALL: [AutopilotMode; 10] = [
        AutopilotMode::StabilityAssist,
        AutopilotMode::Prograde,
        AutopilotMode::Retrograde,
        AutopilotMode::Normal,
        AutopilotMode::Antinormal,
        AutopilotMode::RadialIn,
        AutopilotMode::RadialOut,
        AutopilotMode::Target,
        AutopilotMode::AntiTarget,
        AutopilotMode::Maneuver,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AutopilotMode::StabilityAssist => "StabilityAssist",
            AutopilotMode::Prograde => "Prograde",
            AutopilotMode::Retrograde => "Retrograde",
            AutopilotMode::Normal => "Normal",
            AutopilotMode::Antinormal => "Antinormal",
            AutopilotMode::RadialIn => "RadialIn",
            AutopilotMode::RadialOut => "RadialOut",
            AutopilotMode::Target => "Target",
            AutopilotMode::AntiTarget => "AntiTarget",
            AutopilotMode::Maneuver => "Maneuver",
        }
    }

    /// Mode for a persisted ordinal.
    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("unknown autopilot mode '{0}'")]
pub struct ParseAutopilotModeError(pub String);

impl FromStr for AutopilotMode {
    type Err = ParseAutopilotModeError;

    /// Accepts either the mode name (case-insensitive) or its ordinal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(ordinal) = trimmed.parse::<usize>() {
            return Self::from_ordinal(ordinal)
                .ok_or_else(|| ParseAutopilotModeError(s.to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseAutopilotModeError(s.to_string()))
    }
}

impl fmt::Display for AutopilotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
