use serde::{Deserialize, Serialize};
use std::fmt;

/// Sound algorithm selected for a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneType {
    #[default]
    #[serde(alias = "sine")]
    Plain,
    #[serde(alias = "fm", alias = "epiano")]
    FmPatch,
    #[serde(alias = "shepard")]
    ShepardBank,
}

impl ToneType {
    pub const ALL: [ToneType; 3] = [ToneType::Plain, ToneType::FmPatch, ToneType::ShepardBank];

    /// Parse a user-facing tone name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "plain" | "sine" => Some(ToneType::Plain),
            "fm" | "epiano" | "fm_patch" => Some(ToneType::FmPatch),
            "shepard" | "shepard_bank" => Some(ToneType::ShepardBank),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ToneType::Plain => "Sine",
            ToneType::FmPatch => "E.Piano (FM)",
            ToneType::ShepardBank => "Shepard",
        }
    }
}

impl fmt::Display for ToneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Electric-piano FM patch constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FmPatch {
    /// Modulator frequency as a multiple of the carrier
    pub ratio: f64,
    /// Initial modulation depth as a multiple of the carrier frequency (Hz per Hz)
    pub index: f64,
    pub depth_floor: f32,
    /// Seconds for the depth to fall to `depth_floor`
    pub depth_decay: f64,
}

impl FmPatch {
    pub const EPIANO: FmPatch = FmPatch {
        ratio: 4.0,
        index: 1.5,
        depth_floor: 0.01,
        depth_decay: 0.5,
    };
}

/// Per-generator gain scales for the two routing profiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainProfile {
    /// Gain of the plain and FM carriers
    pub plain: f32,
    /// Multiplier applied to each Shepard partial weight
    pub shepard: f32,
}

impl GainProfile {
    /// Levels used in front of the bus limiter.
    pub const HARDENED: GainProfile = GainProfile {
        plain: 0.4,
        shepard: 0.2,
    };

    /// Levels used when voices feed the analyser directly.
    pub const UNPROTECTED: GainProfile = GainProfile {
        plain: 1.0,
        shepard: 0.3,
    };
}

impl Default for GainProfile {
    fn default() -> Self {
        Self::HARDENED
    }
}
