//! Climate vocabulary shared by every heating/cooling integration.
//!
//! The coarse [`HvacMode`] says *whether and how* a climate entity is
//! regulating; the [`PresetMode`] carries the semantic intent (comfort,
//! eco, away) independently of it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::EntityState;
use crate::error::ValidationError;

/// Coarse operating mode of a climate entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HvacMode {
    Off,
    Heat,
    Auto,
}

impl HvacMode {
    /// Wire name used in service data and attributes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Heat => "heat",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvacMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "heat" => Ok(Self::Heat),
            "auto" => Ok(Self::Auto),
            other => Err(ValidationError::UnsupportedHvacMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl From<HvacMode> for EntityState {
    fn from(mode: HvacMode) -> Self {
        match mode {
            HvacMode::Off => Self::Off,
            HvacMode::Heat => Self::Heat,
            HvacMode::Auto => Self::Auto,
        }
    }
}

/// Semantic operating intent of a climate entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetMode {
    #[default]
    None,
    Comfort,
    Eco,
    Away,
}

impl PresetMode {
    /// All presets, in display order.
    pub const ALL: [Self; 4] = [Self::None, Self::Comfort, Self::Eco, Self::Away];

    /// Wire name used in service data and attributes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Comfort => "comfort",
            Self::Eco => "eco",
            Self::Away => "away",
        }
    }
}

impl fmt::Display for PresetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "comfort" => Ok(Self::Comfort),
            "eco" => Ok(Self::Eco),
            "away" => Ok(Self::Away),
            other => Err(ValidationError::UnsupportedPresetMode {
                preset: other.to_string(),
            }),
        }
    }
}
