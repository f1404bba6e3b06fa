//! Service: a callable command addressed to an entity.
//!
//! Service calls arrive as a name plus loosely typed JSON data. Climate
//! services are parsed into a [`ClimateCommand`] before reaching an
//! integration, so integrations never deal with raw JSON.

use serde_json::Value;

use crate::climate::{HvacMode, PresetMode};
use crate::error::ValidationError;

/// A validated command for a climate entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClimateCommand {
    SetHvacMode(HvacMode),
    SetPresetMode(PresetMode),
    /// At least one bound is present.
    SetTemperature {
        low: Option<f64>,
        high: Option<f64>,
    },
}

impl ClimateCommand {
    /// Parse a climate service call.
    ///
    /// Supported services: `set_hvac_mode {hvac_mode}`,
    /// `set_preset_mode {preset_mode}`,
    /// `set_temperature {target_temp_low?, target_temp_high?}`,
    /// `turn_on` (auto) and `turn_off` (off).
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for unknown services, missing or
    /// malformed fields, unsupported modes, and temperature calls without
    /// any bound.
    pub fn parse(service: &str, data: &Value) -> Result<Self, ValidationError> {
        match service {
            "set_hvac_mode" => {
                let mode = required_str(data, "hvac_mode")?;
                Ok(Self::SetHvacMode(mode.parse()?))
            }
            "set_preset_mode" => {
                let preset = required_str(data, "preset_mode")?;
                Ok(Self::SetPresetMode(preset.parse()?))
            }
            "set_temperature" => {
                let low = optional_f64(data, "target_temp_low")?;
                let high = optional_f64(data, "target_temp_high")?;
                if low.is_none() && high.is_none() {
                    return Err(ValidationError::MissingTemperature);
                }
                Ok(Self::SetTemperature { low, high })
            }
            "turn_on" => Ok(Self::SetHvacMode(HvacMode::Auto)),
            "turn_off" => Ok(Self::SetHvacMode(HvacMode::Off)),
            other => Err(ValidationError::UnknownService {
                service: other.to_string(),
            }),
        }
    }
}

fn required_str<'a>(data: &'a Value, field: &'static str) -> Result<&'a str, ValidationError> {
    match data.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ValidationError::InvalidField { field }),
        None => Err(ValidationError::MissingField { field }),
    }
}

fn optional_f64(data: &Value, field: &'static str) -> Result<Option<f64>, ValidationError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or(ValidationError::InvalidField { field }),
    }
}
