//! Nobø integration configuration.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::time::Duration;

use serde::Deserialize;

use crate::hub::OverrideType;

/// Value of `ip_address` that asks for discovery on the local network.
pub const DISCOVER: &str = "discover";

/// Configuration for the Nobø Ecohub integration (`[nobo]` section).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NoboConfig {
    /// Twelve-digit hub serial number.
    pub serial: Option<String>,
    /// Hub address, or `"discover"` (same as leaving it out).
    pub ip_address: Option<String>,
    /// Duration of overrides created from preset changes.
    pub override_type: OverrideType,
    /// Wait after switching a zone's week profile before trusting the
    /// hub's reported state, in milliseconds.
    pub profile_switch_settle_ms: u64,
    /// Week profiles used to switch zones off and back on.
    pub week_profiles: WeekProfileConfig,
}

/// `[nobo.week_profiles]`: week profiles are referenced by id or by name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WeekProfileConfig {
    /// Profile every zone switches to when turned off.
    pub off: Option<String>,
    /// Zone id or name → profile the zone switches back to when turned on.
    pub on: BTreeMap<String, String>,
}

impl Default for NoboConfig {
    fn default() -> Self {
        Self {
            serial: None,
            ip_address: None,
            override_type: OverrideType::Constant,
            profile_switch_settle_ms: 500,
            week_profiles: WeekProfileConfig::default(),
        }
    }
}

impl NoboConfig {
    /// Check the serial and address.
    ///
    /// # Errors
    ///
    /// Returns [`NoboConfigError`] when the serial is not exactly twelve
    /// digits or the address is neither `"discover"` nor an IPv4 address.
    pub fn validate(&self) -> Result<(), NoboConfigError> {
        if let Some(serial) = &self.serial
            && (serial.len() != 12 || !serial.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(NoboConfigError::InvalidSerial {
                serial: serial.clone(),
            });
        }
        self.hub_address()?;
        Ok(())
    }

    /// The configured hub address, `None` when the hub should be discovered.
    ///
    /// # Errors
    ///
    /// Returns [`NoboConfigError::InvalidIpAddress`] for anything that is
    /// not an IPv4 address.
    pub fn hub_address(&self) -> Result<Option<Ipv4Addr>, NoboConfigError> {
        match self.ip_address.as_deref().map(str::trim) {
            None | Some(DISCOVER) => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| NoboConfigError::InvalidIpAddress {
                    value: value.to_string(),
                }),
        }
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.profile_switch_settle_ms)
    }
}

/// Rejected `[nobo]` settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoboConfigError {
    #[error("serial {serial:?} must be exactly 12 digits")]
    InvalidSerial { serial: String },

    #[error("ip address {value:?} is neither \"discover\" nor an IPv4 address")]
    InvalidIpAddress { value: String },
}
