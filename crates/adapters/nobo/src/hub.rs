//! Hub client port and the data it exposes.
//!
//! The Ecohub owns zones, components, week profiles and overrides. The
//! adapters in this crate only read those snapshots through [`HubClient`]
//! and send requests back through it; connection handling, discovery and
//! the wire protocol live behind the trait.

use std::fmt;
use std::future::Future;

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::NoboError;
use crate::model::ComponentModel;

macro_rules! hub_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

hub_id!(
    /// Zone identifier assigned by the hub.
    ZoneId
);
hub_id!(
    /// Week profile identifier assigned by the hub.
    WeekProfileId
);
hub_id!(
    /// Override identifier assigned by the hub.
    OverrideId
);
hub_id!(
    /// Twelve-digit component serial number.
    ComponentSerial
);

/// Static information about the hub itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubInfo {
    pub serial: String,
    pub name: String,
    #[serde(default)]
    pub software_version: String,
}

/// A heating zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub week_profile_id: WeekProfileId,
    pub temp_comfort_c: i32,
    pub temp_eco_c: i32,
    #[serde(default = "default_true")]
    pub override_allowed: bool,
}

fn default_true() -> bool {
    true
}

/// A physical device registered with the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub serial: ComponentSerial,
    pub name: String,
    #[serde(default)]
    pub zone_id: Option<ZoneId>,
}

impl Component {
    /// The model, derived from the serial prefix.
    #[must_use]
    pub fn model(&self) -> &'static ComponentModel {
        ComponentModel::from_serial(self.serial.as_str())
    }
}

/// Mode reported for a zone at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneMode {
    Off,
    Away,
    Eco,
    Comfort,
}

impl ZoneMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Away => "away",
            Self::Eco => "eco",
            Self::Comfort => "comfort",
        }
    }
}

impl fmt::Display for ZoneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mode an override forces on its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideMode {
    /// Follow the week profile.
    Normal,
    Comfort,
    Eco,
    Away,
}

/// How long an override stays in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideType {
    /// Until replaced.
    #[default]
    Constant,
    /// Until the next change in the week profile.
    Now,
}

/// What an override applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideTarget {
    Zone,
    Component,
}

/// An active override in the hub's override table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Override {
    pub id: OverrideId,
    pub mode: OverrideMode,
    #[serde(default)]
    pub override_type: OverrideType,
    pub target: OverrideTarget,
    pub target_id: String,
}

impl Override {
    /// Whether this override forces a non-normal mode onto `zone`.
    #[must_use]
    pub fn forces_zone(&self, zone: &ZoneId) -> bool {
        self.mode != OverrideMode::Normal
            && self.target == OverrideTarget::Zone
            && self.target_id == zone.as_str()
    }
}

/// One entry of a weekly program: from `start` on `weekday`, the zone runs in `mode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSwitch {
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub mode: ZoneMode,
}

impl ProgramSwitch {
    fn minute_of_week(&self) -> u32 {
        self.weekday.num_days_from_monday() * 24 * 60 + self.start.hour() * 60 + self.start.minute()
    }
}

/// A named weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekProfile {
    pub id: WeekProfileId,
    pub name: String,
    #[serde(default)]
    pub program: Vec<ProgramSwitch>,
}

impl WeekProfile {
    /// The mode in force at `at`: the latest switch at or before it, wrapping
    /// around to the last switch of the week. `None` for an empty program.
    #[must_use]
    pub fn mode_at(&self, at: NaiveDateTime) -> Option<ZoneMode> {
        let now = at.weekday().num_days_from_monday() * 24 * 60 + at.hour() * 60 + at.minute();
        let current = self
            .program
            .iter()
            .filter(|s| s.minute_of_week() <= now)
            .max_by_key(|s| s.minute_of_week());
        current
            .or_else(|| self.program.iter().max_by_key(|s| s.minute_of_week()))
            .map(|s| s.mode)
    }
}

/// Changes requested for a zone. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneUpdate {
    pub name: Option<String>,
    pub week_profile_id: Option<WeekProfileId>,
    pub temp_comfort_c: Option<i32>,
    pub temp_eco_c: Option<i32>,
}

/// Notification pushed by the hub whenever its state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubUpdate {
    Zones,
    Components,
    WeekProfiles,
    Overrides,
    Temperature(ComponentSerial),
}

/// Port to the device-control library talking to the Ecohub.
///
/// Reads return the client's latest snapshot and never block on the
/// network. Requests are fire-and-forget: completion means the hub
/// accepted the request, not that the new state is visible yet; that
/// arrives later as a [`HubUpdate`].
pub trait HubClient: Send + Sync + 'static {
    fn info(&self) -> HubInfo;

    fn zones(&self) -> Vec<Zone>;

    fn zone(&self, id: &ZoneId) -> Option<Zone> {
        self.zones().into_iter().find(|z| &z.id == id)
    }

    fn components(&self) -> Vec<Component>;

    fn overrides(&self) -> Vec<Override>;

    fn week_profiles(&self) -> Vec<WeekProfile>;

    /// Subscribe to push updates sent after this call.
    fn subscribe(&self) -> broadcast::Receiver<HubUpdate>;

    fn create_override(
        &self,
        mode: OverrideMode,
        override_type: OverrideType,
        target: OverrideTarget,
        target_id: &str,
    ) -> impl Future<Output = Result<(), NoboError>> + Send;

    fn update_zone(
        &self,
        zone_id: &ZoneId,
        update: ZoneUpdate,
    ) -> impl Future<Output = Result<(), NoboError>> + Send;

    /// Mode the zone runs in at `at` (hub-local time), overrides included.
    fn current_zone_mode(&self, zone_id: &ZoneId, at: NaiveDateTime) -> Option<ZoneMode>;

    fn current_zone_temperature(&self, zone_id: &ZoneId) -> Option<f64>;

    fn current_component_temperature(&self, serial: &ComponentSerial) -> Option<f64>;
}
