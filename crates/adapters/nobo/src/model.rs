//! Known Nobø component models.
//!
//! The first three digits of a component serial identify its model.

use std::fmt;

/// Broad category of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Heater,
    Floor,
    Switch,
    ControlPanel,
    Unknown,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Heater => "Heater",
            Self::Floor => "Floor",
            Self::Switch => "Switch",
            Self::ControlPanel => "Control switch",
            Self::Unknown => "Unknown",
        })
    }
}

/// Static description of a component model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentModel {
    pub code: &'static str,
    pub name: &'static str,
    pub kind: ComponentKind,
    /// Whether the comfort setpoint can be set on the device itself.
    pub set_comfort: bool,
    /// Whether the eco setpoint can be set on the device itself.
    pub set_eco: bool,
    /// Whether the component reports the current temperature.
    pub has_temperature_sensor: bool,
}

const fn model(
    code: &'static str,
    name: &'static str,
    kind: ComponentKind,
    set_comfort: bool,
    set_eco: bool,
) -> ComponentModel {
    ComponentModel {
        code,
        name,
        kind,
        set_comfort,
        set_eco,
        has_temperature_sensor: false,
    }
}

const MODELS: &[ComponentModel] = &[
    model("120", "RS-700", ComponentKind::Switch, false, false),
    model("160", "RDC-700", ComponentKind::Heater, false, false),
    model("168", "NCU-2R", ComponentKind::Heater, true, true),
    model("182", "R80 RSC 700", ComponentKind::Heater, false, true),
    model("184", "NCU-1R", ComponentKind::Heater, false, true),
    model("186", "NTD-4R", ComponentKind::Heater, true, true),
    model("192", "TXF", ComponentKind::Heater, true, true),
    model("198", "NCU-ER", ComponentKind::Heater, true, true),
    model("200", "TRB36 700", ComponentKind::Floor, false, false),
    model("210", "NTB-2R", ComponentKind::Floor, true, true),
    ComponentModel {
        has_temperature_sensor: true,
        ..model("234", "Nobø Switch", ComponentKind::ControlPanel, false, false)
    },
];

const UNKNOWN: ComponentModel = model("", "Unknown", ComponentKind::Unknown, false, false);

impl ComponentModel {
    /// Look up a model by its three-digit code. Unknown codes yield a model
    /// without a temperature sensor.
    #[must_use]
    pub fn from_code(code: &str) -> &'static Self {
        MODELS.iter().find(|m| m.code == code).unwrap_or(&UNKNOWN)
    }

    /// Look up the model of the component with the given serial.
    #[must_use]
    pub fn from_serial(serial: &str) -> &'static Self {
        serial.get(..3).map_or(&UNKNOWN, Self::from_code)
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        self.kind != ComponentKind::Unknown
    }
}
