//! Host entities built from adapter views.

use ecohub_domain::climate::{HvacMode, PresetMode};
use ecohub_domain::entity::{AttributeValue, Entity, EntityState};
use ecohub_domain::error::EcoHubError;
use ecohub_domain::id::{DeviceId, EntityId};

use crate::zone::{MAX_TEMPERATURE, MIN_TEMPERATURE, ZoneView};

const CELSIUS: &str = "\u{b0}C";

/// Identity of an entity owned by the integration.
#[derive(Debug, Clone)]
pub(crate) struct EntitySlot {
    pub id: EntityId,
    pub device_id: DeviceId,
    pub entity_id: String,
    pub friendly_name: String,
    pub unique_id: String,
}

pub(crate) fn climate_entity(
    slot: &EntitySlot,
    view: &ZoneView,
    hvac_modes: &[HvacMode],
) -> Result<Entity, EcoHubError> {
    Entity::builder()
        .id(slot.id)
        .device_id(slot.device_id)
        .entity_id(&slot.entity_id)
        .friendly_name(&slot.friendly_name)
        .state(view.hvac_mode.into())
        .attribute("unique_id", AttributeValue::String(slot.unique_id.clone()))
        .attribute(
            "hvac_modes",
            AttributeValue::string_list(hvac_modes.iter().map(|m| m.as_str())),
        )
        .attribute(
            "preset_mode",
            AttributeValue::String(view.preset.as_str().to_string()),
        )
        .attribute(
            "preset_modes",
            AttributeValue::string_list(PresetMode::ALL.iter().map(|p| p.as_str())),
        )
        .maybe_attribute(
            "current_temperature",
            view.current_temperature.map(AttributeValue::Float),
        )
        .attribute(
            "target_temp_low",
            AttributeValue::Float(f64::from(view.target_temp_low)),
        )
        .attribute(
            "target_temp_high",
            AttributeValue::Float(f64::from(view.target_temp_high)),
        )
        .attribute("min_temp", AttributeValue::Float(f64::from(MIN_TEMPERATURE)))
        .attribute("max_temp", AttributeValue::Float(f64::from(MAX_TEMPERATURE)))
        .attribute("precision", AttributeValue::Float(0.1))
        .attribute("temperature_unit", AttributeValue::String(CELSIUS.to_string()))
        .build()
}

pub(crate) fn sensor_entity(slot: &EntitySlot, reading: Option<f64>) -> Result<Entity, EcoHubError> {
    let state = if reading.is_some() {
        EntityState::On
    } else {
        EntityState::Unknown
    };
    Entity::builder()
        .id(slot.id)
        .device_id(slot.device_id)
        .entity_id(&slot.entity_id)
        .friendly_name(&slot.friendly_name)
        .state(state)
        .attribute("unique_id", AttributeValue::String(slot.unique_id.clone()))
        .attribute("device_class", AttributeValue::String("temperature".to_string()))
        .attribute("state_class", AttributeValue::String("measurement".to_string()))
        .attribute("unit_of_measurement", AttributeValue::String(CELSIUS.to_string()))
        .maybe_attribute("temperature", reading.map(AttributeValue::Float))
        .build()
}

/// Lowercase object id: runs of anything but letters and digits become one
/// underscore.
pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}
