//! Device: a physical or virtual thing that exposes one or more entities.

use serde::{Deserialize, Serialize};

use crate::error::{EcoHubError, ValidationError};
use crate::id::DeviceId;

/// A physical or virtual device registered by an integration.
///
/// `(integration, unique_id)` identifies the device across rediscoveries.
/// Devices behind a gateway (heaters behind a heating hub) point at the
/// gateway through `via_device_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub integration: String,
    pub unique_id: String,
    pub via_device_id: Option<DeviceId>,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EcoHubError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), EcoHubError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    integration: Option<String>,
    unique_id: Option<String>,
    via_device_id: Option<DeviceId>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn integration(mut self, integration: impl Into<String>) -> Self {
        self.integration = Some(integration.into());
        self
    }

    #[must_use]
    pub fn unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    #[must_use]
    pub fn via_device_id(mut self, via: DeviceId) -> Self {
        self.via_device_id = Some(via);
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// When no `unique_id` is given the generated device id is used, so
    /// every device can be upserted.
    ///
    /// # Errors
    ///
    /// Returns [`EcoHubError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<Device, EcoHubError> {
        let id = self.id.unwrap_or_default();
        let device = Device {
            id,
            name: self.name.unwrap_or_default(),
            manufacturer: self.manufacturer,
            model: self.model,
            integration: self.integration.unwrap_or_default(),
            unique_id: self.unique_id.unwrap_or_else(|| id.to_string()),
            via_device_id: self.via_device_id,
        };
        device.validate()?;
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_device_with_metadata() {
        let hub = DeviceId::new();
        let device = Device::builder()
            .name("Bathroom heater")
            .manufacturer("Glen Dimplex Nordic as")
            .model("NCU-2R")
            .integration("nobo_hub")
            .unique_id("102000012345")
            .via_device_id(hub)
            .build()
            .unwrap();

        assert_eq!(device.model.as_deref(), Some("NCU-2R"));
        assert_eq!(device.unique_id, "102000012345");
        assert_eq!(device.via_device_id, Some(hub));
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        let result = Device::builder().build();
        assert!(matches!(
            result,
            Err(EcoHubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_default_unique_id_to_device_id() {
        let device = Device::builder().name("Hub").build().unwrap();
        assert_eq!(device.unique_id, device.id.to_string());
    }
}
