//! Device service: use-cases for managing devices.

use ecohub_domain::device::Device;
use ecohub_domain::error::{EcoHubError, NotFoundError};
use ecohub_domain::id::DeviceId;

use crate::ports::DeviceRepository;

/// Application service for the device registry.
pub struct DeviceService<R> {
    repo: R,
}

impl<R: DeviceRepository> DeviceService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Look up a device by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`EcoHubError::NotFound`] when no device with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_device(&self, id: DeviceId) -> Result<Device, EcoHubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all devices.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_devices(&self) -> Result<Vec<Device>, EcoHubError> {
        self.repo.get_all().await
    }

    /// Create or update a device by its `(integration, unique_id)` pair.
    ///
    /// If a device with the same integration and unique id already exists,
    /// its descriptive fields are refreshed while the stored id is kept.
    /// Otherwise a new device is created.
    ///
    /// # Errors
    ///
    /// Returns [`EcoHubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, device), fields(device_name = %device.name))]
    pub async fn upsert_device(&self, device: Device) -> Result<Device, EcoHubError> {
        device.validate()?;
        if let Some(existing) = self
            .repo
            .find_by_integration_unique_id(&device.integration, &device.unique_id)
            .await?
        {
            let updated = Device {
                id: existing.id,
                ..device
            };
            return self.repo.update(updated).await;
        }
        tracing::debug!(unique_id = %device.unique_id, "registering new device");
        self.repo.create(device).await
    }
}
