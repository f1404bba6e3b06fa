//! In-memory implementation of [`DeviceRepository`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use ecohub_app::ports::DeviceRepository;
use ecohub_domain::device::Device;
use ecohub_domain::error::{EcoHubError, NotFoundError};
use ecohub_domain::id::DeviceId;

use crate::{read, write};

/// Devices keyed by id. Cloning shares the same store.
#[derive(Clone, Default)]
pub struct MemoryDeviceRepository {
    devices: Arc<RwLock<HashMap<DeviceId, Device>>>,
}

impl MemoryDeviceRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceRepository for MemoryDeviceRepository {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, EcoHubError>> + Send {
        write(&self.devices).insert(device.id, device.clone());
        async { Ok(device) }
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, EcoHubError>> + Send {
        let result = read(&self.devices).get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, EcoHubError>> + Send {
        let mut result: Vec<Device> = read(&self.devices).values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        async { Ok(result) }
    }

    fn find_by_integration_unique_id(
        &self,
        integration: &str,
        unique_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, EcoHubError>> + Send {
        let result = read(&self.devices)
            .values()
            .find(|d| d.integration == integration && d.unique_id == unique_id)
            .cloned();
        async { Ok(result) }
    }

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, EcoHubError>> + Send {
        let result = {
            let mut devices = write(&self.devices);
            if devices.contains_key(&device.id) {
                devices.insert(device.id, device.clone());
                Ok(device)
            } else {
                Err(NotFoundError {
                    entity: "Device",
                    id: device.id.to_string(),
                }
                .into())
            }
        };
        async { result }
    }
}
