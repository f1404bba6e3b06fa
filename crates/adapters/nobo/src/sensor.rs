//! Sensor adapter: one temperature-reporting component.

use std::sync::Arc;

use crate::hub::{ComponentSerial, HubClient};

/// Read-only view of a component's latest temperature.
pub struct SensorAdapter<H> {
    hub: Arc<H>,
    serial: ComponentSerial,
}

impl<H: HubClient> SensorAdapter<H> {
    #[must_use]
    pub fn new(hub: Arc<H>, serial: ComponentSerial) -> Self {
        Self { hub, serial }
    }

    /// Pull the latest reading from the hub, `None` while the component has
    /// not reported one.
    pub fn read_state(&self) -> Option<f64> {
        self.hub.current_component_temperature(&self.serial)
    }
}
