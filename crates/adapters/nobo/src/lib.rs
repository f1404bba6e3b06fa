//! # ecohub-adapter-nobo
//!
//! Nobø Ecohub integration: heating zones become climate entities and
//! temperature-reporting components become sensor entities.
//!
//! ## How it works
//!
//! The hub is reached through the [`HubClient`] port. On setup the
//! integration subscribes to the hub's push updates, registers the hub and
//! its components as devices, and builds one [`ZoneAdapter`] per zone and one
//! [`SensorAdapter`] per temperature probe. A background task then recomputes
//! every adapter after each update and writes the resulting entities back
//! through the [`IntegrationContext`].
//!
//! | Hub object | Entity ID | Commands |
//! |------------|-----------|----------|
//! | Zone | `climate.nobo_<zone name>` | `set_hvac_mode`, `set_preset_mode`, `set_temperature`, `turn_on`, `turn_off` |
//! | Nobø Switch | `sensor.nobo_<serial>` | none |
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `ecohub-app` and `ecohub-domain`.

mod config;
mod entities;
mod error;
pub mod hub;
pub mod model;
pub mod profiles;
mod sensor;
pub mod simulated;
pub mod zone;

pub use config::{DISCOVER, NoboConfig, NoboConfigError, WeekProfileConfig};
pub use error::NoboError;
pub use hub::HubClient;
pub use sensor::SensorAdapter;
pub use simulated::SimulatedHub;
pub use zone::{ZoneAdapter, ZoneView, derive_zone_view};

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use ecohub_app::ports::integration::{Integration, IntegrationContext};
use ecohub_domain::device::Device;
use ecohub_domain::entity::Entity;
use ecohub_domain::error::{EcoHubError, NotFoundError, ValidationError};
use ecohub_domain::id::{DeviceId, EntityId};
use ecohub_domain::service::ClimateCommand;

use entities::EntitySlot;
use hub::HubUpdate;
use profiles::normalize_name;

/// Integration name, also the `integration` field of every device it registers.
pub const INTEGRATION_NAME: &str = "nobo_hub";
/// Manufacturer reported for the hub and its components.
pub const MANUFACTURER: &str = "Glen Dimplex Nordic as";

struct ClimateBinding<H> {
    slot: EntitySlot,
    adapter: ZoneAdapter<H>,
}

impl<H: HubClient> ClimateBinding<H> {
    fn entity(&self) -> Result<Entity, EcoHubError> {
        entities::climate_entity(
            &self.slot,
            &self.adapter.view(),
            &self.adapter.supported_hvac_modes(),
        )
    }
}

struct SensorBinding<H> {
    slot: EntitySlot,
    adapter: SensorAdapter<H>,
}

/// Every adapter of one hub, shared with the update task.
struct Bindings<H> {
    climates: Vec<ClimateBinding<H>>,
    sensors: Vec<SensorBinding<H>>,
}

impl<H: HubClient> Bindings<H> {
    fn climate(&self, id: EntityId) -> Option<&ClimateBinding<H>> {
        self.climates.iter().find(|b| b.slot.id == id)
    }

    fn sensor(&self, id: EntityId) -> Option<&SensorBinding<H>> {
        self.sensors.iter().find(|b| b.slot.id == id)
    }

    /// Recompute every adapter and write the entities through `ctx`.
    ///
    /// A failing entity is logged and skipped so the others still update.
    async fn refresh(&self, ctx: &impl IntegrationContext) {
        for binding in &self.climates {
            let entity = binding
                .adapter
                .read_state()
                .map_err(NoboError::into_domain)
                .and_then(|_| binding.entity());
            match entity {
                Ok(entity) => {
                    if let Err(err) = ctx.upsert_entity(entity).await {
                        tracing::warn!(entity_id = %binding.slot.entity_id, error = %err, "failed to store zone state");
                    }
                }
                Err(err) => {
                    tracing::warn!(entity_id = %binding.slot.entity_id, error = %err, "failed to read zone state");
                }
            }
        }
        for binding in &self.sensors {
            let reading = binding.adapter.read_state();
            let stored = match entities::sensor_entity(&binding.slot, reading) {
                Ok(entity) => ctx.upsert_entity(entity).await.map(drop),
                Err(err) => Err(err),
            };
            if let Err(err) = stored {
                tracing::warn!(entity_id = %binding.slot.entity_id, error = %err, "failed to store sensor state");
            }
        }
    }
}

/// Nobø Ecohub integration, generic over the client that reaches the hub.
pub struct NoboIntegration<H> {
    hub: Arc<H>,
    config: NoboConfig,
    bindings: Arc<Bindings<H>>,
    updates: Option<broadcast::Receiver<HubUpdate>>,
    task: Option<JoinHandle<()>>,
}

impl<H: HubClient> NoboIntegration<H> {
    #[must_use]
    pub fn new(hub: Arc<H>, config: NoboConfig) -> Self {
        Self {
            hub,
            config,
            bindings: Arc::new(Bindings {
                climates: Vec::new(),
                sensors: Vec::new(),
            }),
            updates: None,
            task: None,
        }
    }

    fn hub_device(&self) -> Result<Device, EcoHubError> {
        let info = self.hub.info();
        Device::builder()
            .id(DeviceId::stable(&format!("{INTEGRATION_NAME}:{}", info.serial)))
            .name(normalize_name(&info.name))
            .manufacturer(MANUFACTURER)
            .model(format!("Nobø Ecohub ({})", info.software_version))
            .integration(INTEGRATION_NAME)
            .unique_id(info.serial)
            .build()
    }

    fn build_bindings(
        &self,
        hub_device: &Device,
        component_devices: &[(hub::Component, Device)],
    ) -> Result<Bindings<H>, NoboError> {
        let serial = &hub_device.unique_id;
        let zones = self.hub.zones();
        let mut off_control = profiles::resolve_off_control(
            &self.config.week_profiles,
            &zones,
            &self.hub.week_profiles(),
        );

        let mut slugs = HashSet::new();
        let mut climates = Vec::with_capacity(zones.len());
        for zone in zones {
            let mut slug = entities::slugify(&zone.name);
            if slug.is_empty() || !slugs.insert(slug.clone()) {
                let base = format!("{slug}_{}", zone.id).trim_start_matches('_').to_string();
                slug.clone_from(&base);
                let mut n = 2;
                while !slugs.insert(slug.clone()) {
                    slug = format!("{base}_{n}");
                    n += 1;
                }
            }
            let unique_id = format!("{serial}:{}", zone.id);
            let adapter = ZoneAdapter::new(
                Arc::clone(&self.hub),
                zone.id.clone(),
                self.config.override_type,
                off_control.remove(&zone.id),
                self.config.settle_delay(),
            )?;
            climates.push(ClimateBinding {
                slot: EntitySlot {
                    id: EntityId::stable(&unique_id),
                    device_id: hub_device.id,
                    entity_id: format!("climate.nobo_{slug}"),
                    friendly_name: normalize_name(&zone.name),
                    unique_id,
                },
                adapter,
            });
        }

        let sensors = component_devices
            .iter()
            .filter(|(component, _)| component.model().has_temperature_sensor)
            .map(|(component, device)| {
                let unique_id = format!("{serial}:{}", component.serial);
                SensorBinding {
                    slot: EntitySlot {
                        id: EntityId::stable(&unique_id),
                        device_id: device.id,
                        entity_id: format!("sensor.nobo_{}", component.serial),
                        friendly_name: normalize_name(&component.name),
                        unique_id,
                    },
                    adapter: SensorAdapter::new(Arc::clone(&self.hub), component.serial.clone()),
                }
            })
            .collect();

        Ok(Bindings { climates, sensors })
    }
}

impl<H: HubClient> Integration for NoboIntegration<H> {
    fn name(&self) -> &'static str {
        INTEGRATION_NAME
    }

    async fn setup(&mut self, ctx: &impl IntegrationContext) -> Result<(), EcoHubError> {
        // Subscribe before the first read so no update falls in between.
        self.updates = Some(self.hub.subscribe());

        let hub_device = ctx.upsert_device(self.hub_device()?).await?;
        tracing::info!(serial = %hub_device.unique_id, name = %hub_device.name, "Nobø hub registered");

        let mut component_devices = Vec::new();
        for component in self.hub.components() {
            let model = component.model();
            let device = Device::builder()
                .id(DeviceId::stable(&format!("{INTEGRATION_NAME}:{}", component.serial)))
                .name(normalize_name(&component.name))
                .manufacturer(MANUFACTURER)
                .model(model.name)
                .integration(INTEGRATION_NAME)
                .unique_id(component.serial.as_str())
                .via_device_id(hub_device.id)
                .build()?;
            let device = ctx.upsert_device(device).await?;
            component_devices.push((component, device));
        }

        let bindings = self.build_bindings(&hub_device, &component_devices)?;
        tracing::info!(
            zones = bindings.climates.len(),
            sensors = bindings.sensors.len(),
            "Nobø discovery complete"
        );
        bindings.refresh(ctx).await;
        self.bindings = Arc::new(bindings);
        Ok(())
    }

    async fn start_background(
        &mut self,
        ctx: impl IntegrationContext + Clone + 'static,
    ) -> Result<(), EcoHubError> {
        let Some(updates) = self.updates.take() else {
            tracing::warn!("Nobø integration started without setup, no updates to follow");
            return Ok(());
        };
        let bindings = Arc::clone(&self.bindings);
        self.task = Some(tokio::spawn(follow_updates(bindings, updates, ctx)));
        tracing::info!("Nobø update task started");
        Ok(())
    }

    fn owns_entity(&self, entity_id: EntityId) -> bool {
        self.bindings.climate(entity_id).is_some() || self.bindings.sensor(entity_id).is_some()
    }

    async fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> Result<Entity, EcoHubError> {
        if let Some(binding) = self.bindings.climate(entity_id) {
            let command = ClimateCommand::parse(service, &data)?;
            tracing::debug!(entity_id = %binding.slot.entity_id, ?command, "climate command");
            binding.adapter.execute(command).await?;
            return binding.entity();
        }
        if self.bindings.sensor(entity_id).is_some() {
            return Err(ValidationError::UnknownService {
                service: service.to_string(),
            }
            .into());
        }
        Err(NotFoundError {
            entity: "Entity",
            id: entity_id.to_string(),
        }
        .into())
    }

    async fn teardown(&mut self) -> Result<(), EcoHubError> {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Nobø update task aborted");
        }
        self.updates = None;
        tracing::info!("Nobø integration stopped");
        Ok(())
    }
}

async fn follow_updates<H, C>(
    bindings: Arc<Bindings<H>>,
    updates: broadcast::Receiver<HubUpdate>,
    ctx: C,
) where
    H: HubClient,
    C: IntegrationContext,
{
    let mut stream = BroadcastStream::new(updates);
    while let Some(item) = stream.next().await {
        match item {
            Ok(update) => tracing::trace!(?update, "hub update"),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "hub updates lagged, refreshing everything");
            }
        }
        bindings.refresh(&ctx).await;
    }
    tracing::info!("hub update stream closed");
}
