//! In-memory Ecohub.
//!
//! [`SimulatedHub`] implements [`HubClient`] without any network: the hub's
//! directories sit behind a mutex and every mutation is pushed to
//! subscribers, the way the real hub pushes state after each request. It
//! drives the daemon when no physical hub is configured, and the tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDateTime, NaiveTime, Weekday};
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::error::NoboError;
use crate::hub::{
    Component, ComponentSerial, HubClient, HubInfo, HubUpdate, Override, OverrideId, OverrideMode,
    OverrideTarget, OverrideType, ProgramSwitch, WeekProfile, Zone, ZoneId, ZoneMode, ZoneUpdate,
};

const UPDATE_CAPACITY: usize = 64;

/// Initial contents of a [`SimulatedHub`], usually loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct HubFixture {
    pub hub: HubInfo,
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub week_profiles: Vec<WeekProfile>,
    #[serde(default)]
    pub overrides: Vec<Override>,
    #[serde(default)]
    pub temperatures: Vec<TemperatureReading>,
}

/// Latest reading of a temperature-reporting component.
#[derive(Debug, Clone, Deserialize)]
pub struct TemperatureReading {
    pub serial: ComponentSerial,
    pub celsius: f64,
}

struct HubState {
    info: HubInfo,
    zones: Vec<Zone>,
    components: Vec<Component>,
    week_profiles: Vec<WeekProfile>,
    overrides: Vec<Override>,
    temperatures: HashMap<ComponentSerial, f64>,
    next_override_id: u32,
}

/// A [`HubClient`] that keeps the whole hub in memory.
///
/// Overrides of type [`OverrideType::Now`] are kept until replaced; the
/// simulation does not expire them at the next program switch.
pub struct SimulatedHub {
    state: Mutex<HubState>,
    updates: broadcast::Sender<HubUpdate>,
}

impl SimulatedHub {
    #[must_use]
    pub fn new(fixture: HubFixture) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        let next_override_id = fixture
            .overrides
            .iter()
            .filter_map(|o| o.id.as_str().parse::<u32>().ok())
            .max()
            .map_or(0, |max| max + 1);
        let state = HubState {
            info: fixture.hub,
            zones: fixture.zones,
            components: fixture.components,
            week_profiles: fixture.week_profiles,
            overrides: fixture.overrides,
            temperatures: fixture
                .temperatures
                .into_iter()
                .map(|r| (r.serial, r.celsius))
                .collect(),
            next_override_id,
        };
        Self {
            state: Mutex::new(state),
            updates,
        }
    }

    /// Build a hub from a TOML fixture.
    ///
    /// # Errors
    ///
    /// Returns [`NoboError::Fixture`] if the document does not describe a hub.
    pub fn from_toml_str(fixture: &str) -> Result<Self, NoboError> {
        let fixture: HubFixture = toml::from_str(fixture)?;
        Ok(Self::new(fixture))
    }

    /// A small furnished house: three zones, four components and three week
    /// profiles, one of which switches everything off.
    #[must_use]
    pub fn demo(serial: &str) -> Self {
        let every_day = |program: &[(u32, ZoneMode)]| -> Vec<ProgramSwitch> {
            [
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ]
            .into_iter()
            .flat_map(|weekday| {
                program.iter().filter_map(move |&(hour, mode)| {
                    Some(ProgramSwitch {
                        weekday,
                        start: NaiveTime::from_hms_opt(hour, 0, 0)?,
                        mode,
                    })
                })
            })
            .collect()
        };

        let zone = |id: &str, name: &str, profile: &str, comfort: i32, eco: i32, allowed: bool| Zone {
            id: id.into(),
            name: name.to_string(),
            week_profile_id: profile.into(),
            temp_comfort_c: comfort,
            temp_eco_c: eco,
            override_allowed: allowed,
        };
        let component = |serial: &str, name: &str, zone: Option<&str>| Component {
            serial: serial.into(),
            name: name.to_string(),
            zone_id: zone.map(ZoneId::from),
        };

        Self::new(HubFixture {
            hub: HubInfo {
                serial: serial.to_string(),
                name: "My Eco Hub".to_string(),
                software_version: "115".to_string(),
            },
            zones: vec![
                zone("1", "Living room", "1", 22, 18, true),
                zone("2", "Bedroom", "2", 20, 16, true),
                zone("3", "Garage", "1", 12, 7, false),
            ],
            components: vec![
                component("168001000001", "Living room heater", Some("1")),
                component("234001000002", "Living room switch", Some("1")),
                component("186001000003", "Bedroom heater", Some("2")),
                component("234001000004", "Hallway\u{a0}switch", None),
            ],
            week_profiles: vec![
                WeekProfile {
                    id: "1".into(),
                    name: "Default".to_string(),
                    program: every_day(&[(0, ZoneMode::Eco), (6, ZoneMode::Comfort), (23, ZoneMode::Eco)]),
                },
                WeekProfile {
                    id: "2".into(),
                    name: "Night\u{a0}setback".to_string(),
                    program: every_day(&[(0, ZoneMode::Eco), (7, ZoneMode::Away), (21, ZoneMode::Comfort)]),
                },
                WeekProfile {
                    id: "3".into(),
                    name: "Off".to_string(),
                    program: every_day(&[(0, ZoneMode::Off)]),
                },
            ],
            overrides: Vec::new(),
            temperatures: vec![
                TemperatureReading {
                    serial: "234001000002".into(),
                    celsius: 21.5,
                },
                TemperatureReading {
                    serial: "234001000004".into(),
                    celsius: 19.0,
                },
            ],
        })
    }

    /// Record a new reading for a component and push it to subscribers.
    pub fn set_component_temperature(&self, serial: &ComponentSerial, celsius: f64) {
        self.lock().temperatures.insert(serial.clone(), celsius);
        self.push(HubUpdate::Temperature(serial.clone()));
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, update: HubUpdate) {
        if self.updates.send(update).is_err() {
            tracing::trace!("hub update dropped, no subscribers");
        }
    }
}

fn zone_mode_for(mode: OverrideMode) -> Option<ZoneMode> {
    match mode {
        OverrideMode::Normal => None,
        OverrideMode::Comfort => Some(ZoneMode::Comfort),
        OverrideMode::Eco => Some(ZoneMode::Eco),
        OverrideMode::Away => Some(ZoneMode::Away),
    }
}

impl HubClient for SimulatedHub {
    fn info(&self) -> HubInfo {
        self.lock().info.clone()
    }

    fn zones(&self) -> Vec<Zone> {
        self.lock().zones.clone()
    }

    fn components(&self) -> Vec<Component> {
        self.lock().components.clone()
    }

    fn overrides(&self) -> Vec<Override> {
        self.lock().overrides.clone()
    }

    fn week_profiles(&self) -> Vec<WeekProfile> {
        self.lock().week_profiles.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<HubUpdate> {
        self.updates.subscribe()
    }

    async fn create_override(
        &self,
        mode: OverrideMode,
        override_type: OverrideType,
        target: OverrideTarget,
        target_id: &str,
    ) -> Result<(), NoboError> {
        {
            let mut state = self.lock();
            state
                .overrides
                .retain(|o| !(o.target == target && o.target_id == target_id));
            let id = OverrideId::new(state.next_override_id.to_string());
            state.next_override_id += 1;
            tracing::debug!(override_id = %id, ?mode, ?target, target_id, "override created");
            state.overrides.push(Override {
                id,
                mode,
                override_type,
                target,
                target_id: target_id.to_string(),
            });
        }
        self.push(HubUpdate::Overrides);
        Ok(())
    }

    async fn update_zone(&self, zone_id: &ZoneId, update: ZoneUpdate) -> Result<(), NoboError> {
        {
            let mut state = self.lock();
            let zone = state
                .zones
                .iter_mut()
                .find(|z| &z.id == zone_id)
                .ok_or_else(|| NoboError::UnknownZone(zone_id.to_string()))?;
            if let Some(name) = update.name {
                zone.name = name;
            }
            if let Some(profile) = update.week_profile_id {
                zone.week_profile_id = profile;
            }
            if let Some(comfort) = update.temp_comfort_c {
                zone.temp_comfort_c = comfort;
            }
            if let Some(eco) = update.temp_eco_c {
                zone.temp_eco_c = eco;
            }
            tracing::debug!(zone_id = %zone.id, comfort = zone.temp_comfort_c, eco = zone.temp_eco_c, week_profile = %zone.week_profile_id, "zone updated");
        }
        self.push(HubUpdate::Zones);
        Ok(())
    }

    fn current_zone_mode(&self, zone_id: &ZoneId, at: NaiveDateTime) -> Option<ZoneMode> {
        let state = self.lock();
        let zone = state.zones.iter().find(|z| &z.id == zone_id)?;
        if zone.override_allowed {
            let forced = state
                .overrides
                .iter()
                .find(|o| o.forces_zone(zone_id))
                .and_then(|o| zone_mode_for(o.mode));
            if forced.is_some() {
                return forced;
            }
        }
        state
            .week_profiles
            .iter()
            .find(|p| p.id == zone.week_profile_id)
            .and_then(|p| p.mode_at(at))
    }

    fn current_zone_temperature(&self, zone_id: &ZoneId) -> Option<f64> {
        let state = self.lock();
        state
            .components
            .iter()
            .filter(|c| c.zone_id.as_ref() == Some(zone_id))
            .find_map(|c| state.temperatures.get(&c.serial).copied())
    }

    fn current_component_temperature(&self, serial: &ComponentSerial) -> Option<f64> {
        self.lock().temperatures.get(serial).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FIXTURE: &str = r#"
[hub]
serial = "102000012345"
name = "Cabin"

[[zones]]
id = "1"
name = "Kitchen"
week_profile_id = "1"
temp_comfort_c = 22
temp_eco_c = 18

[[zones]]
id = "2"
name = "Shed"
week_profile_id = "1"
temp_comfort_c = 10
temp_eco_c = 7
override_allowed = false

[[components]]
serial = "234000000001"
name = "Kitchen switch"
zone_id = "1"

[[week_profiles]]
id = "1"
name = "Always comfort"
program = [{ weekday = "Mon", start = "00:00:00", mode = "comfort" }]

[[temperatures]]
serial = "234000000001"
celsius = 20.5
"#;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 21)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn should_load_fixture_from_toml() {
        let hub = SimulatedHub::from_toml_str(FIXTURE).unwrap();
        assert_eq!(hub.info().serial, "102000012345");
        assert_eq!(hub.zones().len(), 2);
        assert!(hub.zones()[0].override_allowed);
        assert!(!hub.zones()[1].override_allowed);
        assert_eq!(hub.current_zone_temperature(&"1".into()), Some(20.5));
        assert_eq!(hub.current_zone_temperature(&"2".into()), None);
    }

    #[test]
    fn should_reject_malformed_fixture() {
        let result = SimulatedHub::from_toml_str("[hub]\nname = 3");
        assert!(matches!(result, Err(NoboError::Fixture(_))));
    }

    #[tokio::test]
    async fn should_replace_override_with_same_target() {
        let hub = SimulatedHub::from_toml_str(FIXTURE).unwrap();
        hub.create_override(OverrideMode::Eco, OverrideType::Constant, OverrideTarget::Zone, "1")
            .await
            .unwrap();
        hub.create_override(OverrideMode::Away, OverrideType::Now, OverrideTarget::Zone, "1")
            .await
            .unwrap();

        let overrides = hub.overrides();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].mode, OverrideMode::Away);
        assert_eq!(overrides[0].override_type, OverrideType::Now);
    }

    #[tokio::test]
    async fn should_honour_override_before_week_profile() {
        let hub = SimulatedHub::from_toml_str(FIXTURE).unwrap();
        let kitchen = ZoneId::new("1");
        assert_eq!(hub.current_zone_mode(&kitchen, noon()), Some(ZoneMode::Comfort));

        hub.create_override(OverrideMode::Away, OverrideType::Constant, OverrideTarget::Zone, "1")
            .await
            .unwrap();
        assert_eq!(hub.current_zone_mode(&kitchen, noon()), Some(ZoneMode::Away));

        hub.create_override(OverrideMode::Normal, OverrideType::Constant, OverrideTarget::Zone, "1")
            .await
            .unwrap();
        assert_eq!(hub.current_zone_mode(&kitchen, noon()), Some(ZoneMode::Comfort));
    }

    #[tokio::test]
    async fn should_ignore_override_when_zone_disallows_it() {
        let hub = SimulatedHub::from_toml_str(FIXTURE).unwrap();
        hub.create_override(OverrideMode::Eco, OverrideType::Constant, OverrideTarget::Zone, "2")
            .await
            .unwrap();
        assert_eq!(hub.current_zone_mode(&"2".into(), noon()), Some(ZoneMode::Comfort));
    }

    #[tokio::test]
    async fn should_push_update_after_every_mutation() {
        let hub = SimulatedHub::from_toml_str(FIXTURE).unwrap();
        let mut rx = hub.subscribe();

        hub.update_zone(
            &"1".into(),
            ZoneUpdate {
                temp_comfort_c: Some(23),
                ..ZoneUpdate::default()
            },
        )
        .await
        .unwrap();
        hub.set_component_temperature(&"234000000001".into(), 21.0);

        assert_eq!(rx.recv().await.unwrap(), HubUpdate::Zones);
        assert_eq!(
            rx.recv().await.unwrap(),
            HubUpdate::Temperature("234000000001".into())
        );
        assert_eq!(hub.zone(&"1".into()).unwrap().temp_comfort_c, 23);
        assert_eq!(hub.current_component_temperature(&"234000000001".into()), Some(21.0));
    }

    #[tokio::test]
    async fn should_fail_update_of_unknown_zone() {
        let hub = SimulatedHub::from_toml_str(FIXTURE).unwrap();
        let result = hub.update_zone(&"9".into(), ZoneUpdate::default()).await;
        assert!(matches!(result, Err(NoboError::UnknownZone(id)) if id == "9"));
    }

    #[test]
    fn should_furnish_demo_hub() {
        let hub = SimulatedHub::demo("102000054321");
        assert_eq!(hub.info().serial, "102000054321");
        assert_eq!(hub.zones().len(), 3);
        assert!(
            hub.week_profiles()
                .iter()
                .any(|p| p.name == "Off" && p.id.as_str() == "3")
        );
        assert_eq!(hub.current_zone_mode(&"3".into(), noon()), Some(ZoneMode::Comfort));
        assert_eq!(hub.current_zone_temperature(&"1".into()), Some(21.5));
    }
}
