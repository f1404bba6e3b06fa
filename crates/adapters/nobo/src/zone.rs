//! Zone adapter: one heating zone as a climate view.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ecohub_domain::climate::{HvacMode, PresetMode};
use ecohub_domain::error::{EcoHubError, ValidationError};
use ecohub_domain::service::ClimateCommand;
use ecohub_domain::time::local_now;

use crate::error::NoboError;
use crate::hub::{
    HubClient, Override, OverrideMode, OverrideTarget, OverrideType, Zone, ZoneId, ZoneMode,
    ZoneUpdate,
};
use crate::profiles::OffControl;

/// Lowest setpoint the hub accepts, in °C.
pub const MIN_TEMPERATURE: i32 = 7;
/// Highest setpoint the hub accepts, in °C.
pub const MAX_TEMPERATURE: i32 = 40;

/// Climate view of a zone, derived from the hub's snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneView {
    pub hvac_mode: HvacMode,
    pub preset: PresetMode,
    pub current_temperature: Option<f64>,
    pub target_temp_high: i32,
    pub target_temp_low: i32,
}

/// Derive the climate view of `zone`.
///
/// `mode` is what the hub reports the zone runs in right now. An off
/// profile turns the zone OFF; any other mode becomes the preset while the
/// zone stays in AUTO. A non-normal override targeting the zone forces
/// HEAT whatever the profile says, the first match being enough.
#[must_use]
pub fn derive_zone_view(
    zone: &Zone,
    mode: Option<ZoneMode>,
    overrides: &[Override],
    current_temperature: Option<f64>,
) -> ZoneView {
    let (mut hvac_mode, preset) = match mode {
        Some(ZoneMode::Off) => (HvacMode::Off, PresetMode::None),
        Some(ZoneMode::Away) => (HvacMode::Auto, PresetMode::Away),
        Some(ZoneMode::Eco) => (HvacMode::Auto, PresetMode::Eco),
        Some(ZoneMode::Comfort) => (HvacMode::Auto, PresetMode::Comfort),
        None => (HvacMode::Auto, PresetMode::None),
    };
    if overrides.iter().any(|o| o.forces_zone(&zone.id)) {
        hvac_mode = HvacMode::Heat;
    }
    ZoneView {
        hvac_mode,
        preset,
        current_temperature,
        target_temp_high: zone.temp_comfort_c,
        target_temp_low: zone.temp_eco_c,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn whole_degrees(celsius: f64) -> Result<i32, ValidationError> {
    if !celsius.is_finite() {
        return Err(ValidationError::InvalidField {
            field: "target_temp",
        });
    }
    Ok(celsius
        .trunc()
        .clamp(f64::from(MIN_TEMPERATURE), f64::from(MAX_TEMPERATURE)) as i32)
}

/// Combine requested bounds with the zone's current setpoints into
/// `(eco, comfort)`, keeping eco at or below comfort.
///
/// # Errors
///
/// Returns [`ValidationError::MissingTemperature`] when neither bound is
/// given, or [`ValidationError::InvalidField`] for a non-finite value.
pub fn resolve_setpoints(
    current_low: i32,
    current_high: i32,
    low: Option<f64>,
    high: Option<f64>,
) -> Result<(i32, i32), ValidationError> {
    let low = low.map(whole_degrees).transpose()?;
    let high = high.map(whole_degrees).transpose()?;
    match (low, high) {
        (None, None) => Err(ValidationError::MissingTemperature),
        (Some(low), None) => Ok((low.min(current_high), current_high)),
        (None, Some(high)) => Ok((current_low, high.max(current_low))),
        (Some(low), Some(high)) => Ok((low.min(high), high)),
    }
}

fn override_mode(preset: PresetMode) -> OverrideMode {
    match preset {
        PresetMode::None => OverrideMode::Normal,
        PresetMode::Comfort => OverrideMode::Comfort,
        PresetMode::Eco => OverrideMode::Eco,
        PresetMode::Away => OverrideMode::Away,
    }
}

/// Translates between one hub zone and its climate view.
pub struct ZoneAdapter<H> {
    hub: Arc<H>,
    zone_id: ZoneId,
    override_type: OverrideType,
    off_control: Option<OffControl>,
    settle: Duration,
    view: Mutex<ZoneView>,
}

impl<H: HubClient> ZoneAdapter<H> {
    /// Create an adapter and derive its first view.
    ///
    /// # Errors
    ///
    /// Returns [`NoboError::UnknownZone`] if the hub has no such zone.
    pub fn new(
        hub: Arc<H>,
        zone_id: ZoneId,
        override_type: OverrideType,
        off_control: Option<OffControl>,
        settle: Duration,
    ) -> Result<Self, NoboError> {
        let view = Self::derive(&hub, &zone_id)?;
        Ok(Self {
            hub,
            zone_id,
            override_type,
            off_control,
            settle,
            view: Mutex::new(view),
        })
    }

    /// The view as of the last read or command.
    #[must_use]
    pub fn view(&self) -> ZoneView {
        self.lock_view().clone()
    }

    /// Modes this zone can be put in. OFF needs both an off and an on profile.
    #[must_use]
    pub fn supported_hvac_modes(&self) -> Vec<HvacMode> {
        if self.off_control.is_some() {
            vec![HvacMode::Off, HvacMode::Heat, HvacMode::Auto]
        } else {
            vec![HvacMode::Heat, HvacMode::Auto]
        }
    }

    /// Recompute the view from the hub's latest snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`NoboError::UnknownZone`] if the zone disappeared from the hub.
    pub fn read_state(&self) -> Result<ZoneView, NoboError> {
        let view = Self::derive(&self.hub, &self.zone_id)?;
        *self.lock_view() = view.clone();
        Ok(view)
    }

    /// Run a parsed climate command against this zone.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying command.
    pub async fn execute(&self, command: ClimateCommand) -> Result<(), NoboError> {
        match command {
            ClimateCommand::SetHvacMode(mode) => self.set_hvac_mode(mode).await,
            ClimateCommand::SetPresetMode(preset) => self.set_preset_mode(preset).await,
            ClimateCommand::SetTemperature { low, high } => self.set_temperature(low, high).await,
        }
    }

    /// Switch between following the week profile (AUTO), a comfort
    /// override (HEAT) and the off profile (OFF).
    ///
    /// # Errors
    ///
    /// Returns a validation error for a mode the zone does not support, in
    /// which case the hub is not contacted, or the hub's error.
    #[tracing::instrument(skip(self), fields(zone_id = %self.zone_id))]
    pub async fn set_hvac_mode(&self, mode: HvacMode) -> Result<(), NoboError> {
        if !self.supported_hvac_modes().contains(&mode) {
            return Err(EcoHubError::from(ValidationError::UnsupportedHvacMode {
                mode: mode.to_string(),
            })
            .into());
        }

        let preset = if mode == HvacMode::Heat {
            PresetMode::Comfort
        } else {
            PresetMode::None
        };
        self.set_preset_mode(preset).await?;

        if let Some(control) = &self.off_control {
            let week_profile_id = if mode == HvacMode::Off {
                &control.off
            } else {
                &control.on
            };
            self.hub
                .update_zone(
                    &self.zone_id,
                    ZoneUpdate {
                        week_profile_id: Some(week_profile_id.clone()),
                        ..ZoneUpdate::default()
                    },
                )
                .await?;
            tracing::debug!(%week_profile_id, "switched week profile");
            // The hub answers with the previous profile's state for a moment.
            tokio::time::sleep(self.settle).await;
        }

        self.lock_view().hvac_mode = mode;
        Ok(())
    }

    /// Override the week profile with a preset, or return to it with NONE.
    /// Ignored for zones that do not allow overrides.
    ///
    /// # Errors
    ///
    /// Returns the hub's error if the override could not be created.
    #[tracing::instrument(skip(self), fields(zone_id = %self.zone_id))]
    pub async fn set_preset_mode(&self, preset: PresetMode) -> Result<(), NoboError> {
        let zone = self.zone()?;
        if !zone.override_allowed {
            tracing::debug!("zone does not allow overrides, preset ignored");
            return Ok(());
        }
        self.hub
            .create_override(
                override_mode(preset),
                self.override_type,
                OverrideTarget::Zone,
                self.zone_id.as_str(),
            )
            .await
    }

    /// Update the comfort (high) and eco (low) setpoints.
    ///
    /// # Errors
    ///
    /// Returns a validation error if neither bound is given, or the hub's
    /// error.
    #[tracing::instrument(skip(self), fields(zone_id = %self.zone_id))]
    pub async fn set_temperature(
        &self,
        low: Option<f64>,
        high: Option<f64>,
    ) -> Result<(), NoboError> {
        let zone = self.zone()?;
        let (eco, comfort) = resolve_setpoints(zone.temp_eco_c, zone.temp_comfort_c, low, high)
            .map_err(EcoHubError::from)?;
        self.hub
            .update_zone(
                &self.zone_id,
                ZoneUpdate {
                    temp_comfort_c: Some(comfort),
                    temp_eco_c: Some(eco),
                    ..ZoneUpdate::default()
                },
            )
            .await
    }

    fn zone(&self) -> Result<Zone, NoboError> {
        self.hub
            .zone(&self.zone_id)
            .ok_or_else(|| NoboError::UnknownZone(self.zone_id.to_string()))
    }

    fn derive(hub: &H, zone_id: &ZoneId) -> Result<ZoneView, NoboError> {
        let zone = hub
            .zone(zone_id)
            .ok_or_else(|| NoboError::UnknownZone(zone_id.to_string()))?;
        Ok(derive_zone_view(
            &zone,
            hub.current_zone_mode(zone_id, local_now()),
            &hub.overrides(),
            hub.current_zone_temperature(zone_id),
        ))
    }

    fn lock_view(&self) -> MutexGuard<'_, ZoneView> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::{HubClient, OverrideId};
    use crate::simulated::SimulatedHub;

    const FIXTURE: &str = r#"
[hub]
serial = "102000012345"
name = "Test hub"

[[zones]]
id = "1"
name = "Living room"
week_profile_id = "1"
temp_comfort_c = 22
temp_eco_c = 18

[[zones]]
id = "2"
name = "Garage"
week_profile_id = "1"
temp_comfort_c = 12
temp_eco_c = 7
override_allowed = false

[[components]]
serial = "234000000001"
name = "Living room switch"
zone_id = "1"

[[temperatures]]
serial = "234000000001"
celsius = 21.5

[[week_profiles]]
id = "1"
name = "Comfort"
program = [{ weekday = "Mon", start = "00:00:00", mode = "comfort" }]

[[week_profiles]]
id = "2"
name = "Off"
program = [{ weekday = "Mon", start = "00:00:00", mode = "off" }]
"#;

    fn hub() -> Arc<SimulatedHub> {
        Arc::new(SimulatedHub::from_toml_str(FIXTURE).unwrap())
    }

    fn adapter(hub: &Arc<SimulatedHub>, zone: &str, off: bool) -> ZoneAdapter<SimulatedHub> {
        let off_control = off.then(|| OffControl {
            off: "2".into(),
            on: "1".into(),
        });
        ZoneAdapter::new(
            Arc::clone(hub),
            zone.into(),
            OverrideType::Constant,
            off_control,
            Duration::ZERO,
        )
        .unwrap()
    }

    fn living_room() -> Zone {
        Zone {
            id: "1".into(),
            name: "Living room".to_string(),
            week_profile_id: "1".into(),
            temp_comfort_c: 22,
            temp_eco_c: 18,
            override_allowed: true,
        }
    }

    fn zone_override(mode: OverrideMode, target: &str) -> Override {
        Override {
            id: OverrideId::new("0"),
            mode,
            override_type: OverrideType::Constant,
            target: OverrideTarget::Zone,
            target_id: target.to_string(),
        }
    }

    #[test]
    fn should_derive_auto_comfort_from_profile() {
        let view = derive_zone_view(&living_room(), Some(ZoneMode::Comfort), &[], Some(21.5));
        assert_eq!(
            view,
            ZoneView {
                hvac_mode: HvacMode::Auto,
                preset: PresetMode::Comfort,
                current_temperature: Some(21.5),
                target_temp_high: 22,
                target_temp_low: 18,
            }
        );
    }

    #[test]
    fn should_force_heat_when_away_override_targets_zone() {
        let overrides = [zone_override(OverrideMode::Away, "1")];
        let view = derive_zone_view(&living_room(), Some(ZoneMode::Comfort), &overrides, None);
        assert_eq!(view.hvac_mode, HvacMode::Heat);
        assert_eq!(view.preset, PresetMode::Comfort);
    }

    #[test]
    fn should_be_off_only_without_forcing_override() {
        let zone = living_room();
        let off = derive_zone_view(&zone, Some(ZoneMode::Off), &[], None);
        assert_eq!(off.hvac_mode, HvacMode::Off);
        assert_eq!(off.preset, PresetMode::None);

        let ignored = [
            zone_override(OverrideMode::Normal, "1"),
            zone_override(OverrideMode::Eco, "2"),
        ];
        let still_off = derive_zone_view(&zone, Some(ZoneMode::Off), &ignored, None);
        assert_eq!(still_off.hvac_mode, HvacMode::Off);

        let forced = [zone_override(OverrideMode::Eco, "1")];
        let heat = derive_zone_view(&zone, Some(ZoneMode::Off), &forced, None);
        assert_eq!(heat.hvac_mode, HvacMode::Heat);
    }

    #[test]
    fn should_map_each_profile_mode_to_preset() {
        let zone = living_room();
        let cases = [
            (Some(ZoneMode::Away), PresetMode::Away),
            (Some(ZoneMode::Eco), PresetMode::Eco),
            (Some(ZoneMode::Comfort), PresetMode::Comfort),
            (None, PresetMode::None),
        ];
        for (mode, preset) in cases {
            let view = derive_zone_view(&zone, mode, &[], None);
            assert_eq!(view.hvac_mode, HvacMode::Auto);
            assert_eq!(view.preset, preset);
        }
    }

    #[test]
    fn should_cap_low_bound_to_current_high() {
        assert_eq!(resolve_setpoints(18, 22, Some(25.0), None), Ok((22, 22)));
    }

    #[test]
    fn should_floor_high_bound_to_current_low() {
        assert_eq!(resolve_setpoints(18, 22, None, Some(15.0)), Ok((18, 18)));
    }

    #[test]
    fn should_keep_low_at_or_below_high_for_single_bound() {
        for requested in [0.0, 6.4, 7.5, 18.0, 21.6, 22.0, 30.0, 55.0] {
            let (low, high) = resolve_setpoints(18, 22, Some(requested), None).unwrap();
            assert!(low <= high, "low {low} > high {high} for {requested}");
            let (low, high) = resolve_setpoints(18, 22, None, Some(requested)).unwrap();
            assert!(low <= high, "low {low} > high {high} for {requested}");
        }
    }

    #[test]
    fn should_truncate_and_clamp_setpoints() {
        assert_eq!(resolve_setpoints(18, 22, Some(3.0), Some(45.2)), Ok((7, 40)));
        assert_eq!(resolve_setpoints(18, 22, Some(19.5), Some(21.4)), Ok((19, 21)));
        assert_eq!(resolve_setpoints(18, 22, Some(19.6), Some(21.6)), Ok((19, 21)));
        assert_eq!(resolve_setpoints(18, 22, Some(21.9), None), Ok((21, 22)));
        assert_eq!(resolve_setpoints(18, 22, Some(24.0), Some(21.0)), Ok((21, 21)));
    }

    #[test]
    fn should_require_at_least_one_bound() {
        assert_eq!(
            resolve_setpoints(18, 22, None, None),
            Err(ValidationError::MissingTemperature)
        );
        assert!(resolve_setpoints(18, 22, Some(f64::NAN), None).is_err());
    }

    #[test]
    fn should_read_same_state_twice() {
        let hub = hub();
        let zone = adapter(&hub, "1", false);
        let first = zone.read_state().unwrap();
        let second = zone.read_state().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.hvac_mode, HvacMode::Auto);
        assert_eq!(first.preset, PresetMode::Comfort);
        assert_eq!(first.current_temperature, Some(21.5));
    }

    #[tokio::test]
    async fn should_reject_off_without_off_control_and_not_call_hub() {
        let hub = hub();
        let zone = adapter(&hub, "1", false);
        let mut rx = hub.subscribe();

        let result = zone.set_hvac_mode(HvacMode::Off).await;

        assert!(matches!(
            result,
            Err(NoboError::Domain(EcoHubError::Validation(
                ValidationError::UnsupportedHvacMode { .. }
            )))
        ));
        assert!(rx.try_recv().is_err());
        assert!(hub.overrides().is_empty());
        assert_eq!(zone.view().hvac_mode, HvacMode::Auto);
    }

    #[tokio::test]
    async fn should_create_comfort_override_for_heat() {
        let hub = hub();
        let zone = adapter(&hub, "1", false);

        zone.set_hvac_mode(HvacMode::Heat).await.unwrap();

        let overrides = hub.overrides();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].mode, OverrideMode::Comfort);
        assert_eq!(overrides[0].target_id, "1");
        assert_eq!(zone.view().hvac_mode, HvacMode::Heat);
        assert_eq!(zone.read_state().unwrap().hvac_mode, HvacMode::Heat);
    }

    #[tokio::test]
    async fn should_return_to_profile_for_auto() {
        let hub = hub();
        let zone = adapter(&hub, "1", false);
        zone.set_preset_mode(PresetMode::Eco).await.unwrap();
        assert_eq!(zone.read_state().unwrap().hvac_mode, HvacMode::Heat);

        zone.set_hvac_mode(HvacMode::Auto).await.unwrap();

        assert_eq!(hub.overrides()[0].mode, OverrideMode::Normal);
        let view = zone.read_state().unwrap();
        assert_eq!(view.hvac_mode, HvacMode::Auto);
        assert_eq!(view.preset, PresetMode::Comfort);
    }

    #[tokio::test]
    async fn should_switch_week_profiles_for_off_and_back() {
        let hub = hub();
        let zone = adapter(&hub, "1", true);
        assert_eq!(zone.supported_hvac_modes(), [HvacMode::Off, HvacMode::Heat, HvacMode::Auto]);

        zone.set_hvac_mode(HvacMode::Off).await.unwrap();
        assert_eq!(hub.zone(&"1".into()).unwrap().week_profile_id.as_str(), "2");
        assert_eq!(hub.overrides()[0].mode, OverrideMode::Normal);
        assert_eq!(zone.view().hvac_mode, HvacMode::Off);
        assert_eq!(zone.read_state().unwrap().hvac_mode, HvacMode::Off);

        zone.set_hvac_mode(HvacMode::Auto).await.unwrap();
        assert_eq!(hub.zone(&"1".into()).unwrap().week_profile_id.as_str(), "1");
        assert_eq!(zone.read_state().unwrap().hvac_mode, HvacMode::Auto);
    }

    #[tokio::test]
    async fn should_ignore_preset_when_overrides_not_allowed() {
        let hub = hub();
        let garage = adapter(&hub, "2", false);
        let mut rx = hub.subscribe();

        garage.set_preset_mode(PresetMode::Away).await.unwrap();

        assert!(rx.try_recv().is_err());
        assert!(hub.overrides().is_empty());
    }

    #[tokio::test]
    async fn should_use_configured_override_type() {
        let hub = hub();
        let zone = ZoneAdapter::new(
            Arc::clone(&hub),
            "1".into(),
            OverrideType::Now,
            None,
            Duration::ZERO,
        )
        .unwrap();

        zone.set_preset_mode(PresetMode::Away).await.unwrap();

        let overrides = hub.overrides();
        assert_eq!(overrides[0].mode, OverrideMode::Away);
        assert_eq!(overrides[0].override_type, OverrideType::Now);
    }

    #[tokio::test]
    async fn should_write_capped_setpoints_to_hub() {
        let hub = hub();
        let zone = adapter(&hub, "1", false);

        zone.set_temperature(Some(25.0), None).await.unwrap();

        let stored = hub.zone(&"1".into()).unwrap();
        assert_eq!(stored.temp_eco_c, 22);
        assert_eq!(stored.temp_comfort_c, 22);
        let view = zone.read_state().unwrap();
        assert_eq!((view.target_temp_low, view.target_temp_high), (22, 22));
    }

    #[tokio::test]
    async fn should_reject_temperature_without_bounds() {
        let hub = hub();
        let zone = adapter(&hub, "1", false);
        let result = zone.set_temperature(None, None).await;
        assert!(matches!(
            result,
            Err(NoboError::Domain(EcoHubError::Validation(
                ValidationError::MissingTemperature
            )))
        ));
    }

    #[test]
    fn should_fail_for_unknown_zone() {
        let result = ZoneAdapter::new(hub(), "9".into(), OverrideType::Constant, None, Duration::ZERO);
        assert!(matches!(result, Err(NoboError::UnknownZone(_))));
    }
}
