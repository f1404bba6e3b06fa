//! Resolution of the week profiles used to switch zones off and on.
//!
//! Zones have no real OFF state on the hub. Turning a zone off means
//! assigning it a week profile that is off all week, and turning it back on
//! means reassigning its usual profile. Both are configured by id, or by
//! name for configurations carried over from older setups, and resolved
//! once when the integration starts.

use std::collections::{BTreeMap, HashMap};

use crate::config::WeekProfileConfig;
use crate::hub::{WeekProfile, WeekProfileId, Zone, ZoneId};

/// Week profiles a zone switches between when turned off and on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffControl {
    pub off: WeekProfileId,
    pub on: WeekProfileId,
}

/// The hub pads some names with non-breaking spaces.
pub(crate) fn normalize_name(name: &str) -> String {
    name.replace('\u{a0}', " ")
}

/// Find a week profile by id, falling back to its (normalized) name.
fn find_profile<'a>(reference: &str, profiles: &'a [WeekProfile]) -> Option<&'a WeekProfile> {
    profiles
        .iter()
        .find(|p| p.id.as_str() == reference)
        .or_else(|| {
            let wanted = normalize_name(reference);
            profiles.iter().find(|p| normalize_name(&p.name) == wanted)
        })
}

fn on_reference<'a>(zone: &Zone, on: &'a BTreeMap<String, String>) -> Option<&'a String> {
    on.get(zone.id.as_str()).or_else(|| {
        let name = normalize_name(&zone.name);
        on.iter()
            .find(|(key, _)| normalize_name(key) == name)
            .map(|(_, value)| value)
    })
}

/// Resolve OFF control for every zone that has both profiles available.
///
/// Zones missing from the result cannot be turned off.
pub fn resolve_off_control(
    config: &WeekProfileConfig,
    zones: &[Zone],
    profiles: &[WeekProfile],
) -> HashMap<ZoneId, OffControl> {
    let mut resolved = HashMap::new();

    let Some(off_reference) = config.off.as_deref().filter(|s| !s.is_empty()) else {
        tracing::debug!("no off week profile configured, zones cannot be turned off");
        return resolved;
    };
    let Some(off) = find_profile(off_reference, profiles) else {
        tracing::warn!(
            week_profile = off_reference,
            "off week profile not found, zones cannot be turned off"
        );
        return resolved;
    };
    tracing::debug!(week_profile_id = %off.id, name = %off.name, "zones turn off with this week profile");

    if config.on.is_empty() {
        tracing::warn!("no on week profiles configured, zones cannot be turned off");
        return resolved;
    }

    for zone in zones {
        let Some(on_ref) = on_reference(zone, &config.on) else {
            continue;
        };
        match find_profile(on_ref, profiles) {
            Some(on) => {
                tracing::debug!(zone_id = %zone.id, zone = %zone.name, week_profile_id = %on.id, "zone turns on with this week profile");
                resolved.insert(
                    zone.id.clone(),
                    OffControl {
                        off: off.id.clone(),
                        on: on.id.clone(),
                    },
                );
            }
            None => tracing::warn!(
                zone_id = %zone.id,
                zone = %zone.name,
                week_profile = %on_ref,
                "on week profile not found, zone cannot be turned off"
            ),
        }
    }
    resolved
}
