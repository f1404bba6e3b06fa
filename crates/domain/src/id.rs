//! Typed identifier newtypes backed by UUIDs.
//!
//! Identifiers are random by default. Integrations that know a stable
//! external key (a hub serial, a zone number) use [`EntityId::stable`] /
//! [`DeviceId::stable`] so the same thing keeps the same id across restarts
//! even though the state store is in memory.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const NAMESPACE: uuid::Uuid = uuid::Uuid::from_u128(0x6e6f_626f_2d65_636f_6875_622d_6964_7321);

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident, $kind:literal) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Derive a deterministic identifier from an external key.
            ///
            /// The same `key` always yields the same id.
            #[must_use]
            pub fn stable(key: &str) -> Self {
                let name = format!("{}:{key}", $kind);
                Self(uuid::Uuid::new_v5(&NAMESPACE, name.as_bytes()))
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for an [`Entity`](crate::entity::Entity).
    EntityId,
    "entity"
);

define_id!(
    /// Unique identifier for a [`Device`](crate::device::Device).
    DeviceId,
    "device"
);

define_id!(
    /// Unique identifier for an [`Event`](crate::event::Event).
    EventId,
    "event"
);
