//! Typed identifiers.
//!
//! Every identifier is a random UUID wrapped in its own type, so an entity
//! id can never be passed where a device id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A string that is not a valid identifier of the expected kind.
#[derive(Debug, thiserror::Error)]
#[error("invalid {kind} id")]
pub struct ParseIdError {
    pub kind: &'static str,
    #[source]
    source: uuid::Error,
}

macro_rules! typed_id {
    ($($(#[$meta:meta])* $name:ident => $kind:literal;)+) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Name of the identified kind, used in error messages.
            pub const KIND: &'static str = $kind;

            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            #[must_use]
            pub const fn as_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|source| ParseIdError { kind: $kind, source })
            }
        }
    )+};
}

typed_id! {
    /// Identifies an [`Entity`](crate::entity::Entity).
    EntityId => "Entity";
    /// Identifies a [`Device`](crate::device::Device).
    DeviceId => "Device";
    /// Identifies an [`Event`](crate::event::Event).
    EventId => "Event";
    /// Identifies a [`ConfigEntry`](crate::config_entry::ConfigEntry).
    EntryId => "ConfigEntry";
}
