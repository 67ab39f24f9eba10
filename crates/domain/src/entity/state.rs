//! Entity state as seen by observers.
//!
//! Covers use the open/opening/closed/closing family; sensors stay unknown
//! and carry their reading in attributes.

use serde::{Deserialize, Serialize};

/// Discrete operational state of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityState {
    On,
    Off,
    Open,
    Opening,
    Closed,
    Closing,
    #[default]
    Unknown,
    Unavailable,
}

impl EntityState {
    /// Wire name of the state, as serialized.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Open => "open",
            Self::Opening => "opening",
            Self::Closed => "closed",
            Self::Closing => "closing",
            Self::Unknown => "unknown",
            Self::Unavailable => "unavailable",
        }
    }

    /// Whether the entity is reachable (anything but [`Unavailable`](Self::Unavailable)).
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    /// Whether a cover in this state is currently travelling.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }
}

impl std::fmt::Display for EntityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
