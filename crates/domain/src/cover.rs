//! Cover semantics shared by every window-covering integration.
//!
//! Positions follow the host convention: `0` is fully closed, `100` is
//! fully open. Integrations whose hardware reports the opposite convention
//! translate at their boundary.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::entity::EntityState;

/// Attribute keys the host adds to every cover entity.
pub mod attr {
    pub const CURRENT_POSITION: &str = "current_position";
    pub const CURRENT_TILT_POSITION: &str = "current_tilt_position";
    pub const SUPPORTED_FEATURES: &str = "supported_features";
}

/// Bit set of the operations a cover accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupportedFeatures(u32);

impl SupportedFeatures {
    pub const OPEN: Self = Self(1);
    pub const CLOSE: Self = Self(2);
    pub const SET_POSITION: Self = Self(4);
    pub const STOP: Self = Self(8);
    pub const OPEN_TILT: Self = Self(16);
    pub const CLOSE_TILT: Self = Self(32);
    pub const STOP_TILT: Self = Self(64);
    pub const SET_TILT_POSITION: Self = Self(128);

    /// Everything a positionable cover offers.
    pub const POSITION: Self =
        Self(Self::OPEN.0 | Self::CLOSE.0 | Self::STOP.0 | Self::SET_POSITION.0);
    /// Everything a tiltable cover offers.
    pub const TILT: Self = Self(
        Self::OPEN_TILT.0 | Self::CLOSE_TILT.0 | Self::STOP_TILT.0 | Self::SET_TILT_POSITION.0,
    );

    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every flag of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any flag of `other` is set in `self`.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for SupportedFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SupportedFeatures {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Derive the entity state from the cover's motion and closed flags.
///
/// Motion wins over position: a cover that is closing is `closing` even
/// when it already reports itself closed.
#[must_use]
pub fn cover_state(is_opening: bool, is_closing: bool, is_closed: bool) -> EntityState {
    if is_opening {
        EntityState::Opening
    } else if is_closing {
        EntityState::Closing
    } else if is_closed {
        EntityState::Closed
    } else {
        EntityState::Open
    }
}
