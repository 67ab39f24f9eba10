//! Roller — one motorised blind as reported by the hub.
//!
//! Rollers are owned and mutated by the hub client only. Everything else
//! works on snapshots returned by [`HubClient::roller`](crate::HubClient::roller).

use serde::{Deserialize, Serialize};

/// Direction the hub reports a roller is travelling in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovingAction {
    Up,
    Down,
    #[default]
    Stopped,
    Unknown,
}

/// Hub-side record of a roller blind.
///
/// `closed_percent` uses the hub convention: `0` is fully open, `100` is
/// fully closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roller {
    pub id: String,
    pub name: String,
    /// Motor/device type code as reported by the hub.
    #[serde(default)]
    pub device_type: u8,
    /// Firmware version.
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub closed_percent: Option<u8>,
    #[serde(default)]
    pub battery_percent: Option<u8>,
    /// Battery voltage in volts.
    #[serde(default)]
    pub battery: f64,
    #[serde(default)]
    pub action: MovingAction,
}

impl Roller {
    /// A stopped roller with nothing reported yet.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            device_type: 0,
            version: String::new(),
            closed_percent: None,
            battery_percent: None,
            battery: 0.0,
            action: MovingAction::Stopped,
        }
    }

    /// The reported name, or the roller id when the hub sent none.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Set the reported closed percentage (0 open, 100 closed).
    #[must_use]
    pub fn with_closed_percent(mut self, closed_percent: u8) -> Self {
        self.closed_percent = Some(closed_percent);
        self
    }

    /// Set the battery reading.
    #[must_use]
    pub fn with_battery(mut self, percent: u8, volts: f64) -> Self {
        self.battery_percent = Some(percent);
        self.battery = volts;
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: MovingAction) -> Self {
        self.action = action;
        self
    }
}
