//! Automate integration configuration.

use serde::Deserialize;

use crate::roller::Roller;

/// Configuration for the Automate Pulse Hub integration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutomateConfig {
    /// Whether the daemon loads the integration at all.
    pub enabled: bool,
    /// Title of the config entry created for the hub.
    pub title: String,
    /// How many pending hub-update signals each platform may lag behind.
    pub signal_capacity: usize,
    /// Simulated travel time of a roller move, in milliseconds.
    ///
    /// `0` completes moves immediately.
    pub travel_millis: u64,
    /// Rollers the simulated hub reports on connect.
    pub rollers: Vec<Roller>,
}

impl Default for AutomateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "Automate Pulse Hub".to_string(),
            signal_capacity: 16,
            travel_millis: 0,
            rollers: Vec::new(),
        }
    }
}
