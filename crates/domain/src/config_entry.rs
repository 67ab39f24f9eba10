//! Config entry — one configured instance of an integration.

use serde::{Deserialize, Serialize};

use crate::id::EntryId;

/// Lifecycle state of a config entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigEntryState {
    #[default]
    NotLoaded,
    Loaded,
    /// Setup returned failure; the entry stays unloaded.
    SetupError,
    /// Unload returned failure; the entry's resources may still be held.
    FailedUnload,
}

impl ConfigEntryState {
    /// Whether setup may be attempted from this state.
    #[must_use]
    pub fn can_setup(self) -> bool {
        matches!(self, Self::NotLoaded | Self::SetupError)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: EntryId,
    /// Integration domain (e.g. `"automate"`).
    pub domain: String,
    pub title: String,
    #[serde(default)]
    pub state: ConfigEntryState,
}

impl ConfigEntry {
    /// Fresh entry in the `not_loaded` state.
    #[must_use]
    pub fn new(domain: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            entry_id: EntryId::new(),
            domain: domain.into(),
            title: title.into(),
            state: ConfigEntryState::NotLoaded,
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state == ConfigEntryState::Loaded
    }
}
