//! Event — an immutable record of something that happened.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::{EntityId, EventId};
use crate::time::{Timestamp, now};

/// What kind of thing happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    StateChanged,
    EntityCreated,
    EntityRemoved,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StateChanged => f.write_str("state_changed"),
            Self::EntityCreated => f.write_str("entity_created"),
            Self::EntityRemoved => f.write_str("entity_removed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub entity_id: Option<EntityId>,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Event stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(
        event_type: EventType,
        entity_id: Option<EntityId>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            entity_id,
            data,
            timestamp: now(),
        }
    }

    /// A `state_changed` event carrying the previous and the new snapshot.
    #[must_use]
    pub fn state_changed(old: Option<&Entity>, new: &Entity) -> Self {
        Self::new(
            EventType::StateChanged,
            Some(new.id),
            serde_json::json!({
                "entity_id": new.entity_id,
                "old_state": old.map(|e| e.state.to_string()),
                "new_state": new.state.to_string(),
                "attributes": new.attributes,
            }),
        )
    }
}
