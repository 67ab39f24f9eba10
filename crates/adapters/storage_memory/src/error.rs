//! Storage-specific error type.

use pulsehub_domain::error::PulseHubError;

/// Errors originating from the in-memory storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Another entity already uses this `<domain>.<object_id>`.
    #[error("entity id {0:?} is already taken")]
    DuplicateEntityId(String),

    /// Another device already uses this `(integration, unique_id)` pair.
    #[error("device {integration}/{unique_id} already exists")]
    DuplicateDevice {
        integration: String,
        unique_id: String,
    },
}

impl From<StorageError> for PulseHubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
