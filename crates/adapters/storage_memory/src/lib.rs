//! # pulsehub-adapter-storage-memory
//!
//! In-memory persistence adapter.
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `pulsehub-app::ports::storage`
//! - Enforce the uniqueness rules a database schema would (entity id string,
//!   `(integration, unique_id)` pair)
//!
//! Nothing survives a restart; devices and entities are rediscovered from
//! the hub on every start.
//!
//! ## Dependency rule
//! Depends on `pulsehub-app` (for port traits) and `pulsehub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod device_repo;
mod entity_repo;
mod error;

pub use device_repo::InMemoryDeviceRepository;
pub use entity_repo::InMemoryEntityRepository;
pub use error::StorageError;
