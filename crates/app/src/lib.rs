//! # pulsehub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `EntityRepository` — CRUD for entities
//!   - `DeviceRepository` — CRUD for devices
//!   - `EventPublisher` — fan-out of domain events
//!   - `Integration` / `IntegrationContext` — the contract device integrations plug into
//! - Define **driving/inbound ports** as use-case structs:
//!   - `EntityService` — register, upsert, update state, list, get
//!   - `DeviceService` — register, upsert, list, get
//! - Provide **in-process infrastructure** that doesn't need IO:
//!   the event bus, the per-entry data store and the signal dispatcher
//!
//! ## Dependency rule
//! Depends on `pulsehub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod dispatcher;
pub mod entry_store;
pub mod event_bus;
pub mod ports;
pub mod services;
