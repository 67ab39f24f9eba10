//! # pulsehub-domain
//!
//! Pure domain model for the pulsehub home automation core.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Entities** (state holders with identity: covers, sensors, …)
//! - Define **Devices** (physical things that expose one or more entities)
//! - Define **Config entries** (one configured instance of an integration)
//! - Define **Cover** semantics (feature flags, state derivation)
//! - Define **Services** (commands: `open_cover`, `set_cover_position`, …)
//! - Define **Events** (state-change records)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod config_entry;
pub mod cover;
pub mod device;
pub mod entity;
pub mod event;
pub mod service;
