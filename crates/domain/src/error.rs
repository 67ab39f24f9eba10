//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`PulseHubError`] via `#[from]` or an explicit `From` impl.

use crate::service::ServiceCallError;

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum PulseHubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("service call rejected")]
    Service(#[from] ServiceCallError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("integration error")]
    Integration(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("entity id must not be empty")]
    EmptyEntityId,

    #[error("entity id {0:?} must have the form <domain>.<object_id>")]
    MalformedEntityId(String),

    #[error("integration must not be empty")]
    EmptyIntegration,

    #[error("unique id must not be empty")]
    EmptyUniqueId,
}

/// A lookup did not match anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of the missing thing (`"Entity"`, `"Device"`, …).
    pub entity: &'static str,
    /// Identifier that was looked up.
    pub id: String,
}
