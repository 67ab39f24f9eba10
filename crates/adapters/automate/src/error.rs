//! Automate adapter error types.

use pulsehub_domain::error::PulseHubError;

/// Errors specific to the Automate adapter.
#[derive(Debug, thiserror::Error)]
pub enum AutomateError {
    /// The hub client returned an error.
    #[error("hub client error")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The hub connection could not be set up.
    #[error("hub setup failed")]
    SetupFailed,

    /// The hub connection could not be reset.
    #[error("hub unload failed")]
    UnloadFailed,

    /// A domain-level error (validation, not-found, etc.).
    #[error("domain error")]
    Domain(#[source] PulseHubError),
}

impl AutomateError {
    pub(crate) fn client<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Client(Box::new(err))
    }

    /// Convert into a [`PulseHubError`] for propagation across port boundaries.
    #[must_use]
    pub fn into_domain(self) -> PulseHubError {
        match self {
            Self::Domain(err) => err,
            other => PulseHubError::Integration(Box::new(other)),
        }
    }
}

impl From<AutomateError> for PulseHubError {
    fn from(err: AutomateError) -> Self {
        err.into_domain()
    }
}

impl From<PulseHubError> for AutomateError {
    fn from(err: PulseHubError) -> Self {
        Self::Domain(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsehub_domain::error::ValidationError;

    #[test]
    fn should_display_setup_failed() {
        assert_eq!(AutomateError::SetupFailed.to_string(), "hub setup failed");
    }

    #[test]
    fn should_keep_client_error_as_source() {
        let err = AutomateError::client(std::io::Error::other("hub unreachable"));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "hub unreachable");
    }

    #[test]
    fn should_convert_client_error_to_integration_error() {
        let err: PulseHubError = AutomateError::client(std::io::Error::other("boom")).into();
        assert!(matches!(err, PulseHubError::Integration(_)));
    }

    #[test]
    fn should_convert_domain_error_back_to_domain() {
        let err: PulseHubError =
            AutomateError::Domain(PulseHubError::Validation(ValidationError::EmptyName)).into();
        assert!(matches!(err, PulseHubError::Validation(_)));
    }
}
