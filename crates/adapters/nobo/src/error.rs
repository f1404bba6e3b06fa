//! Nobø adapter error types.

use ecohub_domain::error::EcoHubError;

/// Errors specific to the Nobø adapter.
#[derive(Debug, thiserror::Error)]
pub enum NoboError {
    /// The hub client failed to carry out a request.
    #[error("hub request failed")]
    Hub(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The hub does not know the zone a request targeted.
    #[error("zone {0} is unknown to the hub")]
    UnknownZone(String),

    /// A simulated-hub fixture could not be parsed.
    #[error("invalid hub fixture")]
    Fixture(#[from] toml::de::Error),

    /// A domain-level error (validation, not-found, etc.).
    #[error("domain error")]
    Domain(#[source] EcoHubError),
}

impl NoboError {
    /// Convert into an [`EcoHubError`] for propagation across port
    /// boundaries. Everything that is not already a domain error surfaces
    /// as [`EcoHubError::Storage`].
    #[must_use]
    pub fn into_domain(self) -> EcoHubError {
        match self {
            Self::Domain(err) => err,
            other => EcoHubError::Storage(Box::new(other)),
        }
    }
}

impl From<NoboError> for EcoHubError {
    fn from(err: NoboError) -> Self {
        err.into_domain()
    }
}

impl From<EcoHubError> for NoboError {
    fn from(err: EcoHubError) -> Self {
        Self::Domain(err)
    }
}
