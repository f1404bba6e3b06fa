//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`EcoHubError`]
//! via `#[from]` when crossing a port boundary.

/// Top-level error shared by the domain, application and adapter layers.
#[derive(Debug, thiserror::Error)]
pub enum EcoHubError {
    /// A domain invariant or a caller-supplied argument was rejected.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The requested item does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// An infrastructure failure (storage, hub client, …).
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Invalid input or broken domain invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("entity_id must not be empty")]
    EmptyEntityId,

    #[error("invalid identifier {value:?}")]
    InvalidId { value: String },

    #[error("unsupported hvac mode {mode:?}")]
    UnsupportedHvacMode { mode: String },

    #[error("unsupported preset mode {preset:?}")]
    UnsupportedPresetMode { preset: String },

    #[error("unknown service {service:?}")]
    UnknownService { service: String },

    #[error("missing field {field:?} in service data")]
    MissingField { field: &'static str },

    #[error("field {field:?} has an invalid value")]
    InvalidField { field: &'static str },

    #[error("at least one of target_temp_low or target_temp_high is required")]
    MissingTemperature,
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of item that was looked up (`"Entity"`, `"Device"`, `"Zone"`, …).
    pub entity: &'static str,
    /// The identifier that was looked up.
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_with_from() {
        let err: EcoHubError = ValidationError::EmptyName.into();
        assert!(matches!(
            err,
            EcoHubError::Validation(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn should_display_not_found_error() {
        let err = NotFoundError {
            entity: "Zone",
            id: "3".to_string(),
        };
        assert_eq!(err.to_string(), "Zone 3 not found");
    }

    #[test]
    fn should_display_unsupported_hvac_mode() {
        let err = ValidationError::UnsupportedHvacMode {
            mode: "cool".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported hvac mode \"cool\"");
    }

    #[test]
    fn should_keep_source_for_storage_error() {
        let io = std::io::Error::other("disk gone");
        let err = EcoHubError::Storage(Box::new(io));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "disk gone");
    }
}
