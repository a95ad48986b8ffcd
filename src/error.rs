//! Error types for connection bootstrap.

use thiserror::Error;

/// Result type for bootstrap operations.
pub type RigResult<T> = Result<T, RigError>;

/// Errors that can occur while preparing a connection.
///
/// Everything in this enum is raised synchronously, before any network
/// activity. Connectivity failures (unreachable host, rejected auth, socket
/// timeout) never show up here; they surface through the lifecycle
/// [`Error`](crate::events::LifecycleEvent::Error) and
/// [`Disconnected`](crate::events::LifecycleEvent::Disconnected) events once
/// the driver owns the connection attempt.
#[derive(Error, Debug)]
pub enum RigError {
    /// Driver generation outside the accepted range.
    #[error("driver version {found} does not satisfy required {required}")]
    VersionMismatch {
        /// The semver requirement the gate was configured with.
        required: String,
        /// The version string the driver reported.
        found: String,
    },

    /// Connection URI could not be decomposed into host/database parts.
    #[error("invalid connection URI: {0}")]
    InvalidUri(String),

    /// A required configuration field is absent.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The handle has already been opened; a second open would attach a
    /// duplicate listener set.
    #[error("connection handle is already open")]
    AlreadyOpen,

    /// MongoDB driver error.
    #[error("mongodb error: {0}")]
    Driver(#[from] mongodb::error::Error),
}

impl RigError {
    /// Create an invalid-URI error.
    pub fn invalid_uri(message: impl Into<String>) -> Self {
        Self::InvalidUri(message.into())
    }

    /// Create a missing-field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a version-gate rejection.
    pub fn is_version_mismatch(&self) -> bool {
        matches!(self, Self::VersionMismatch { .. })
    }

    /// Check if this is a URI parse failure.
    pub fn is_uri_error(&self) -> bool {
        matches!(self, Self::InvalidUri(_))
    }

    /// Check if this is a double-open rejection.
    pub fn is_already_open(&self) -> bool {
        matches!(self, Self::AlreadyOpen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = RigError::invalid_uri("no hosts");
        assert!(err.is_uri_error());

        let err = RigError::VersionMismatch {
            required: "^2.8".to_string(),
            found: "3.1.0".to_string(),
        };
        assert!(err.is_version_mismatch());

        let err = RigError::AlreadyOpen;
        assert!(err.is_already_open());
    }

    #[test]
    fn test_error_display() {
        let err = RigError::invalid_uri("missing database name");
        assert_eq!(
            err.to_string(),
            "invalid connection URI: missing database name"
        );

        let err = RigError::missing_field("MONGO_HOST");
        assert_eq!(err.to_string(), "missing required field: MONGO_HOST");

        let err = RigError::VersionMismatch {
            required: "^2.8".to_string(),
            found: "2.7.0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "driver version 2.7.0 does not satisfy required ^2.8"
        );
    }
}
