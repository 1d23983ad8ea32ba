//! Unified error handling for the client engine.
//!
//! Recoverable failures (rejected remote calls, malformed responses) never
//! surface through this type - they are absorbed by the rollback-and-notify
//! path at each call site. `ClientError` covers only setup paths where
//! there is nothing to roll back.

use thiserror::Error;

use crate::config::ConfigError;
use crate::remote::RemoteError;

/// Application-level error type for the client engine.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Remote client construction or call failed.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::Remote(RemoteError::Status(500));
        assert_eq!(err.to_string(), "Remote error: remote returned status 500");

        let err = ClientError::Config(ConfigError::MissingEnvVar("VITRINE_BASE_URL".into()));
        assert_eq!(
            err.to_string(),
            "Config error: Missing environment variable: VITRINE_BASE_URL"
        );
    }
}
