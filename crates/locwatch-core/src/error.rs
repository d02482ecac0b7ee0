//! Error types shared by every locwatch crate

use thiserror::Error;

use crate::types::RequestCode;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy, organized by where the error originates
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration incomplete: `{field}` is required")]
    ConfigurationIncomplete { field: &'static str },

    #[error("Invalid configuration: {message}")]
    ConfigInvalid { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ─────────────────────────────────────────────────────────────
    // Tracking State Machine Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Permission result for request {request_code} does not match an outstanding request")]
    StalePermissionResult { request_code: RequestCode },

    #[error("A location subscription is already open")]
    SubscriptionAlreadyOpen,

    #[error("Tracking controller has been destroyed")]
    ControllerDestroyed,

    // ─────────────────────────────────────────────────────────────
    // Platform/Communication Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Platform error: {message}")]
    Platform { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn incomplete(field: &'static str) -> Self {
        Self::ConfigurationIncomplete { field }
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn stale_result(request_code: RequestCode) -> Self {
        Self::StalePermissionResult { request_code }
    }

    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// The state machine guards produce these; they are logged and dropped
    /// rather than surfaced to the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::StalePermissionResult { .. }
                | Error::SubscriptionAlreadyOpen
                | Error::ControllerDestroyed
                | Error::Platform { .. }
        )
    }

    /// Check if this error prevents a controller from being built
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigurationIncomplete { .. } | Error::ConfigInvalid { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::incomplete("on_location");
        assert_eq!(
            err.to_string(),
            "Configuration incomplete: `on_location` is required"
        );

        let err = Error::stale_result(RequestCode(0x1234));
        assert!(err.to_string().contains("0x1234"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_fatal() {
        assert!(Error::incomplete("lifecycle").is_fatal());
        assert!(Error::config_invalid("interval_ms must be positive").is_fatal());
        assert!(!Error::SubscriptionAlreadyOpen.is_fatal());
        assert!(!Error::platform("unavailable").is_fatal());
    }

    #[test]
    fn test_error_is_recoverable() {
        assert!(Error::stale_result(RequestCode::TRACKING).is_recoverable());
        assert!(Error::SubscriptionAlreadyOpen.is_recoverable());
        assert!(Error::ControllerDestroyed.is_recoverable());
        assert!(!Error::incomplete("on_location").is_recoverable());
    }

    #[test]
    fn test_result_ext_preserves_error() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "nope",
        ));
        let err = result.context("writing settings").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
