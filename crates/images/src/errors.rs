//! Error taxonomy for image builder operations.
//!
//! Every failure is returned to the caller as-is. Nothing here is retried or
//! classified beyond which step failed; whether and when to try again is the
//! caller's decision.

use thiserror::Error;

use crate::BuildFlavor;

/// Errors produced by [`crate::ImageBuilder`] operations.
///
/// When any of these is returned the build record passed to the operation has
/// not been modified.
#[derive(Debug, Error)]
pub enum ImageBuilderError {
    /// The request never produced an HTTP response (DNS, connect, reset, TLS).
    #[error("Failed to reach image builder at '{url}': {message}")]
    Transport {
        /// URL that was being requested.
        url: String,
        /// Underlying transport failure.
        message: String,
    },

    /// The configured request deadline elapsed before a response arrived.
    #[error("Request to image builder at '{url}' timed out")]
    Timeout {
        /// URL that was being requested.
        url: String,
    },

    /// The service answered with a status other than the one the operation
    /// expects (201 for submission, 200 for status).
    #[error("Error requesting image builder at '{url}', got status code {status} and body {body}")]
    UnexpectedStatus {
        /// URL that was being requested.
        url: String,
        /// HTTP status code received.
        status: u16,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// The response body was not the JSON shape the operation expects.
    #[error("Failed to decode image builder response from '{url}': {message}")]
    Decode {
        /// URL that was being requested.
        url: String,
        /// Decoder error.
        message: String,
    },

    /// The service reported success but omitted the payload success implies.
    #[error("Malformed success response from image builder: {reason}")]
    MalformedSuccess {
        /// What was missing.
        reason: String,
    },

    /// Status was requested for a flavor that has no stored job id.
    #[error("No compose job id recorded for the {flavor} build")]
    MissingJobId {
        /// Flavor whose job id was absent.
        flavor: BuildFlavor,
    },

    /// A forwarded header could not be expressed as an HTTP header.
    #[error("Invalid forwarded header '{name}'")]
    InvalidHeader {
        /// Offending header name.
        name: String,
    },

    /// The adapter was constructed with unusable settings.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_includes_body() {
        let err = ImageBuilderError::UnexpectedStatus {
            url: "http://ib/v1/compose".to_string(),
            status: 500,
            body: "boom".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_missing_job_id_names_flavor() {
        let err = ImageBuilderError::MissingJobId {
            flavor: BuildFlavor::Installer,
        };
        assert_eq!(err.to_string(), "No compose job id recorded for the installer build");
    }
}
