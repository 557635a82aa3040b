//! Error types for the volume client.

use thiserror::Error;

use crate::auth::EndpointNotFound;

/// Errors raised while building or using a volume client.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ClientError {
    /// Raised when the service reports the volume does not exist.
    #[error("volume {volume_id} not found")]
    NotFound {
        /// Volume identifier that was requested.
        volume_id: String,
    },
    /// Raised when no endpoint can be resolved for the volume service.
    #[error(transparent)]
    EndpointNotFound(#[from] EndpointNotFound),
    /// Raised when the endpoint template references an unknown key or is
    /// malformed.
    #[error("invalid endpoint template: {message}")]
    Template {
        /// Description of the template problem.
        message: String,
    },
    /// Raised when the request fails below HTTP (connect, timeout, TLS).
    #[error("transport error: {message}")]
    Transport {
        /// Message returned by the HTTP stack.
        message: String,
    },
    /// Raised when the service answers with an unexpected status.
    #[error("volume service returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },
    /// Raised when the response body cannot be decoded.
    #[error("failed to decode volume response: {message}")]
    Decode {
        /// Decoder error message.
        message: String,
    },
}
