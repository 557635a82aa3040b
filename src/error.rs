//! Caller-facing error taxonomy for the Cinder store.
//!
//! Every failure that crosses the store boundary is one of these variants.
//! Client-side failures that do not map onto them are logged and absorbed by
//! [`crate::store::CinderStore::get_size`].

use thiserror::Error;

use crate::config::ConfigError;
use crate::session::SessionError;

/// Name reported in configuration errors raised by this backend.
pub const STORE_NAME: &str = "cinder";

/// Errors raised by the Cinder store and its location parser.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum StoreError {
    /// Raised while parsing a location URI that does not follow the
    /// `cinder://<volume-id>` contract.
    #[error("malformed store URI: {reason}")]
    BadLocationFormat {
        /// Explanation of why the URI was rejected.
        reason: String,
    },
    /// Raised when the store cannot serve the request in its current
    /// environment (missing context, unresolvable endpoint, bad settings).
    #[error("store {store_name} could not be configured correctly: {reason}")]
    BadStoreConfiguration {
        /// Backend that reported the problem.
        store_name: String,
        /// Explanation of the configuration problem.
        reason: String,
    },
    /// Raised when the volume service reports that the volume does not exist.
    #[error("failed to get image size due to volume can not be found: {volume_id}")]
    NotFound {
        /// Identifier of the volume that was requested.
        volume_id: String,
    },
}

impl StoreError {
    pub(crate) fn bad_location(reason: impl Into<String>) -> Self {
        Self::BadLocationFormat {
            reason: reason.into(),
        }
    }

    pub(crate) fn bad_configuration(reason: impl Into<String>) -> Self {
        Self::BadStoreConfiguration {
            store_name: STORE_NAME.to_owned(),
            reason: reason.into(),
        }
    }
}

impl From<ConfigError> for StoreError {
    fn from(value: ConfigError) -> Self {
        Self::bad_configuration(value.to_string())
    }
}

impl From<SessionError> for StoreError {
    fn from(value: SessionError) -> Self {
        Self::bad_configuration(value.to_string())
    }
}
