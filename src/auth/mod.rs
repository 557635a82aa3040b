//! Per-request authentication.
//!
//! An [`AuthPlugin`] supplies the token sent with each volume-service call and
//! resolves service endpoints on behalf of the caller that owns it.

mod catalog;

use std::fmt;

pub use catalog::{
    CatalogEndpoint, CatalogService, EndpointFilter, EndpointNotFound, ServiceCatalog,
};

/// Credentials and endpoint discovery for a single caller.
pub trait AuthPlugin: fmt::Debug + Send + Sync {
    /// Returns the token sent as `X-Auth-Token`.
    fn token(&self) -> &str;

    /// Resolves the endpoint URL matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointNotFound`] when no endpoint matches.
    fn endpoint(&self, filter: &EndpointFilter) -> Result<String, EndpointNotFound>;
}

/// Auth plugin backed by a pre-issued token and its service catalog.
#[derive(Clone)]
pub struct TokenAuth {
    token: String,
    catalog: ServiceCatalog,
}

impl TokenAuth {
    /// Wraps an existing token and the catalog issued with it.
    #[must_use]
    pub fn new(token: impl Into<String>, catalog: ServiceCatalog) -> Self {
        Self {
            token: token.into(),
            catalog,
        }
    }

    /// Returns the service catalog.
    #[must_use]
    pub const fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }
}

impl fmt::Debug for TokenAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuth")
            .field("token", &"<redacted>")
            .field("catalog", &self.catalog)
            .finish()
    }
}

impl AuthPlugin for TokenAuth {
    fn token(&self) -> &str {
        &self.token
    }

    fn endpoint(&self, filter: &EndpointFilter) -> Result<String, EndpointNotFound> {
        self.catalog.endpoint(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_token() {
        let auth = TokenAuth::new("s3cr3t", ServiceCatalog::default());
        let rendered = format!("{auth:?}");
        assert!(!rendered.contains("s3cr3t"));
        assert_eq!(auth.token(), "s3cr3t");
    }
}
