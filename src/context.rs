//! Request context capability consumed by the store.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::auth::{AuthPlugin, ServiceCatalog, TokenAuth};

/// What the store needs to know about the caller of a request.
pub trait RequestContext: Send + Sync {
    /// Returns the values available to endpoint-template interpolation.
    fn to_dict(&self) -> BTreeMap<String, String>;

    /// Returns the auth plugin used to authenticate this caller's calls.
    fn auth_plugin(&self) -> Arc<dyn AuthPlugin>;
}

/// Request context for an authenticated user.
#[derive(Clone, Debug)]
pub struct UserContext {
    user_id: String,
    project_id: String,
    auth: Arc<TokenAuth>,
}

impl UserContext {
    /// Creates a context from the caller's identity, token and catalog.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        project_id: impl Into<String>,
        auth_token: impl Into<String>,
        service_catalog: ServiceCatalog,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            project_id: project_id.into(),
            auth: Arc::new(TokenAuth::new(auth_token, service_catalog)),
        }
    }

    /// Creates a context from a JSON-encoded service catalog, as forwarded
    /// by an authenticating proxy.
    ///
    /// # Errors
    ///
    /// Returns the decoder error when the catalog is not valid JSON.
    pub fn from_catalog_json(
        user_id: impl Into<String>,
        project_id: impl Into<String>,
        auth_token: impl Into<String>,
        catalog_json: &str,
    ) -> Result<Self, serde_json::Error> {
        let catalog = ServiceCatalog::from_json(catalog_json)?;
        Ok(Self::new(user_id, project_id, auth_token, catalog))
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the project identifier.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

impl RequestContext for UserContext {
    fn to_dict(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (String::from("user_id"), self.user_id.clone()),
            (String::from("user"), self.user_id.clone()),
            (String::from("project_id"), self.project_id.clone()),
            (String::from("tenant"), self.project_id.clone()),
        ])
    }

    fn auth_plugin(&self) -> Arc<dyn AuthPlugin> {
        self.auth.clone()
    }
}
