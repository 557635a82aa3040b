//! Identity-service catalog decoding and endpoint selection.

use serde::Deserialize;
use thiserror::Error;

use crate::config::CatalogInfo;

/// Raised when no catalog entry matches an [`EndpointFilter`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error(
    "no {interface} endpoint for service type {service_type} \
     (name {service_name:?}, region {region_name:?})"
)]
pub struct EndpointNotFound {
    /// Service type that was requested.
    pub service_type: String,
    /// Service name that was requested; empty matches any name.
    pub service_name: String,
    /// Normalised interface that was requested.
    pub interface: String,
    /// Region that was requested, if any.
    pub region_name: Option<String>,
}

/// Criteria used to pick an endpoint from a [`ServiceCatalog`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EndpointFilter {
    /// Service type, for example `volume`.
    pub service_type: String,
    /// Service name; empty matches any name.
    pub service_name: String,
    /// Interface, either `public`/`internal`/`admin` or the legacy
    /// `publicURL`/`internalURL`/`adminURL` spelling.
    pub interface: String,
    /// Region restriction.
    pub region_name: Option<String>,
}

impl EndpointFilter {
    /// Builds a filter from configured catalog coordinates.
    #[must_use]
    pub fn new(catalog: &CatalogInfo, region_name: Option<String>) -> Self {
        Self {
            service_type: catalog.service_type.clone(),
            service_name: catalog.service_name.clone(),
            interface: catalog.endpoint_type.clone(),
            region_name,
        }
    }

    /// Returns the interface with any legacy `URL` suffix removed.
    #[must_use]
    pub fn normalised_interface(&self) -> &str {
        normalise_interface(&self.interface)
    }

    fn not_found(&self) -> EndpointNotFound {
        EndpointNotFound {
            service_type: self.service_type.clone(),
            service_name: self.service_name.clone(),
            interface: self.normalised_interface().to_owned(),
            region_name: self.region_name.clone(),
        }
    }
}

fn normalise_interface(value: &str) -> &str {
    value.strip_suffix("URL").unwrap_or(value)
}

/// Service catalog as returned by the identity service (v3 layout).
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct ServiceCatalog {
    services: Vec<CatalogService>,
}

/// A service entry in the catalog.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct CatalogService {
    /// Service type, for example `volume`.
    #[serde(rename = "type")]
    pub service_type: String,
    /// Service name, for example `cinder`.
    #[serde(default)]
    pub name: String,
    /// Endpoints published for the service.
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpoint>,
}

/// A single endpoint published for a service.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct CatalogEndpoint {
    /// Interface (`public`, `internal` or `admin`).
    pub interface: String,
    /// Region the endpoint serves.
    #[serde(default)]
    pub region: Option<String>,
    /// Base URL of the endpoint.
    pub url: String,
}

impl ServiceCatalog {
    /// Creates a catalog from decoded services.
    #[must_use]
    pub const fn new(services: Vec<CatalogService>) -> Self {
        Self { services }
    }

    /// Decodes a catalog from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns the decoder error when the payload is not a catalog.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// Returns the services in the catalog.
    #[must_use]
    pub fn services(&self) -> &[CatalogService] {
        &self.services
    }

    /// Returns the URL of the first endpoint matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointNotFound`] when nothing matches.
    pub fn endpoint(&self, filter: &EndpointFilter) -> Result<String, EndpointNotFound> {
        let interface = filter.normalised_interface();
        self.services
            .iter()
            .filter(|service| service.service_type == filter.service_type)
            .filter(|service| filter.service_name.is_empty() || service.name == filter.service_name)
            .flat_map(|service| service.endpoints.iter())
            .filter(|endpoint| normalise_interface(&endpoint.interface) == interface)
            .find(|endpoint| {
                filter
                    .region_name
                    .as_deref()
                    .is_none_or(|region| endpoint.region.as_deref() == Some(region))
            })
            .map(|endpoint| endpoint.url.clone())
            .ok_or_else(|| filter.not_found())
    }
}
