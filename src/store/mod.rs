//! Store abstraction and the Cinder-backed implementation.

use std::future::Future;
use std::pin::Pin;

use crate::auth::EndpointFilter;
use crate::cinder::{
    ClientError, ClientFactory, ClientParams, EndpointSource, HttpClientFactory, VolumeClient,
    interpolate,
};
use crate::config::{CatalogInfo, CinderConfig};
use crate::context::RequestContext;
use crate::error::StoreError;
use crate::location::{CINDER_SCHEME, CinderLocation, Location, StoreLocation};
use crate::session::Session;

/// Future returned by store and client operations.
pub type BackendFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Size reported by [`CinderStore::get_size`] when the lookup failed for a
/// reason other than a missing volume or a configuration problem. Callers
/// treat it as "size unknown", not as an empty image.
pub const SIZE_UNAVAILABLE: u64 = 0;

/// Bytes per GiB, the unit the volume service reports sizes in.
pub const BYTES_PER_GIB: u64 = 1024 * 1024 * 1024;

const SCHEMES: &[&str] = &[CINDER_SCHEME];

/// Minimal interface implemented by image stores.
pub trait Store: Send + Sync {
    /// Backend-specific location type understood by the store.
    type Location: StoreLocation;

    /// Returns the URI schemes this store answers for.
    fn schemes(&self) -> &'static [&'static str];

    /// Returns the size in bytes of the image at `location`.
    fn get_size<'a>(
        &'a self,
        location: &'a Location<Self::Location>,
        context: Option<&'a dyn RequestContext>,
    ) -> BackendFuture<'a, u64, StoreError>;
}

/// Store that exposes Cinder volumes as image locations.
#[derive(Clone, Debug)]
pub struct CinderStore<F = HttpClientFactory> {
    session: Session,
    catalog: CatalogInfo,
    endpoint_template: Option<String>,
    region_name: Option<String>,
    http_retries: u32,
    factory: F,
}

impl CinderStore {
    /// Constructs a store that talks to the volume service over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BadStoreConfiguration`] when the configuration
    /// is invalid or the session cannot be built.
    pub fn new(config: &CinderConfig) -> Result<Self, StoreError> {
        Self::with_factory(config, HttpClientFactory::new())
    }
}

impl<F: ClientFactory> CinderStore<F> {
    /// Constructs a store using a custom client factory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BadStoreConfiguration`] when the configuration
    /// is invalid or the session cannot be built.
    pub fn with_factory(config: &CinderConfig, factory: F) -> Result<Self, StoreError> {
        config.validate()?;
        let catalog = config.catalog()?;
        let session = Session::from_options(config.session_options())?;
        Ok(Self {
            session,
            catalog,
            endpoint_template: config.endpoint_override().map(str::to_owned),
            region_name: config.region().map(str::to_owned),
            http_retries: config.http_retries,
            factory,
        })
    }

    /// Returns the catalog coordinates used for endpoint discovery.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogInfo {
        &self.catalog
    }

    /// Returns the shared session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Ensures a request context is present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BadStoreConfiguration`] when `context` is `None`.
    pub fn check_context(
        context: Option<&dyn RequestContext>,
    ) -> Result<&dyn RequestContext, StoreError> {
        context.ok_or_else(|| StoreError::bad_configuration("Cinder storage requires a context."))
    }

    /// Builds a fresh client bound to the caller in `context`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Template`] when the endpoint template cannot be
    /// rendered against the context.
    pub fn client_for(&self, context: &dyn RequestContext) -> Result<F::Client, ClientError> {
        let endpoint = match &self.endpoint_template {
            Some(template) => EndpointSource::Override(interpolate(template, &context.to_dict())?),
            None => EndpointSource::Catalog(EndpointFilter::new(
                &self.catalog,
                self.region_name.clone(),
            )),
        };
        let params = ClientParams {
            auth: context.auth_plugin(),
            endpoint,
            retries: self.http_retries,
        };
        Ok(self.factory.build(&self.session, params))
    }

    /// Returns the size in bytes of the volume behind `location`.
    ///
    /// Failures other than a missing volume or an unresolvable endpoint are
    /// logged and reported as [`SIZE_UNAVAILABLE`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BadStoreConfiguration`] when `context` is `None`
    /// or the endpoint cannot be determined, and [`StoreError::NotFound`]
    /// when the volume does not exist.
    pub async fn get_size(
        &self,
        location: &Location<CinderLocation>,
        context: Option<&dyn RequestContext>,
    ) -> Result<u64, StoreError> {
        let ctx = Self::check_context(context)?;
        let volume_id = location.store_location.volume_id();

        match self.lookup_size(volume_id, ctx).await {
            Ok(bytes) => Ok(bytes),
            Err(ClientError::NotFound { .. }) => {
                tracing::error!(
                    volume_id,
                    "Failed to get image size due to volume can not be found"
                );
                Err(StoreError::NotFound {
                    volume_id: volume_id.to_owned(),
                })
            }
            Err(ClientError::EndpointNotFound(err)) => {
                tracing::error!(volume_id, error = %err, "Cinder endpoint could not be determined");
                Err(StoreError::bad_configuration(
                    "Cinder endpoint could not be determined",
                ))
            }
            Err(err) => {
                tracing::error!(
                    volume_id,
                    error = %err,
                    "Failed to get image size due to internal error"
                );
                Ok(SIZE_UNAVAILABLE)
            }
        }
    }

    async fn lookup_size(
        &self,
        volume_id: &str,
        context: &dyn RequestContext,
    ) -> Result<u64, ClientError> {
        let client = self.client_for(context)?;
        let volume = client.get_volume(volume_id).await?;
        volume
            .size
            .checked_mul(BYTES_PER_GIB)
            .ok_or_else(|| ClientError::Decode {
                message: format!("volume size {} GiB overflows a byte count", volume.size),
            })
    }
}

impl<F: ClientFactory> Store for CinderStore<F> {
    type Location = CinderLocation;

    fn schemes(&self) -> &'static [&'static str] {
        SCHEMES
    }

    fn get_size<'a>(
        &'a self,
        location: &'a Location<Self::Location>,
        context: Option<&'a dyn RequestContext>,
    ) -> BackendFuture<'a, u64, StoreError> {
        Box::pin(Self::get_size(self, location, context))
    }
}
