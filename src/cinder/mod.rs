//! Volume-service client used by the Cinder store.
//!
//! The store never talks HTTP directly: it asks a [`ClientFactory`] for a
//! fresh [`VolumeClient`] on every request, bound to that request's
//! credentials. [`HttpClientFactory`] is the production factory.

mod client;
mod error;
mod template;
mod types;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthPlugin, EndpointFilter};
use crate::session::Session;
use crate::store::BackendFuture;

pub use client::CinderClient;
pub use error::ClientError;
pub use template::interpolate;
pub use types::Volume;

/// Initial delay before the first retry of a failed call.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Upper bound for the delay between retries.
pub const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(60);

/// Where a client sends its requests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EndpointSource {
    /// Explicit endpoint rendered from the configured template.
    Override(String),
    /// Endpoint looked up in the caller's service catalog.
    Catalog(EndpointFilter),
}

/// Everything needed to build a request-scoped client.
#[derive(Clone, Debug)]
pub struct ClientParams {
    /// Credentials of the caller the client acts for.
    pub auth: Arc<dyn AuthPlugin>,
    /// Endpoint selection.
    pub endpoint: EndpointSource,
    /// Retries performed on transient failures.
    pub retries: u32,
}

/// Read access to volume metadata.
pub trait VolumeClient: Send + Sync {
    /// Fetches a volume by identifier.
    fn get_volume<'a>(&'a self, volume_id: &'a str) -> BackendFuture<'a, Volume, ClientError>;
}

/// Builds request-scoped volume clients.
pub trait ClientFactory: Send + Sync {
    /// Client type produced by this factory.
    type Client: VolumeClient;

    /// Builds a client bound to `session` and the caller in `params`.
    fn build(&self, session: &Session, params: ClientParams) -> Self::Client;
}

/// Factory producing HTTP [`CinderClient`]s.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HttpClientFactory {
    backoff: Duration,
}

impl HttpClientFactory {
    /// Creates a factory using [`DEFAULT_RETRY_BACKOFF`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_backoff(DEFAULT_RETRY_BACKOFF)
    }

    /// Creates a factory with a custom initial retry delay.
    #[must_use]
    pub const fn with_backoff(backoff: Duration) -> Self {
        Self { backoff }
    }
}

impl Default for HttpClientFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientFactory for HttpClientFactory {
    type Client = CinderClient;

    fn build(&self, session: &Session, params: ClientParams) -> Self::Client {
        CinderClient::new(session.http().clone(), params, self.backoff)
    }
}
