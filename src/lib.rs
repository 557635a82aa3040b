//! Cinder volume store driver.
//!
//! The crate lets an image service treat block-storage volumes as image
//! locations of the form `cinder://<volume-id>`. It parses and renders those
//! locations, owns the long-lived session to the volume service, builds a
//! fresh per-request client bound to the caller's credentials, and answers
//! size queries while translating backend failures into [`StoreError`].

pub mod auth;
pub mod cinder;
pub mod config;
pub mod context;
pub mod error;
pub mod location;
pub mod session;
pub mod store;
pub mod test_support;

pub use auth::{AuthPlugin, EndpointFilter, ServiceCatalog, TokenAuth};
pub use cinder::{ClientError, ClientFactory, HttpClientFactory, Volume, VolumeClient};
pub use config::{CatalogInfo, CinderConfig, ConfigError};
pub use context::{RequestContext, UserContext};
pub use error::StoreError;
pub use location::{CINDER_SCHEME, CinderLocation, EXAMPLE_URL, Location, StoreLocation};
pub use session::{Session, SessionError, SessionOptions};
pub use store::{BYTES_PER_GIB, CinderStore, SIZE_UNAVAILABLE, Store};
