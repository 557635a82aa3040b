//! Location parsing for `cinder://` image locations.
//!
//! A location URI is persisted alongside image records, so the rendered form
//! must stay byte-exact: `cinder://<volume-id>`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::StoreError;

/// URI scheme answered by the Cinder store.
pub const CINDER_SCHEME: &str = "cinder";

/// Example location shown in operator-facing help output.
pub const EXAMPLE_URL: &str = "cinder://<VOLUME_ID>";

const URI_PREFIX: &str = "cinder://";
const HYPHENATED_UUID_LEN: usize = 36;

/// Backend-specific part of a [`Location`].
pub trait StoreLocation: Clone + fmt::Debug + Eq + Send + Sync + Sized {
    /// Parses and validates a location URI.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BadLocationFormat`] when the URI does not follow
    /// the backend's format.
    fn parse_uri(uri: &str) -> Result<Self, StoreError>;

    /// Builds a location from trusted key/value specs without validation.
    fn from_specs(specs: &BTreeMap<String, String>) -> Self;

    /// Renders the canonical URI for this location.
    fn uri(&self) -> String;
}

/// Location of an image stored as a Cinder volume.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CinderLocation {
    scheme: String,
    volume_id: String,
}

impl CinderLocation {
    /// Creates a location for the given volume without validating its shape.
    #[must_use]
    pub fn new(volume_id: impl Into<String>) -> Self {
        Self {
            scheme: CINDER_SCHEME.to_owned(),
            volume_id: volume_id.into(),
        }
    }

    /// Returns the URI scheme.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the volume identifier.
    #[must_use]
    pub fn volume_id(&self) -> &str {
        &self.volume_id
    }
}

impl StoreLocation for CinderLocation {
    fn parse_uri(uri: &str) -> Result<Self, StoreError> {
        let Some(volume_id) = uri.strip_prefix(URI_PREFIX) else {
            let reason = format!("URI must start with '{URI_PREFIX}'");
            tracing::info!("{reason}");
            return Err(StoreError::bad_location(reason));
        };

        if !is_uuid_like(volume_id) {
            let reason = "URI contains invalid volume ID";
            tracing::info!(volume_id, "{reason}");
            return Err(StoreError::bad_location(reason));
        }

        Ok(Self::new(volume_id))
    }

    fn from_specs(specs: &BTreeMap<String, String>) -> Self {
        Self {
            scheme: specs
                .get("scheme")
                .cloned()
                .unwrap_or_else(|| CINDER_SCHEME.to_owned()),
            volume_id: specs.get("volume_id").cloned().unwrap_or_default(),
        }
    }

    fn uri(&self) -> String {
        format!("{URI_PREFIX}{}", self.volume_id)
    }
}

impl fmt::Display for CinderLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{URI_PREFIX}{}", self.volume_id)
    }
}

impl FromStr for CinderLocation {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_uri(s)
    }
}

/// Image location resolved to a specific store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Location<L: StoreLocation = CinderLocation> {
    /// Name of the store that owns the location.
    pub store_name: String,
    /// Backend-specific locator.
    pub store_location: L,
}

impl<L: StoreLocation> Location<L> {
    /// Parses a URI into a location owned by `store_name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BadLocationFormat`] when the URI is malformed.
    pub fn from_uri(store_name: impl Into<String>, uri: &str) -> Result<Self, StoreError> {
        Ok(Self {
            store_name: store_name.into(),
            store_location: L::parse_uri(uri)?,
        })
    }

    /// Builds a location from trusted specs.
    #[must_use]
    pub fn from_specs(store_name: impl Into<String>, specs: &BTreeMap<String, String>) -> Self {
        Self {
            store_name: store_name.into(),
            store_location: L::from_specs(specs),
        }
    }

    /// Returns the canonical URI of the backend-specific locator.
    #[must_use]
    pub fn uri(&self) -> String {
        self.store_location.uri()
    }
}

/// Returns `true` for the hyphenated 8-4-4-4-12 hexadecimal form, in any case.
#[must_use]
pub fn is_uuid_like(value: &str) -> bool {
    // The length check rules out the simple, braced and URN forms that
    // `Uuid::try_parse` would otherwise accept.
    value.len() == HYPHENATED_UUID_LEN && Uuid::try_parse(value).is_ok()
}
