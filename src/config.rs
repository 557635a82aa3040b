//! Configuration loading via `ortho-config`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::session::SessionOptions;

/// Default service catalog match for the volume service.
pub const DEFAULT_CATALOG_INFO: &str = "volume:cinder:publicURL";

/// Default number of retries handed to the volume client.
pub const DEFAULT_HTTP_RETRIES: u32 = 3;

/// Cinder store settings derived from environment variables, configuration
/// files, and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "CINDER",
    discovery(
        app_name = "cinder-store",
        env_var = "CINDER_STORE_CONFIG_PATH",
        config_file_name = "cinder-store.toml",
        dotfile_name = ".cinder-store.toml",
        project_file_name = "cinder-store.toml"
    )
)]
pub struct CinderConfig {
    /// Service catalog match in the form
    /// `<service_type>:<service_name>:<endpoint_type>`.
    #[ortho_config(default = DEFAULT_CATALOG_INFO.to_owned())]
    pub catalog_info: String,
    /// Endpoint template overriding the catalog lookup, for example
    /// `http://localhost:8776/v2/%(project_id)s`.
    pub endpoint_template: Option<String>,
    /// Region used to narrow the catalog lookup.
    pub region_name: Option<String>,
    /// Retries the volume client performs on failed HTTP calls.
    #[ortho_config(default = DEFAULT_HTTP_RETRIES)]
    pub http_retries: u32,
    /// PEM bundle trusted in addition to the system roots.
    pub ca_file: Option<String>,
    /// PEM client certificate presented to the volume service.
    pub cert_file: Option<String>,
    /// PEM private key for `cert_file`, when not bundled with it.
    pub key_file: Option<String>,
    /// Skips TLS certificate verification.
    #[ortho_config(default = false)]
    pub insecure: bool,
    /// Per-request transport timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for CinderConfig {
    fn default() -> Self {
        Self {
            catalog_info: DEFAULT_CATALOG_INFO.to_owned(),
            endpoint_template: None,
            region_name: None,
            http_retries: DEFAULT_HTTP_RETRIES,
            ca_file: None,
            cert_file: None,
            key_file: None,
            insecure: false,
            timeout_secs: None,
        }
    }
}

impl CinderConfig {
    /// Loads configuration using the `ortho-config` derive. Values merge
    /// defaults, configuration files, environment variables, and CLI flags in
    /// that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load().map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads configuration without attempting to parse CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("cinder-store")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when `catalog_info` is blank,
    /// [`ConfigError::InvalidCatalogInfo`] when it does not have three parts,
    /// and [`ConfigError::Invalid`] for blank file paths or a key file
    /// without a certificate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog_info.trim().is_empty() {
            return Err(ConfigError::MissingField(String::from(concat!(
                "missing catalog_info: set CINDER_CATALOG_INFO ",
                "or add catalog_info to cinder-store.toml",
            ))));
        }
        self.catalog()?;
        reject_blank("ca_file", self.ca_file.as_deref())?;
        reject_blank("cert_file", self.cert_file.as_deref())?;
        reject_blank("key_file", self.key_file.as_deref())?;
        if self.key_file.is_some() && self.cert_file.is_none() {
            return Err(ConfigError::Invalid {
                field: String::from("key_file"),
                message: String::from("key_file requires cert_file"),
            });
        }
        Ok(())
    }

    /// Parses `catalog_info` into its three parts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCatalogInfo`] when the value does not
    /// contain exactly three colon-separated fields. Fields may be empty.
    pub fn catalog(&self) -> Result<CatalogInfo, ConfigError> {
        self.catalog_info.parse()
    }

    /// Returns the endpoint template, treating a blank value as unset.
    #[must_use]
    pub fn endpoint_override(&self) -> Option<&str> {
        non_blank(self.endpoint_template.as_deref())
    }

    /// Returns the region restriction, treating a blank value as unset.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        non_blank(self.region_name.as_deref())
    }

    /// Returns the session options embedded in this configuration.
    #[must_use]
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            ca_file: self.ca_file.as_deref().map(Utf8PathBuf::from),
            cert_file: self.cert_file.as_deref().map(Utf8PathBuf::from),
            key_file: self.key_file.as_deref().map(Utf8PathBuf::from),
            insecure: self.insecure,
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

fn reject_blank(field: &str, value: Option<&str>) -> Result<(), ConfigError> {
    match value {
        Some(text) if text.trim().is_empty() => Err(ConfigError::Invalid {
            field: field.to_owned(),
            message: String::from("value must not be blank when set"),
        }),
        _ => Ok(()),
    }
}

/// Service catalog coordinates of the volume service.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CatalogInfo {
    /// Service type, usually `volume`.
    pub service_type: String,
    /// Service name, usually `cinder`.
    pub service_name: String,
    /// Endpoint type, for example `publicURL`.
    pub endpoint_type: String,
}

impl FromStr for CatalogInfo {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [service_type, service_name, endpoint_type] = parts.as_slice() else {
            return Err(ConfigError::InvalidCatalogInfo(s.to_owned()));
        };
        Ok(Self {
            service_type: (*service_type).to_owned(),
            service_name: (*service_name).to_owned(),
            endpoint_type: (*endpoint_type).to_owned(),
        })
    }
}

impl fmt::Display for CatalogInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.service_type, self.service_name, self.endpoint_type
        )
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates `catalog_info` is not `<type>:<name>:<endpoint_type>`.
    #[error(
        "invalid catalog_info '{0}': expected <service_type>:<service_name>:<endpoint_type>"
    )]
    InvalidCatalogInfo(String),
    /// Indicates a field holds an unusable value.
    #[error("invalid {field}: {message}")]
    Invalid {
        /// Name of the offending field.
        field: String,
        /// Description of the problem.
        message: String,
    },
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
