//! Long-lived HTTP session shared by every request made through a store.
//!
//! The session owns transport concerns only (trust roots, client identity,
//! timeouts). Credentials are per request and arrive through the
//! [`AuthPlugin`](crate::auth::AuthPlugin) carried by the request context.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;

/// Transport options used to build a [`Session`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SessionOptions {
    /// PEM bundle trusted in addition to the system roots.
    pub ca_file: Option<Utf8PathBuf>,
    /// PEM client certificate (optionally with its key appended).
    pub cert_file: Option<Utf8PathBuf>,
    /// PEM private key for `cert_file`.
    pub key_file: Option<Utf8PathBuf>,
    /// Skips TLS certificate verification.
    pub insecure: bool,
    /// Per-request transport timeout.
    pub timeout: Option<Duration>,
}

/// Errors raised while building a [`Session`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SessionError {
    /// Raised when a PEM file cannot be read.
    #[error("failed to read {path}: {message}")]
    FileRead {
        /// Path that could not be read.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when PEM material is rejected by the TLS stack.
    #[error("invalid TLS material in {path}: {message}")]
    Tls {
        /// File holding the rejected material.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when the HTTP client cannot be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

/// Authenticated-transport handle reused across requests.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct Session {
    http: reqwest::Client,
    options: SessionOptions,
}

impl Session {
    /// Builds a session from transport options.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when a PEM file cannot be read or parsed, or
    /// when the HTTP client fails to build.
    pub fn from_options(options: SessionOptions) -> Result<Self, SessionError> {
        let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(options.insecure);

        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(path) = &options.ca_file {
            let pem = read_pem(path)?;
            let certificate =
                reqwest::Certificate::from_pem(pem.as_bytes()).map_err(|err| SessionError::Tls {
                    path: path.clone(),
                    message: err.to_string(),
                })?;
            builder = builder.add_root_certificate(certificate);
        }

        if let Some(cert_path) = &options.cert_file {
            let mut pem = read_pem(cert_path)?;
            if let Some(key_path) = &options.key_file {
                pem.push('\n');
                pem.push_str(&read_pem(key_path)?);
            }
            let identity =
                reqwest::Identity::from_pem(pem.as_bytes()).map_err(|err| SessionError::Tls {
                    path: cert_path.clone(),
                    message: err.to_string(),
                })?;
            builder = builder.identity(identity);
        }

        let http = builder
            .build()
            .map_err(|err| SessionError::Build(err.to_string()))?;
        Ok(Self { http, options })
    }

    /// Returns the shared HTTP client.
    #[must_use]
    pub const fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Returns the options the session was built from.
    #[must_use]
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }
}

fn read_pem(path: &Utf8Path) -> Result<String, SessionError> {
    let read_error = |message: String| SessionError::FileRead {
        path: path.to_path_buf(),
        message,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| read_error(String::from("path is missing a file name")))?;

    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|err| read_error(err.to_string()))?;
    dir.read_to_string(file_name)
        .map_err(|err| read_error(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    fn default_options_build_a_session() {
        let session = Session::from_options(SessionOptions::default()).expect("session builds");
        assert_eq!(session.options(), &SessionOptions::default());
    }

    #[rstest]
    fn missing_ca_file_is_reported_with_path() {
        let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let path = Utf8PathBuf::from_path_buf(tmp.path().join("missing.pem"))
            .unwrap_or_else(|path| panic!("non-utf8 temp path: {}", path.display()));
        let err = Session::from_options(SessionOptions {
            ca_file: Some(path.clone()),
            ..SessionOptions::default()
        })
        .expect_err("missing file");
        assert!(matches!(
            err,
            SessionError::FileRead { path: ref reported, .. } if *reported == path
        ));
    }
}
