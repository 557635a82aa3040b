//! HTTP implementation of [`VolumeClient`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use tokio::time::sleep;

use super::types::VolumeEnvelope;
use super::{
    ClientError, ClientParams, EndpointSource, MAX_RETRY_BACKOFF, Volume, VolumeClient,
};
use crate::auth::AuthPlugin;
use crate::store::BackendFuture;

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Request-scoped client for the volume service API.
#[derive(Clone, Debug)]
pub struct CinderClient {
    http: reqwest::Client,
    auth: Arc<dyn AuthPlugin>,
    endpoint: EndpointSource,
    retries: u32,
    backoff: Duration,
}

/// Outcome of a single HTTP attempt.
enum Attempt {
    Done(Result<Volume, ClientError>),
    Retry(ClientError),
}

impl CinderClient {
    /// Creates a client on top of a session's HTTP client.
    #[must_use]
    pub fn new(http: reqwest::Client, params: ClientParams, backoff: Duration) -> Self {
        Self {
            http,
            auth: params.auth,
            endpoint: params.endpoint,
            retries: params.retries,
            backoff,
        }
    }

    /// Returns the number of retries this client performs.
    #[must_use]
    pub const fn retries(&self) -> u32 {
        self.retries
    }

    /// Resolves the base URL for volume calls.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::EndpointNotFound`] when the catalog has no
    /// matching endpoint.
    pub fn endpoint(&self) -> Result<String, ClientError> {
        match &self.endpoint {
            EndpointSource::Override(url) => Ok(url.clone()),
            EndpointSource::Catalog(filter) => Ok(self.auth.endpoint(filter)?),
        }
    }

    async fn fetch(&self, volume_id: &str) -> Result<Volume, ClientError> {
        let base = self.endpoint()?;
        let url = format!("{}/volumes/{volume_id}", base.trim_end_matches('/'));
        let mut delay = self.backoff;
        let mut attempt = 0;

        loop {
            match self.attempt(&url, volume_id).await {
                Attempt::Done(result) => return result,
                Attempt::Retry(err) if attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!(
                        volume_id,
                        attempt,
                        retries = self.retries,
                        error = %err,
                        "retrying volume request"
                    );
                    sleep(delay).await;
                    delay = delay.saturating_mul(2).min(MAX_RETRY_BACKOFF);
                }
                Attempt::Retry(err) => return Err(err),
            }
        }
    }

    async fn attempt(&self, url: &str, volume_id: &str) -> Attempt {
        let response = match self
            .http
            .get(url)
            .header(AUTH_TOKEN_HEADER, self.auth.token())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let failure = ClientError::Transport {
                    message: err.to_string(),
                };
                return if err.is_connect() || err.is_timeout() {
                    Attempt::Retry(failure)
                } else {
                    Attempt::Done(Err(failure))
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            let decoded = response
                .json::<VolumeEnvelope>()
                .await
                .map(|envelope| envelope.volume)
                .map_err(|err| ClientError::Decode {
                    message: err.to_string(),
                });
            return Attempt::Done(decoded);
        }

        if status == StatusCode::NOT_FOUND {
            return Attempt::Done(Err(ClientError::NotFound {
                volume_id: volume_id.to_owned(),
            }));
        }

        let failure = ClientError::Status {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        };
        if matches!(
            status,
            StatusCode::PAYLOAD_TOO_LARGE | StatusCode::SERVICE_UNAVAILABLE
        ) {
            Attempt::Retry(failure)
        } else {
            Attempt::Done(Err(failure))
        }
    }
}

impl VolumeClient for CinderClient {
    fn get_volume<'a>(&'a self, volume_id: &'a str) -> BackendFuture<'a, Volume, ClientError> {
        Box::pin(self.fetch(volume_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{EndpointFilter, ServiceCatalog, TokenAuth};

    fn client(endpoint: EndpointSource) -> CinderClient {
        CinderClient::new(
            reqwest::Client::new(),
            ClientParams {
                auth: Arc::new(TokenAuth::new("token", ServiceCatalog::default())),
                endpoint,
                retries: 2,
            },
            Duration::from_millis(1),
        )
    }

    #[test]
    fn override_endpoint_is_used_verbatim() {
        let client = client(EndpointSource::Override(String::from("http://h:8776/v2/p")));
        assert_eq!(client.endpoint().expect("override"), "http://h:8776/v2/p");
        assert_eq!(client.retries(), 2);
    }

    #[test]
    fn catalog_miss_is_endpoint_not_found() {
        let client = client(EndpointSource::Catalog(EndpointFilter {
            service_type: String::from("volume"),
            service_name: String::from("cinder"),
            interface: String::from("publicURL"),
            region_name: None,
        }));
        assert!(matches!(
            client.endpoint(),
            Err(ClientError::EndpointNotFound(_))
        ));
    }
}
