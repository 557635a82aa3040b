//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::auth::{AuthPlugin, ServiceCatalog, TokenAuth};
use crate::cinder::{
    ClientError, ClientFactory, ClientParams, EndpointSource, Volume, VolumeClient,
};
use crate::context::RequestContext;
use crate::session::Session;
use crate::store::BackendFuture;

/// Client factory that hands out clients answering from a FIFO script.
///
/// Every built client shares the factory's script, so responses are consumed
/// in the order they were pushed regardless of which request drew them.
#[derive(Clone, Debug, Default)]
pub struct ScriptedClientFactory {
    state: Arc<Mutex<ScriptState>>,
}

#[derive(Debug, Default)]
struct ScriptState {
    responses: VecDeque<Result<Volume, ClientError>>,
    builds: Vec<ClientBuild>,
    requests: Vec<String>,
}

/// Records the parameters of one [`ClientFactory::build`] call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientBuild {
    /// Endpoint selection handed to the client.
    pub endpoint: EndpointSource,
    /// Retry count handed to the client.
    pub retries: u32,
    /// Token of the auth plugin handed to the client.
    pub token: String,
}

impl ScriptedClientFactory {
    /// Creates a factory with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state
            .lock()
            .unwrap_or_else(|err| panic!("scripted client state poisoned: {err}"))
    }

    /// Queues a volume with the given size in GiB.
    pub fn push_volume(&self, volume_id: &str, size_gb: u64) {
        self.lock().responses.push_back(Ok(Volume {
            id: volume_id.to_owned(),
            size: size_gb,
            status: String::from("available"),
            name: None,
        }));
    }

    /// Queues a failure.
    pub fn push_error(&self, error: ClientError) {
        self.lock().responses.push_back(Err(error));
    }

    /// Returns every client build recorded so far.
    #[must_use]
    pub fn builds(&self) -> Vec<ClientBuild> {
        self.lock().builds.clone()
    }

    /// Returns the volume identifiers requested so far.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }
}

impl ClientFactory for ScriptedClientFactory {
    type Client = ScriptedClient;

    fn build(&self, _session: &Session, params: ClientParams) -> Self::Client {
        self.lock().builds.push(ClientBuild {
            endpoint: params.endpoint,
            retries: params.retries,
            token: params.auth.token().to_owned(),
        });
        ScriptedClient {
            state: Arc::clone(&self.state),
        }
    }
}

/// Client produced by [`ScriptedClientFactory`].
#[derive(Clone, Debug)]
pub struct ScriptedClient {
    state: Arc<Mutex<ScriptState>>,
}

impl VolumeClient for ScriptedClient {
    fn get_volume<'a>(&'a self, volume_id: &'a str) -> BackendFuture<'a, Volume, ClientError> {
        let response = {
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(|err| panic!("scripted client state poisoned: {err}"));
            state.requests.push(volume_id.to_owned());
            state.responses.pop_front().unwrap_or_else(|| {
                Err(ClientError::Transport {
                    message: String::from("no scripted response available"),
                })
            })
        };
        Box::pin(async move { response })
    }
}

/// Request context with a fixed dictionary and token.
#[derive(Clone, Debug)]
pub struct StaticContext {
    values: BTreeMap<String, String>,
    auth: Arc<TokenAuth>,
}

impl StaticContext {
    /// Creates a context for `project_id` authenticated with `token`.
    #[must_use]
    pub fn new(project_id: &str, token: &str) -> Self {
        Self::with_catalog(project_id, token, ServiceCatalog::default())
    }

    /// Creates a context whose auth plugin resolves endpoints from `catalog`.
    #[must_use]
    pub fn with_catalog(project_id: &str, token: &str, catalog: ServiceCatalog) -> Self {
        Self {
            values: BTreeMap::from([(String::from("project_id"), project_id.to_owned())]),
            auth: Arc::new(TokenAuth::new(token, catalog)),
        }
    }
}

impl RequestContext for StaticContext {
    fn to_dict(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }

    fn auth_plugin(&self) -> Arc<dyn AuthPlugin> {
        self.auth.clone()
    }
}
