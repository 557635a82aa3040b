//! In-process stand-in for the volume service API.
//!
//! Serves `GET /v2/{project_id}/volumes/{volume_id}` on a random localhost
//! port. Responses come from a volume table, optionally preceded by scripted
//! error statuses.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Json;
use serde_json::json;

/// A request observed by the fake service.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Hit {
    /// Project segment of the URL.
    pub project_id: String,
    /// Volume segment of the URL.
    pub volume_id: String,
    /// Value of the `X-Auth-Token` header, if sent.
    pub token: Option<String>,
}

#[derive(Debug, Default)]
struct FakeState {
    volumes: HashMap<String, u64>,
    scripted: VecDeque<StatusCode>,
    hits: Vec<Hit>,
}

/// Handle to a running fake volume service.
#[derive(Debug)]
pub struct FakeCinder {
    state: Arc<Mutex<FakeState>>,
    addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl FakeCinder {
    /// Starts the service on an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(FakeState::default()));
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap_or_else(|err| panic!("bind fake cinder: {err}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|err| panic!("fake cinder address: {err}"));
        let app = Router::new()
            .route("/v2/:project_id/volumes/:volume_id", get(show_volume))
            .with_state(Arc::clone(&state));
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .unwrap_or_else(|err| panic!("fake cinder stopped: {err}"));
        });
        Self {
            state,
            addr,
            handle,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state
            .lock()
            .unwrap_or_else(|err| panic!("fake cinder state poisoned: {err}"))
    }

    /// Registers a volume of `size_gb` GiB.
    pub fn add_volume(&self, volume_id: &str, size_gb: u64) {
        self.lock().volumes.insert(volume_id.to_owned(), size_gb);
    }

    /// Makes the next request fail with `status` before volumes are consulted.
    pub fn fail_next(&self, status: StatusCode) {
        self.lock().scripted.push_back(status);
    }

    /// Returns every request observed so far.
    pub fn hits(&self) -> Vec<Hit> {
        self.lock().hits.clone()
    }

    /// Returns the project-scoped base URL, as published in a catalog.
    pub fn base_url(&self, project_id: &str) -> String {
        format!("http://{}/v2/{project_id}", self.addr)
    }

    /// Returns an endpoint template pointing at this service.
    pub fn endpoint_template(&self) -> String {
        format!("http://{}/v2/%(project_id)s", self.addr)
    }
}

impl Drop for FakeCinder {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn show_volume(
    State(state): State<Arc<Mutex<FakeState>>>,
    Path((project_id, volume_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut guard = state
        .lock()
        .unwrap_or_else(|err| panic!("fake cinder state poisoned: {err}"));
    guard.hits.push(Hit {
        project_id,
        volume_id: volume_id.clone(),
        token: headers
            .get("x-auth-token")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
    });

    if let Some(status) = guard.scripted.pop_front() {
        return (status, "scripted failure").into_response();
    }

    match guard.volumes.get(&volume_id) {
        Some(size) => Json(json!({
            "volume": {
                "id": volume_id,
                "size": size,
                "status": "available",
                "name": null,
            }
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "itemNotFound": {
                    "code": 404,
                    "message": format!("Volume {volume_id} could not be found."),
                }
            })),
        )
            .into_response(),
    }
}
