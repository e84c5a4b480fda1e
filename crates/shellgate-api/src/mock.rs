//! In-memory transport for testing
//!
//! Replies are queued per path and handed out in order. Every request is
//! recorded so tests can assert on paths, order and bodies.
//!
//! ```rust,no_run
//! use shellgate_api::mock::MockTransport;
//! use shellgate_api::GitlabClient;
//! use std::sync::Arc;
//!
//! let transport = MockTransport::new();
//! transport.respond_json("/api/v4/internal/allowed", 200, &serde_json::json!({"status": true}));
//!
//! let client = GitlabClient::new(Arc::new(transport.clone()));
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{ApiError, ApiResult};
use crate::transport::{ApiRequest, ApiResponse, ApiTransport};

#[derive(Debug)]
enum Reply {
    Response(ApiResponse),
    TransportError(String),
}

#[derive(Debug, Default)]
struct State {
    replies: HashMap<String, VecDeque<Reply>>,
    requests: Vec<ApiRequest>,
}

/// Scripted [`ApiTransport`]
///
/// Clones share the same script and request log.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    /// Create a transport with no scripted replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON reply for `path`
    pub fn respond_json(&self, path: &str, status: u16, body: &serde_json::Value) {
        self.respond_raw(path, status, body.to_string());
    }

    /// Queue a raw reply for `path`
    pub fn respond_raw(&self, path: &str, status: u16, body: impl Into<Bytes>) {
        self.push(path, Reply::Response(ApiResponse::new(status, body)));
    }

    /// Queue a transport failure for `path`
    pub fn fail(&self, path: &str, message: &str) {
        self.push(path, Reply::TransportError(message.to_string()));
    }

    /// All requests sent so far, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    /// JSON bodies of the requests sent to `path`, in order
    pub fn request_bodies(&self, path: &str) -> Vec<serde_json::Value> {
        self.lock()
            .requests
            .iter()
            .filter(|request| request.path == path)
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }

    fn push(&self, path: &str, reply: Reply) {
        self.lock()
            .replies
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let mut state = self.lock();
        let reply = state
            .replies
            .get_mut(&request.path)
            .and_then(VecDeque::pop_front);
        let path = request.path.clone();
        state.requests.push(request);

        match reply {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::TransportError(message)) => Err(ApiError::transport(message)),
            None => Err(ApiError::transport(format!(
                "no mock reply for {}",
                path
            ))),
        }
    }
}
