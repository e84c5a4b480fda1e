// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Fake internal API server.
//!
//! Serves an axum [`Router`] on `127.0.0.1:0` (or on a unix socket in a
//! temporary directory) and records every request before it reaches the
//! handlers, so tests can assert on paths, headers and JSON bodies after
//! the fact.

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use shellgate_config::Config;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

type RequestLog = Arc<Mutex<Vec<CapturedRequest>>>;

/// A request as received by the fake server
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    /// Body parsed as JSON; `Null` when it is not JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }

    /// Header value as text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Running fake server; shut down on drop
pub struct TestServer {
    url: String,
    requests: RequestLog,
    handle: JoinHandle<()>,
    _socket_dir: Option<TempDir>,
}

impl TestServer {
    /// Bind an ephemeral local port and serve `router` on it
    pub async fn start(router: Router) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?);

        let (app, requests) = recording(router);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            url,
            requests,
            handle,
            _socket_dir: None,
        })
    }

    /// Serve `router` on a fresh unix socket; [`url`](Self::url) is an
    /// `http+unix://` URL naming it
    #[cfg(unix)]
    pub async fn start_unix(router: Router) -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let socket = dir.path().join("gitlab.socket");
        let listener = tokio::net::UnixListener::bind(&socket)?;
        let url = format!(
            "http+unix://{}",
            urlencoding::encode(&socket.to_string_lossy())
        );

        let (app, requests) = recording(router);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            url,
            requests,
            handle,
            _socket_dir: Some(dir),
        })
    }

    /// Base URL of the server
    pub fn url(&self) -> String {
        self.url.clone()
    }

    /// Gateway configuration pointing at this server
    pub fn config(&self) -> Config {
        Config::with_gitlab_url(self.url())
    }

    /// YAML configuration pointing at this server, with extra lines appended
    pub fn config_yaml(&self, extra: &str) -> String {
        format!("gitlab_url: \"{}\"\n{}", self.url(), extra)
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for `path`, in arrival order
    pub fn requests_to(&self, path: &str) -> Vec<CapturedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn recording(router: Router) -> (Router, RequestLog) {
    let requests: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let app = router.layer(middleware::from_fn_with_state(
        Arc::clone(&requests),
        record_request,
    ));
    (app, requests)
}

async fn record_request(State(log): State<RequestLog>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    log.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(CapturedRequest {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            headers: parts.headers.clone(),
            body: bytes.to_vec(),
        });

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
