use serde::{Deserialize, Serialize};
use shellgate_config::Config;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::transport::{ApiRequest, ApiResponse, ApiTransport, HttpTransport, Method};

/// Prefix of every internal API route
pub const INTERNAL_API_PATH: &str = "/api/v4/internal";

/// Error body returned by the internal API
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ErrorResponse {
    /// Human-readable failure reason
    #[serde(default)]
    pub message: Option<String>,
}

/// Client for the internal authorization API
///
/// Wraps an injected [`ApiTransport`] so tests can substitute
/// [`MockTransport`](crate::mock::MockTransport) for the network.
#[derive(Debug, Clone)]
pub struct GitlabClient {
    transport: Arc<dyn ApiTransport>,
}

impl GitlabClient {
    /// Create a client over the given transport
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// Create a client backed by [`HttpTransport`]
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// POST a JSON body to an internal API route.
    ///
    /// `path` is relative to [`INTERNAL_API_PATH`], e.g. `/allowed`.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<ApiResponse> {
        self.do_request(Method::POST, &normalize_path(path), body)
            .await
    }

    /// Send a JSON body to a server-supplied path, used as given.
    ///
    /// Statuses outside 200..=399 become errors: the body's `message` when
    /// present, otherwise `Internal API error (<status>)`.
    pub async fn do_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<ApiResponse> {
        let body = serde_json::to_vec(body).map_err(ApiError::Encoding)?;
        let request = ApiRequest {
            method,
            path: with_leading_slash(path),
            body,
        };

        let response = self.transport.send(request).await?;
        check_status(response)
    }
}

fn check_status(response: ApiResponse) -> ApiResult<ApiResponse> {
    if response.is_accepted() {
        return Ok(response);
    }

    let message = serde_json::from_slice::<ErrorResponse>(&response.body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.is_empty());

    tracing::warn!(
        "Internal API returned status {}{}",
        response.status,
        message
            .as_deref()
            .map(|m| format!(": {}", m))
            .unwrap_or_default()
    );

    match message {
        Some(message) => Err(ApiError::Api(message)),
        None => Err(ApiError::Internal(response.status)),
    }
}

fn with_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Place `path` under [`INTERNAL_API_PATH`] unless it already is
pub fn normalize_path(path: &str) -> String {
    let path = with_leading_slash(path);
    if path.starts_with(INTERNAL_API_PATH) {
        path
    } else {
        format!("{}{}", INTERNAL_API_PATH, path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/allowed"), "/api/v4/internal/allowed");
        assert_eq!(normalize_path("allowed"), "/api/v4/internal/allowed");
        assert_eq!(
            normalize_path("/api/v4/internal/allowed"),
            "/api/v4/internal/allowed"
        );
    }

    #[test]
    fn test_error_status_with_message() {
        let response = ApiResponse::new(403, r#"{"message":"Not allowed!"}"#);
        let err = check_status(response).unwrap_err();
        assert_eq!(err.to_string(), "Not allowed!");
    }

    #[test]
    fn test_error_status_without_message() {
        let err = check_status(ApiResponse::new(403, "")).unwrap_err();
        assert_eq!(err.to_string(), "Internal API error (403)");

        let err = check_status(ApiResponse::new(500, r#"{"message":""}"#)).unwrap_err();
        assert_eq!(err.to_string(), "Internal API error (500)");
    }

    #[test]
    fn test_multiple_choices_passes_through() {
        let response = check_status(ApiResponse::new(300, "{}")).unwrap();
        assert_eq!(response.status, 300);
    }

    #[tokio::test]
    async fn test_do_request_uses_path_verbatim() {
        let transport = MockTransport::new();
        transport.respond_json("/geo/push", 200, &serde_json::json!({}));
        let client = GitlabClient::new(Arc::new(transport.clone()));

        client
            .do_request(Method::POST, "geo/push", &serde_json::json!({"a": 1}))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/geo/push");
        assert_eq!(requests[0].method, Method::POST);
    }

    #[tokio::test]
    async fn test_post_normalizes_path() {
        let transport = MockTransport::new();
        transport.respond_json("/api/v4/internal/allowed", 200, &serde_json::json!({}));
        let client = GitlabClient::new(Arc::new(transport.clone()));

        client.post("/allowed", &serde_json::json!({})).await.unwrap();

        assert_eq!(transport.requests()[0].path, "/api/v4/internal/allowed");
    }
}
