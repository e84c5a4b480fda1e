//! Transport seam between the API client and the network.
//!
//! [`ApiTransport`] moves one request and hands back the raw status and
//! body; status interpretation and JSON decoding live in
//! [`GitlabClient`](crate::GitlabClient). [`HttpTransport`] is the reqwest
//! implementation used in production.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Certificate, Url};
use serde::de::DeserializeOwned;
use shellgate_config::{Config, HttpSettings};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ApiError, ApiResult};

pub use reqwest::Method;

/// Header carrying the base64-encoded shared secret
pub const SECRET_HEADER: &str = "Gitlab-Shared-Secret";

/// Prefix of API URLs that point at a local unix socket
pub const UNIX_SOCKET_PREFIX: &str = "http+unix://";

/// Base URL used for requests sent over a unix socket
const UNIX_SOCKET_BASE: &str = "http://unix";

const USER_AGENT: &str = concat!("shellgate/", env!("CARGO_PKG_VERSION"));

/// A request ready to be sent to the internal API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute path on the API host (always starts with `/`)
    pub path: String,
    /// JSON-encoded body
    pub body: Vec<u8>,
}

/// Raw status and body of an internal API response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Bytes,
}

impl ApiResponse {
    /// Create a response from a status and body
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decode the body as JSON, regardless of status
    pub fn parse_json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_slice(&self.body).map_err(ApiError::Parsing)
    }

    /// Whether the status passes through without being turned into an error
    pub fn is_accepted(&self) -> bool {
        (200..=399).contains(&self.status)
    }
}

/// Sends a single request to the internal API
#[async_trait]
pub trait ApiTransport: Send + Sync + fmt::Debug {
    /// Send the request and return the raw response.
    ///
    /// Only network-level failures are errors here; any HTTP status is a
    /// successful send.
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse>;
}

/// reqwest-backed transport configured from [`Config`]
pub struct HttpTransport {
    base_url: String,
    socket_path: Option<PathBuf>,
    client: reqwest::Client,
    secret: Option<String>,
    basic_auth: Option<(String, String)>,
}

impl HttpTransport {
    /// Build a transport for the configured API base URL.
    ///
    /// `http+unix://<percent-encoded socket path>` connects every request
    /// to that socket; `http://` and `https://` go over TCP.
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let (base_url, socket_path) = resolve_base_url(config.api_base())?;

        let settings = &config.http_settings;
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.read_timeout_seconds));

        if let Some(path) = &socket_path {
            builder = with_unix_socket(builder, path)?;
        }

        for certificate in load_certificates(settings)? {
            builder = builder.add_root_certificate(certificate);
        }

        if settings.self_signed_cert {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| ApiError::ClientSetup(e.to_string()))?;

        Ok(Self {
            base_url,
            socket_path,
            client,
            secret: config.secret.clone(),
            basic_auth: settings
                .basic_auth()
                .map(|(user, password)| (user.to_string(), password.to_string())),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Unix socket every connection goes through, if any
    pub fn socket_path(&self) -> Option<&Path> {
        self.socket_path.as_deref()
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("socket_path", &self.socket_path)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("basic_auth", &self.basic_auth.is_some())
            .finish()
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method, &url)
            .header(CONTENT_TYPE, "application/json")
            .body(request.body);

        if let Some(secret) = &self.secret {
            builder = builder.header(SECRET_HEADER, STANDARD.encode(secret));
        }

        if let Some((user, password)) = &self.basic_auth {
            builder = builder.basic_auth(user, Some(password));
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        tracing::debug!("{} responded with status {}", url, status);

        Ok(ApiResponse { status, body })
    }
}

/// Split an API base into the URL requests are sent to and the unix
/// socket they travel over
fn resolve_base_url(api_base: &str) -> ApiResult<(String, Option<PathBuf>)> {
    let Some(rest) = api_base.strip_prefix(UNIX_SOCKET_PREFIX) else {
        validate_base_url(api_base)?;
        return Ok((api_base.to_string(), None));
    };

    let (encoded, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
    let socket = urlencoding::decode(encoded).map_err(|e| {
        ApiError::ClientSetup(format!("invalid socket path '{}': {}", encoded, e))
    })?;
    if socket.is_empty() {
        return Err(ApiError::ClientSetup(format!(
            "missing socket path in API URL '{}'",
            api_base
        )));
    }

    Ok((
        format!("{}{}", UNIX_SOCKET_BASE, path),
        Some(PathBuf::from(socket.into_owned())),
    ))
}

#[cfg(unix)]
fn with_unix_socket(
    builder: reqwest::ClientBuilder,
    path: &Path,
) -> ApiResult<reqwest::ClientBuilder> {
    Ok(builder.unix_socket(path.to_path_buf()))
}

#[cfg(not(unix))]
fn with_unix_socket(
    _builder: reqwest::ClientBuilder,
    path: &Path,
) -> ApiResult<reqwest::ClientBuilder> {
    Err(ApiError::ClientSetup(format!(
        "unix socket {} is not supported on this platform",
        path.display()
    )))
}

fn validate_base_url(base_url: &str) -> ApiResult<()> {
    let url = Url::parse(base_url)
        .map_err(|e| ApiError::ClientSetup(format!("invalid API URL '{}': {}", base_url, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ApiError::ClientSetup(format!(
            "unsupported API URL scheme '{}'",
            scheme
        ))),
    }
}

fn load_certificates(settings: &HttpSettings) -> ApiResult<Vec<Certificate>> {
    let mut certificates = Vec::new();

    if let Some(ca_file) = &settings.ca_file {
        certificates.push(read_certificate(ca_file)?);
    }

    if let Some(ca_path) = &settings.ca_path {
        let entries = std::fs::read_dir(ca_path).map_err(|e| {
            ApiError::ClientSetup(format!("cannot read ca_path {}: {}", ca_path.display(), e))
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| ApiError::ClientSetup(e.to_string()))?
                .path();
            let is_pem = matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("pem") | Some("crt")
            );
            if is_pem {
                certificates.push(read_certificate(&path)?);
            }
        }
    }

    Ok(certificates)
}

fn read_certificate(path: &Path) -> ApiResult<Certificate> {
    let pem = std::fs::read(path).map_err(|e| {
        ApiError::ClientSetup(format!("cannot read certificate {}: {}", path.display(), e))
    })?;

    Certificate::from_pem(&pem).map_err(|e| {
        ApiError::ClientSetup(format!("invalid certificate {}: {}", path.display(), e))
    })
}
