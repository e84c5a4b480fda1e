//! Authorization Client for the `/allowed` check.
//!
//! One request per session asks whether an identity may run a git command
//! against a repository. The response doubles as routing metadata for the
//! transfer backend and, when the server answers with status 300, as a
//! custom action redirect.

use serde::{Deserialize, Deserializer, Serialize};
use shellgate_config::Config;
use std::fmt;

use crate::client::GitlabClient;
use crate::error::ApiResult;
use crate::transport::ApiResponse;

/// Route of the authorization check, relative to the internal API
pub const ALLOWED_PATH: &str = "/allowed";

/// Change-set sentinel meaning "any changes"
pub const ANY_CHANGES: &str = "_any";

/// Protocol tag sent for remote shell sessions
pub const SSH_PROTOCOL: &str = "ssh";

/// Status code signalling a custom action redirect
pub const MULTIPLE_CHOICES: u16 = 300;

/// Git command a session wants to run
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    #[serde(rename = "git-receive-pack")]
    ReceivePack,
    #[serde(rename = "git-upload-pack")]
    UploadPack,
    #[serde(rename = "git-upload-archive")]
    UploadArchive,
}

impl CommandType {
    /// Wire name of the command
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::ReceivePack => "git-receive-pack",
            CommandType::UploadPack => "git-upload-pack",
            CommandType::UploadArchive => "git-upload-archive",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential identifying the requesting session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// SSH key identifier
    KeyId(String),
    /// Username
    Username(String),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::KeyId(id) => write!(f, "key-{}", id),
            Identity::Username(name) => write!(f, "user {}", name),
        }
    }
}

/// Body of `POST /allowed`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub action: CommandType,
    #[serde(rename = "project")]
    pub repo: String,
    pub changes: String,
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Request {
    /// Build a request for `identity`; exactly one of key id and username is set
    pub fn new(identity: &Identity, action: CommandType, repo: &str, protocol: &str) -> Self {
        let (key_id, username) = match identity {
            Identity::KeyId(id) => (Some(id.clone()), None),
            Identity::Username(name) => (None, Some(name.clone())),
        };

        Self {
            action,
            repo: repo.to_string(),
            changes: ANY_CHANGES.to_string(),
            protocol: protocol.to_string(),
            key_id,
            username,
        }
    }
}

/// Repository coordinates on the transfer backend
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GitalyRepo {
    #[serde(deserialize_with = "null_default")]
    pub storage_name: String,
    #[serde(deserialize_with = "null_default")]
    pub relative_path: String,
    #[serde(deserialize_with = "null_default")]
    pub git_object_directory: String,
    #[serde(deserialize_with = "null_default")]
    pub git_alternate_object_directories: Vec<String>,
    #[serde(rename = "gl_repository", deserialize_with = "null_default")]
    pub repo_name: String,
    #[serde(rename = "gl_project_path", deserialize_with = "null_default")]
    pub project_path: String,
}

/// Transfer backend routing descriptor
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Gitaly {
    #[serde(rename = "repository", deserialize_with = "null_default")]
    pub repo: GitalyRepo,
    #[serde(deserialize_with = "null_default")]
    pub address: String,
    #[serde(deserialize_with = "null_default")]
    pub token: String,
}

/// Data of a custom action payload
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CustomPayloadData {
    /// Endpoints to call, in order
    #[serde(deserialize_with = "null_default")]
    pub api_endpoints: Vec<String>,
    #[serde(rename = "gl_username", deserialize_with = "null_default")]
    pub username: String,
    #[serde(deserialize_with = "null_default")]
    pub primary_repo: String,
    /// Shown once before the first endpoint call
    #[serde(deserialize_with = "null_default")]
    pub info_message: String,
    /// Authorized user id; filled in by the gateway, not the server
    #[serde(
        rename = "gl_id",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "null_default"
    )]
    pub user_id: String,
}

/// Custom action payload of a redirect response
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CustomPayload {
    #[serde(deserialize_with = "null_default")]
    pub action: String,
    #[serde(deserialize_with = "null_default")]
    pub data: CustomPayloadData,
}

/// How a parsed `/allowed` response routes the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessOutcome {
    /// Proceed to the transfer backend
    Authorized,
    /// Access refused
    #[default]
    Denied,
    /// Run the custom action before (or instead of) the transfer
    Redirected,
}

impl AccessOutcome {
    /// Classify a response from its body flag and transport status
    pub fn classify(success: bool, status_code: u16) -> Self {
        if !success {
            AccessOutcome::Denied
        } else if status_code == MULTIPLE_CHOICES {
            AccessOutcome::Redirected
        } else {
            AccessOutcome::Authorized
        }
    }
}

/// Parsed response of `POST /allowed`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Response {
    #[serde(rename = "status", deserialize_with = "null_default")]
    pub success: bool,
    #[serde(deserialize_with = "null_default")]
    pub message: String,
    #[serde(rename = "gl_repository", deserialize_with = "null_default")]
    pub repo: String,
    #[serde(rename = "gl_id", deserialize_with = "null_default")]
    pub user_id: String,
    #[serde(rename = "gl_username", deserialize_with = "null_default")]
    pub username: String,
    #[serde(deserialize_with = "null_default")]
    pub git_config_options: Vec<String>,
    #[serde(deserialize_with = "null_default")]
    pub gitaly: Gitaly,
    #[serde(deserialize_with = "null_default")]
    pub git_protocol: String,
    pub payload: Option<CustomPayload>,
    #[serde(rename = "gl_console_messages", deserialize_with = "null_default")]
    pub console_messages: Vec<String>,
    /// Transport status the body arrived with
    #[serde(skip)]
    pub status_code: u16,
    #[serde(skip)]
    outcome: AccessOutcome,
}

impl Response {
    /// Decode an API response and record its status
    pub fn from_api_response(response: &ApiResponse) -> ApiResult<Self> {
        let mut parsed: Response = response.parse_json()?;
        parsed.status_code = response.status;
        parsed.outcome = AccessOutcome::classify(parsed.success, response.status);
        Ok(parsed)
    }

    /// Whether the server redirected the session into a custom action.
    ///
    /// Depends on the status code only, not on the `status` body flag.
    pub fn is_custom_action(&self) -> bool {
        self.status_code == MULTIPLE_CHOICES
    }

    /// Routing decision computed when the response was parsed.
    ///
    /// A `false` body flag always yields [`AccessOutcome::Denied`], even on a
    /// 300 where [`Response::is_custom_action`] is still `true`. Route on this,
    /// not on `is_custom_action`.
    pub fn outcome(&self) -> AccessOutcome {
        self.outcome
    }
}

/// Authorization Client
#[derive(Debug, Clone)]
pub struct AccessClient {
    client: GitlabClient,
    protocol: String,
}

impl AccessClient {
    /// Create an authorization client over `client` for ssh sessions
    pub fn new(client: GitlabClient) -> Self {
        Self {
            client,
            protocol: SSH_PROTOCOL.to_string(),
        }
    }

    /// Create an authorization client talking HTTP to the configured API
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        Ok(Self::new(GitlabClient::from_config(config)?))
    }

    /// Override the protocol tag sent with each request
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Ask whether `identity` may run `action` on `repo`.
    ///
    /// The body is decoded whatever the status; transport failures, error
    /// statuses and malformed bodies are errors.
    pub async fn verify(
        &self,
        identity: &Identity,
        action: CommandType,
        repo: &str,
    ) -> ApiResult<Response> {
        let request = Request::new(identity, action, repo, &self.protocol);
        tracing::debug!("Checking {} access to {} for {}", action, repo, identity);

        let response = self.client.post(ALLOWED_PATH, &request).await?;
        Response::from_api_response(&response)
    }
}

/// Treat an explicit JSON `null` like a missing field
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_with_key_id() {
        let request = Request::new(
            &Identity::KeyId("1".into()),
            CommandType::ReceivePack,
            "group/repo",
            SSH_PROTOCOL,
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "action": "git-receive-pack",
                "project": "group/repo",
                "changes": "_any",
                "protocol": "ssh",
                "key_id": "1"
            })
        );
    }

    #[test]
    fn test_request_with_username_omits_key_id() {
        let request = Request::new(
            &Identity::Username("first".into()),
            CommandType::UploadArchive,
            "group/repo",
            SSH_PROTOCOL,
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["username"], "first");
        assert_eq!(value["action"], "git-upload-archive");
        assert!(value.get("key_id").is_none());
    }

    #[test]
    fn test_outcome_classification() {
        assert_eq!(AccessOutcome::classify(true, 200), AccessOutcome::Authorized);
        assert_eq!(AccessOutcome::classify(true, 300), AccessOutcome::Redirected);
        assert_eq!(AccessOutcome::classify(false, 200), AccessOutcome::Denied);
        assert_eq!(AccessOutcome::classify(false, 300), AccessOutcome::Denied);
    }

    #[test]
    fn test_custom_action_ignores_success_flag() {
        let body = json!({"status": false, "message": "denied"}).to_string();
        let response = Response::from_api_response(&ApiResponse::new(300, body)).unwrap();

        assert!(response.is_custom_action());
        assert_eq!(response.outcome(), AccessOutcome::Denied);
    }

    #[test]
    fn test_nulls_and_missing_fields_default() {
        let body = json!({
            "status": true,
            "gl_console_messages": null,
            "git_config_options": null,
            "payload": null
        })
        .to_string();
        let response = Response::from_api_response(&ApiResponse::new(200, body)).unwrap();

        assert!(response.console_messages.is_empty());
        assert!(response.git_config_options.is_empty());
        assert!(response.payload.is_none());
        assert_eq!(response.outcome(), AccessOutcome::Authorized);
        assert!(!response.is_custom_action());
    }

    #[test]
    fn test_null_scalars_and_objects_default() {
        let body = json!({"status": true, "gl_id": "1", "gl_username": null}).to_string();
        let response = Response::from_api_response(&ApiResponse::new(200, body)).unwrap();
        assert_eq!(response.user_id, "1");
        assert_eq!(response.username, "");

        let body = json!({"status": true, "git_protocol": null}).to_string();
        let response = Response::from_api_response(&ApiResponse::new(200, body)).unwrap();
        assert_eq!(response.git_protocol, "");

        let body = json!({"status": true, "gitaly": null}).to_string();
        let response = Response::from_api_response(&ApiResponse::new(200, body)).unwrap();
        assert_eq!(response.gitaly, Gitaly::default());

        let body = json!({"status": null, "gl_repository": null}).to_string();
        let response = Response::from_api_response(&ApiResponse::new(200, body)).unwrap();
        assert!(!response.success);
        assert_eq!(response.outcome(), AccessOutcome::Denied);
    }

    #[test]
    fn test_null_fields_inside_payload_and_gitaly() {
        let body = json!({
            "status": true,
            "gitaly": {
                "repository": {
                    "storage_name": null,
                    "relative_path": "group/repo.git",
                    "gl_project_path": null
                },
                "address": "unix:gitaly.socket",
                "token": null
            },
            "payload": {
                "action": null,
                "data": {
                    "api_endpoints": ["/geo/push"],
                    "gl_username": null,
                    "primary_repo": null,
                    "info_message": null
                }
            }
        })
        .to_string();
        let response = Response::from_api_response(&ApiResponse::new(300, body)).unwrap();

        assert_eq!(response.gitaly.repo.relative_path, "group/repo.git");
        assert_eq!(response.gitaly.repo.storage_name, "");
        assert_eq!(response.gitaly.address, "unix:gitaly.socket");
        assert_eq!(response.gitaly.token, "");

        let payload = response.payload.as_ref().unwrap();
        assert_eq!(payload.action, "");
        assert_eq!(payload.data.api_endpoints, vec!["/geo/push".to_string()]);
        assert_eq!(payload.data.primary_repo, "");
        assert_eq!(payload.data.username, "");
        assert_eq!(response.outcome(), AccessOutcome::Redirected);

        let body = json!({"status": true, "payload": {"action": "geo_proxy", "data": null}})
            .to_string();
        let response = Response::from_api_response(&ApiResponse::new(300, body)).unwrap();
        assert!(response.payload.unwrap().data.api_endpoints.is_empty());
    }

    #[test]
    fn test_payload_user_id_is_omitted_when_empty() {
        let data = CustomPayloadData {
            api_endpoints: vec!["/geo/push".into()],
            ..Default::default()
        };

        let value = serde_json::to_value(&data).unwrap();
        assert!(value.get("gl_id").is_none());
        assert_eq!(value["api_endpoints"], json!(["/geo/push"]));
    }
}
