//! Internal API client for the shellgate access gateway
//!
//! This crate talks to the central authorization service: the `/allowed`
//! access check ([`AccessClient`]) and the wire types of the custom action
//! protocol ([`custom_action`]). Requests go through the [`ApiTransport`]
//! seam; [`HttpTransport`] is the reqwest implementation and
//! [`mock::MockTransport`] the in-memory one.

pub mod access;
pub mod client;
pub mod custom_action;
pub mod error;
pub mod mock;
pub mod transport;

// Re-export commonly used types
pub use access::{
    AccessClient, AccessOutcome, CommandType, CustomPayload, CustomPayloadData, Gitaly,
    GitalyRepo, Identity, Request as AccessRequest, Response as AccessResponse,
};
pub use client::{GitlabClient, INTERNAL_API_PATH};
pub use custom_action::{CustomActionRequest, CustomActionResponse};
pub use error::{ApiError, ApiResult};
pub use transport::{ApiRequest, ApiResponse, ApiTransport, HttpTransport, Method};
