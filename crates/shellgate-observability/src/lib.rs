//! Shellgate Observability Module
//!
//! Structured logging for the gateway.
//!
//! Logs are written to stderr or to a log file, never to stdout: stdout
//! carries the git session stream.
//!
//! # Example
//!
//! ```ignore
//! use shellgate_observability::{init_tracing, LogFormat};
//!
//! init_tracing(LogFormat::Text, Some("debug"))?;
//! tracing::info!("gateway started");
//! ```

pub mod config;
pub mod initialization;

pub use config::{LogConfig, LogError, LogFormat, LogOutput};
pub use initialization::{init_tracing, init_tracing_with_config};
