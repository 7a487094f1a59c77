#![warn(rust_2018_idioms)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Millisecond durations fit in u64
    clippy::missing_errors_doc,       // Every fallible call returns StackdriverError
    clippy::module_name_repetitions,  // e.g. ConfigError in config module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown
)]

//! Client for the Stackdriver gateways: custom metrics, annotation events and
//! deploy events, posted as JSON over HTTPS.
//!
//! ```no_run
//! use stackdriver::{GatewayMessage, StackdriverClient};
//!
//! # async fn run() -> Result<(), stackdriver::StackdriverError> {
//! let client = StackdriverClient::new("my-api-key")?;
//! let mut batch = GatewayMessage::new();
//! batch.custom_metric("queue.depth", None, chrono::Utc::now().timestamp(), 17)?;
//! client.send(&batch).await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod client;
pub mod config;
pub mod domain;
pub mod sender;

pub use client::StackdriverClient;
pub use config::{ClientConfig, ConfigError, Endpoints};
pub use domain::{
    AnnotationEvent, DeployEvent, EventLevel, GatewayMessage, MetricPoint, MetricValue,
    StackdriverError,
};
pub use sender::{Endpoint, HttpTransport, Transport};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
