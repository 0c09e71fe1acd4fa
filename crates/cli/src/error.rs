//! CLI errors

use std::io;

use configurator::{fixtures::FixtureError, quote::QuoteError, request::RequestError};
use thiserror::Error;

/// Errors ending a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The catalog could not be loaded.
    #[error("failed to load catalog: {0}")]
    Catalog(#[from] FixtureError),

    /// The request was rejected.
    #[error("invalid request: {0}")]
    Request(#[from] RequestError),

    /// Reading input or writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON input or output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML input or output failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Rendering the quote failed.
    #[error(transparent)]
    Quote(#[from] QuoteError),

    /// `check` found catalog configuration errors.
    #[error("catalog has {0} configuration error(s)")]
    ConfigurationErrors(usize),

    /// The tracing subscriber could not be installed.
    #[error("failed to initialise tracing subscriber: {0}")]
    TracingSubscriber(#[from] tracing_subscriber::util::TryInitError),
}
