//! Unified error handling for the client.

use crate::config::ConfigError;
use clinic_engine::RemoteFailure;

/// Error talking to the booking service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Service rejected the request: {0}")]
    Rejected(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Convert into the engine's failure shape. This is the only place a
    /// transport error crosses into the engine.
    pub fn to_failure(&self) -> RemoteFailure {
        match self {
            ClientError::Http(e) => match e.status() {
                Some(status) => RemoteFailure::status(status.as_u16(), e.to_string()),
                None => RemoteFailure::transport(e.to_string()),
            },
            ClientError::Status { status, message } => {
                RemoteFailure::status(*status, message.clone())
            }
            ClientError::Rejected(message) => RemoteFailure::transport(message.clone()),
            ClientError::Config(e) => RemoteFailure::transport(e.to_string()),
        }
    }
}

/// Result type alias for remote calls.
pub type Result<T> = std::result::Result<T, ClientError>;
