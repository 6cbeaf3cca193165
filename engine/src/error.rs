//! Error types for the clinic engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failure reported by the remote booking service.
///
/// The shell converts transport and decoding failures into this shape at the
/// component boundary, so the engine never sees a transport error type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFailure {
    /// HTTP status, when the service answered at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Human readable reason
    pub message: String,
}

impl RemoteFailure {
    /// Failure without a status code (connection refused, timeout, ...).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Failure answered by the service with a status code.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

/// Failure while loading the booking collection.
pub type FetchError = RemoteFailure;

/// Failure while updating the caller's profile.
pub type MutationError = RemoteFailure;

/// All possible errors from the clinic engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Session errors
    #[error("no credential or resolved identity; request suppressed")]
    AuthMissing,

    #[error("profile not loaded")]
    ProfileNotLoaded,

    // Loader errors
    #[error("failed to load bookings: {0}")]
    Fetch(FetchError),

    #[error("a booking fetch for this identity is already in flight")]
    LoadInFlight,

    #[error("retry is only available after a failed load")]
    RetryUnavailable,

    // Mutation errors
    #[error("failed to update profile: {0}")]
    Mutation(MutationError),

    #[error("a profile mutation is already in progress")]
    InProgress,

    #[error("no edit in progress")]
    NotEditing,
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
