//! Wire envelope used by the booking service.
//!
//! Every response is wrapped as `{"success": bool, "data": ..., "count"?: n}`;
//! failures carry `{"success": false, "message": "..."}`.

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};

/// Response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope around `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            count: None,
            message: None,
        }
    }

    /// Failed envelope with a reason.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            count: None,
            message: Some(message.into()),
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// The payload, or the service's reason for not sending one.
    pub fn into_data(self) -> Result<T> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(ClientError::Rejected(
                self.message
                    .unwrap_or_else(|| "response carried no data".to_string()),
            )),
            (false, _) => Err(ClientError::Rejected(
                self.message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            )),
        }
    }
}

/// Body of a non-2xx response. Every field is optional since proxies and
/// gateways answer with whatever they like.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn reason(self) -> Option<String> {
        self.message.or(self.error)
    }
}
