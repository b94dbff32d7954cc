//! # Response Envelope
//!
//! The one shape every entry point returns.
//!
//! ```json
//! { "error": false, "message": "Purchase was successful", "status": 200, "data": { ... } }
//! { "error": true,  "message": "Product with ID 'x' not found", "status": 500 }
//! ```
//!
//! `data` is omitted when absent. The transport serializes the envelope
//! as-is and may use `status` as its own response code.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ServiceError, ServiceResult};

/// Uniform `{error, message, status, data}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub error: bool,
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Failure envelope; the message is the error's display text.
    pub fn from_error(err: &ServiceError) -> Self {
        if err.is_authentication() {
            warn!(status = err.status(), reason = %err, "Request rejected");
        }

        Envelope {
            error: true,
            message: err.to_string(),
            status: err.status(),
            data: None,
        }
    }

    /// `Ok` becomes a success envelope with `status`, `Err` a failure one.
    pub fn from_result(result: ServiceResult<T>, status: u16, message: impl Into<String>) -> Self {
        match result {
            Ok(data) => Envelope {
                error: false,
                message: message.into(),
                status,
                data: Some(data),
            },
            Err(err) => Envelope::from_error(&err),
        }
    }

    pub fn is_ok(&self) -> bool {
        !self.error
    }
}

impl Envelope<()> {
    /// 200 without data.
    pub fn message_only(message: impl Into<String>) -> Self {
        Envelope {
            error: false,
            message: message.into(),
            status: 200,
            data: None,
        }
    }

    /// Like [`Envelope::from_result`] for operations with no payload.
    pub fn from_unit(result: ServiceResult<()>, message: impl Into<String>) -> Self {
        match result {
            Ok(()) => Envelope::message_only(message),
            Err(err) => Envelope::from_error(&err),
        }
    }
}

impl<T: Serialize> Envelope<T> {
    /// Serializes the envelope to a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
