// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reply Envelopes and Error Translation
//!
//! Every request-mode command produces exactly one [`Reply`]:
//!
//! ```text
//! Ok(data)  → { success: true,  message, data }
//! Err(e)    → { success: false, error: { code, message, statusCode, details? }, timestamp }
//! ```
//!
//! Translation is a pure function of the error and the supplied timestamp.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

use crate::errors::{ErrorKind, InventoryError};

/// Successful reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessEnvelope {
    pub success: bool,
    pub message: String,
    pub data: Value,
}

impl SuccessEnvelope {
    pub fn new(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Error section of a failed reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Failed reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
    pub timestamp: String,
}

/// Reply sent back for a request-mode command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Success(SuccessEnvelope),
    Failure(ErrorEnvelope),
}

impl Reply {
    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }

    /// Error body of a failed reply
    pub fn error(&self) -> Option<&ErrorBody> {
        match self {
            Reply::Success(_) => None,
            Reply::Failure(envelope) => Some(&envelope.error),
        }
    }

    /// Data of a successful reply
    pub fn data(&self) -> Option<&Value> {
        match self {
            Reply::Success(envelope) => Some(&envelope.data),
            Reply::Failure(_) => None,
        }
    }
}

/// Build the error envelope for a classified failure
pub fn translate(err: &InventoryError, timestamp: DateTime<Utc>) -> ErrorEnvelope {
    let kind = err.kind();
    ErrorEnvelope {
        success: false,
        error: ErrorBody {
            code: kind.code().to_string(),
            message: err.to_string(),
            status_code: kind.status_code(),
            details: err.details(),
        },
        timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Fold an operation result into a reply, logging failures by severity
pub fn into_reply(
    result: Result<SuccessEnvelope, InventoryError>,
    timestamp: DateTime<Utc>,
) -> Reply {
    match result {
        Ok(success) => Reply::Success(success),
        Err(err) => {
            log_failure(&err);
            Reply::Failure(translate(&err, timestamp))
        }
    }
}

/// Log a failure at the level its kind deserves
pub fn log_failure(err: &InventoryError) {
    let kind = err.kind();
    match kind {
        ErrorKind::Internal | ErrorKind::ServiceUnavailable => {
            error!(code = %kind, details = ?err.details(), "[{}] {}", kind, err)
        }
        _ => warn!(code = %kind, "[{}] {}", kind, err),
    }
}
