//! Error types for the inventory service
//!
//! Two layers:
//! - [`InfrastructureError`] for transport and configuration failures
//! - [`InventoryError`], the closed taxonomy every engine operation reports
//!   and the wire envelope is derived from

use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

use crate::domain::{LedgerViolation, SkuError};
use crate::store::StoreError;

/// Errors that can occur in infrastructure operations
#[derive(Debug, Error)]
pub enum InfrastructureError {
    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// NATS publish error
    #[error("NATS publish error: {0}")]
    NatsPublish(String),

    /// NATS subscribe error
    #[error("NATS subscribe error: {0}")]
    NatsSubscribe(String),

    /// JetStream key-value error
    #[error("Key-value store error: {0}")]
    KeyValue(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for infrastructure operations
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

impl From<async_nats::Error> for InfrastructureError {
    fn from(err: async_nats::Error) -> Self {
        InfrastructureError::NatsConnection(err.to_string())
    }
}

impl From<serde_json::Error> for InfrastructureError {
    fn from(err: serde_json::Error) -> Self {
        InfrastructureError::Serialization(err.to_string())
    }
}

/// Error classification carried onto the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input; never reaches storage
    Validation,
    /// Referenced SKU or id is absent
    NotFound,
    /// Business rule violation (overselling, over-releasing, duplicates)
    Conflict,
    /// A collaborator the service depends on is down
    ServiceUnavailable,
    /// Anything unclassified
    Internal,
}

impl ErrorKind {
    /// Wire code string
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "RESOURCE_NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorKind::Internal => "INTERNAL_SERVER_ERROR",
        }
    }

    /// HTTP-style status code
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::ServiceUnavailable => 503,
            ErrorKind::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Classified failure of an inventory operation
#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<Value>,
    },

    #[error("{resource} with ID {identifier} not found")]
    NotFound {
        resource: &'static str,
        identifier: String,
    },

    #[error("{message}")]
    Conflict {
        message: String,
        details: Option<Value>,
    },

    #[error("{message}")]
    ServiceUnavailable { service: String, message: String },

    #[error("{message}")]
    Internal {
        message: String,
        details: Option<Value>,
    },
}

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

impl InventoryError {
    /// Validation failure pinned to a request field
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        InventoryError::Validation {
            message: message.into(),
            details: Some(json!({ "field": field })),
        }
    }

    pub fn not_found(identifier: impl fmt::Display) -> Self {
        InventoryError::NotFound {
            resource: "Inventory",
            identifier: identifier.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>, details: Option<Value>) -> Self {
        InventoryError::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn unavailable(service: impl Into<String>) -> Self {
        let service = service.into();
        InventoryError::ServiceUnavailable {
            message: format!("{service} service is currently unavailable"),
            service,
        }
    }

    /// Wrap an unclassified failure, keeping its message in `details`
    pub fn internal(message: impl Into<String>, original: impl fmt::Display) -> Self {
        InventoryError::Internal {
            message: message.into(),
            details: Some(json!({ "originalError": original.to_string() })),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            InventoryError::Validation { .. } => ErrorKind::Validation,
            InventoryError::NotFound { .. } => ErrorKind::NotFound,
            InventoryError::Conflict { .. } => ErrorKind::Conflict,
            InventoryError::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            InventoryError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Structured details for the wire envelope
    pub fn details(&self) -> Option<Value> {
        match self {
            InventoryError::Validation { details, .. }
            | InventoryError::Conflict { details, .. }
            | InventoryError::Internal { details, .. } => details.clone(),
            InventoryError::NotFound {
                resource,
                identifier,
            } => Some(json!({ "resource": resource, "identifier": identifier })),
            InventoryError::ServiceUnavailable { service, .. } => {
                Some(json!({ "service": service }))
            }
        }
    }
}

impl From<SkuError> for InventoryError {
    fn from(err: SkuError) -> Self {
        InventoryError::invalid_field("sku", err.to_string())
    }
}

impl From<LedgerViolation> for InventoryError {
    fn from(violation: LedgerViolation) -> Self {
        let message = violation.to_string();
        match violation {
            LedgerViolation::InsufficientStock {
                sku,
                requested,
                available,
            } => InventoryError::conflict(
                message,
                Some(json!({
                    "reason": "insufficient stock",
                    "sku": sku,
                    "requested": requested,
                    "available": available,
                })),
            ),
            LedgerViolation::ReleaseExceedsReserved {
                sku,
                requested,
                reserved,
            } => InventoryError::conflict(
                message,
                Some(json!({
                    "reason": "cannot release more than reserved",
                    "sku": sku,
                    "requested": requested,
                    "reserved": reserved,
                })),
            ),
            LedgerViolation::ReservedExceedsQuantity { quantity, reserved } => {
                InventoryError::conflict(
                    message,
                    Some(json!({ "quantity": quantity, "reserved": reserved })),
                )
            }
            LedgerViolation::ZeroQuantity => InventoryError::invalid_field("quantity", message),
            LedgerViolation::QuantityOverflow { .. } => {
                InventoryError::invalid_field("quantity", message)
            }
        }
    }
}

impl From<StoreError> for InventoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(identifier) => InventoryError::not_found(identifier),
            StoreError::DuplicateSku(sku) => InventoryError::conflict(
                format!("Inventory with SKU {sku} already exists"),
                Some(json!({ "sku": sku })),
            ),
            StoreError::RevisionMismatch { expected, actual } => InventoryError::conflict(
                "Inventory was modified concurrently",
                Some(json!({ "expectedRevision": expected, "actualRevision": actual })),
            ),
            StoreError::Unavailable(_) => InventoryError::unavailable("storage"),
            other => InventoryError::internal("Storage operation failed", other),
        }
    }
}

impl From<anyhow::Error> for InventoryError {
    fn from(err: anyhow::Error) -> Self {
        InventoryError::internal("An unexpected error occurred", format!("{err:#}"))
    }
}
