// Copyright (c) 2025 - Cowboy AI, Inc.
//! Notification payloads and the publisher seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Sku;
use crate::errors::InfrastructureResult;
use crate::subjects;

/// Sent to the catalog when stock for a SKU is removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDeactivation {
    pub sku: Sku,
    /// The catalog keys products by SKU
    pub product_id: String,
    pub message: String,
}

impl ProductDeactivation {
    pub fn for_sku(sku: Sku) -> Self {
        Self {
            product_id: sku.to_string(),
            message: format!("Inventory for SKU {sku} was deleted"),
            sku,
        }
    }
}

/// Availability dropped to or below the configured threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStock {
    pub sku: Sku,
    pub available: u64,
    pub threshold: u64,
}

/// Any outbound notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockNotification {
    ProductDeactivation(ProductDeactivation),
    LowStock(LowStock),
}

impl StockNotification {
    /// Subject the notification is published on
    pub fn subject(&self) -> &'static str {
        match self {
            StockNotification::ProductDeactivation(_) => subjects::PRODUCT_DEACTIVATE,
            StockNotification::LowStock(_) => subjects::INVENTORY_LOW_STOCK,
        }
    }

    pub fn sku(&self) -> &Sku {
        match self {
            StockNotification::ProductDeactivation(n) => &n.sku,
            StockNotification::LowStock(n) => &n.sku,
        }
    }

    /// JSON payload without any envelope
    pub fn to_payload(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            StockNotification::ProductDeactivation(n) => serde_json::to_vec(n),
            StockNotification::LowStock(n) => serde_json::to_vec(n),
        }
    }
}

/// Publishes notifications to whoever listens
#[async_trait]
pub trait StockEventPublisher: Send + Sync {
    async fn publish(&self, notification: &StockNotification) -> InfrastructureResult<()>;
}
