// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for stock-ledger
//!
//! Deterministic collaborators for driving the engine and router in tests.
//!
//! # Design Principles
//! - Time is fixed (no `Utc::now()` in assertions)
//! - Notifications are captured, never sent
//! - Each test builds its own store; nothing is shared between tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use stock_ledger::commands::{CreateInventory, StockMovement};
use stock_ledger::errors::{InfrastructureError, InfrastructureResult};
use stock_ledger::events::{StockEventPublisher, StockNotification};
use stock_ledger::{
    Clock, CommandMessage, CommandRouter, InMemoryInventoryStore, LedgerSettings, Reply, Sku,
    StockLedgerService,
};
use stock_ledger::subjects::CommandPattern;

// Fixed test timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

/// Parse the fixed timestamp
pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

/// Clock frozen at [`FIXED_TIMESTAMP`]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(fixed_timestamp())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Publisher that records every notification
#[derive(Default)]
pub struct RecordingPublisher {
    sent: Mutex<Vec<StockNotification>>,
    fail: bool,
}

impl RecordingPublisher {
    /// Records, then reports every publish as failed
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<StockNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl StockEventPublisher for RecordingPublisher {
    async fn publish(&self, notification: &StockNotification) -> InfrastructureResult<()> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.fail {
            return Err(InfrastructureError::NatsPublish(
                "no servers available".to_string(),
            ));
        }
        Ok(())
    }
}

/// Engine wired to fresh in-memory collaborators
pub struct TestLedger {
    pub store: Arc<InMemoryInventoryStore>,
    pub publisher: Arc<RecordingPublisher>,
    pub service: Arc<StockLedgerService>,
}

impl TestLedger {
    pub fn new() -> Self {
        Self::with_settings(LedgerSettings::default())
    }

    pub fn with_settings(settings: LedgerSettings) -> Self {
        Self::build(settings, RecordingPublisher::default())
    }

    pub fn with_failing_publisher() -> Self {
        Self::build(LedgerSettings::default(), RecordingPublisher::failing())
    }

    fn build(settings: LedgerSettings, publisher: RecordingPublisher) -> Self {
        let store = Arc::new(InMemoryInventoryStore::new());
        let publisher = Arc::new(publisher);
        let service = StockLedgerService::new(store.clone(), publisher.clone())
            .with_clock(Arc::new(FixedClock::default()))
            .with_settings(settings);

        Self {
            store,
            publisher,
            service: Arc::new(service),
        }
    }

    pub fn router(&self) -> CommandRouter {
        CommandRouter::new(self.service.clone()).with_clock(Arc::new(FixedClock::default()))
    }
}

pub fn sku(raw: &str) -> Sku {
    Sku::new(raw).expect("Invalid SKU in test fixture")
}

pub fn create(raw: &str, quantity: u64) -> CreateInventory {
    CreateInventory {
        sku: sku(raw),
        quantity,
        reserved: None,
    }
}

pub fn movement(raw: &str, quantity: u64, order_id: &str) -> StockMovement {
    StockMovement {
        sku: sku(raw),
        quantity,
        order_id: order_id.to_string(),
    }
}

/// Send one command through the router
pub async fn request(router: &CommandRouter, pattern: CommandPattern, body: Value) -> Reply {
    router.handle_request(CommandMessage::new(pattern, body)).await
}

pub fn reserve_body(raw: &str, quantity: u64, order_id: &str) -> Value {
    json!({ "sku": raw, "quantity": quantity, "orderId": order_id })
}
