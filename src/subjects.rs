// Copyright (c) 2025 - Cowboy AI, Inc.

//! Message patterns, event names and NATS subjects
//!
//! Commands are addressed by an `inventory/{operation}` pattern inside the
//! command envelope (plus the bare `health` check); events by a dotted
//! `{aggregate}.{operation}` name.
//!
//! ```text
//! inventory.rpc      ← { pattern: "inventory/reserve", body }     request/reply
//! inventory.events   ← { event: "inventory.created", payload }    fire-and-forget
//! product.deactivate → { sku, productId, message }                 outbound
//! ```
//!
//! # Examples
//!
//! ```rust
//! use stock_ledger::subjects::{CommandPattern, EventName};
//!
//! assert_eq!(CommandPattern::Reserve.as_str(), "inventory/reserve");
//! assert_eq!(CommandPattern::parse("inventory/out-of-stock"), Some(CommandPattern::OutOfStock));
//! assert_eq!(EventName::parse("inventory.created"), Some(EventName::InventoryCreated));
//! ```

use std::fmt;

/// Default subject carrying command envelopes
pub const DEFAULT_RPC_SUBJECT: &str = "inventory.rpc";

/// Default subject carrying inbound event envelopes
pub const DEFAULT_EVENT_SUBJECT: &str = "inventory.events";

/// Default queue group shared by service instances
pub const DEFAULT_QUEUE_GROUP: &str = "inventory-service";

/// Outbound notification to the catalog when a record is deleted
pub const PRODUCT_DEACTIVATE: &str = "product.deactivate";

/// Outbound notification when availability drops to the threshold
pub const INVENTORY_LOW_STOCK: &str = "inventory.low-stock";

/// Request/response commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandPattern {
    Create,
    FindAll,
    FindOne,
    Update,
    Remove,
    FindBySku,
    Reserve,
    Release,
    OutOfStock,
    CheckAvailability,
    /// Liveness check; answered without touching the ledger
    Health,
}

impl CommandPattern {
    /// Every recognized command
    pub const ALL: [CommandPattern; 11] = [
        CommandPattern::Create,
        CommandPattern::FindAll,
        CommandPattern::FindOne,
        CommandPattern::Update,
        CommandPattern::Remove,
        CommandPattern::FindBySku,
        CommandPattern::Reserve,
        CommandPattern::Release,
        CommandPattern::OutOfStock,
        CommandPattern::CheckAvailability,
        CommandPattern::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandPattern::Create => "inventory/create",
            CommandPattern::FindAll => "inventory/find-all",
            CommandPattern::FindOne => "inventory/find-one",
            CommandPattern::Update => "inventory/update",
            CommandPattern::Remove => "inventory/remove",
            CommandPattern::FindBySku => "inventory/find-by-sku",
            CommandPattern::Reserve => "inventory/reserve",
            CommandPattern::Release => "inventory/release",
            CommandPattern::OutOfStock => "inventory/out-of-stock",
            CommandPattern::CheckAvailability => "inventory/check-availability",
            CommandPattern::Health => "health",
        }
    }

    /// Exact-name lookup
    pub fn parse(pattern: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == pattern)
    }
}

impl fmt::Display for CommandPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fire-and-forget inbound events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    /// A record created elsewhere; merged through create
    InventoryCreated,
    /// Another service reserved stock (audit only)
    InventoryReserved,
    /// Another service released stock (audit only)
    InventoryReleased,
}

impl EventName {
    pub const ALL: [EventName; 3] = [
        EventName::InventoryCreated,
        EventName::InventoryReserved,
        EventName::InventoryReleased,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::InventoryCreated => "inventory.created",
            EventName::InventoryReserved => "inventory.reserved",
            EventName::InventoryReleased => "inventory.released",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == name)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
