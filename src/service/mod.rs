// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Operations Engine
//!
//! The application service that owns every state change of the ledger.
//!
//! # Architecture
//!
//! ```text
//! Typed command
//!     ↓
//! Service (this module)
//!     ↓
//! read (record, revision) → pure ledger transition → revision-checked write
//!     ↓                                                  ↓
//! Reply data                                   Notification (best effort)
//! ```
//!
//! # Design Principles
//!
//! 1. **Explicit Collaborators**: store, publisher and clock are injected
//! 2. **Pure Transitions**: ledger arithmetic lives on [`InventoryRecord`]
//! 3. **Optimistic Writes**: every read-modify-write is a conditional update
//!    retried a bounded number of times
//! 4. **Classified Failures**: every error leaves as an [`InventoryError`]
//!
//! [`InventoryRecord`]: crate::domain::InventoryRecord
//! [`InventoryError`]: crate::errors::InventoryError

use chrono::{DateTime, Utc};

pub mod inventory;

pub use inventory::{
    Availability, CreateOutcome, InventoryService, LedgerSettings, StockLedgerService,
};

/// Source of timestamps for the engine
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
