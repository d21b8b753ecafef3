// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stock Ledger Domain Model
//!
//! Value objects and the inventory record entity, with the invariants every
//! stock transition must preserve.
//!
//! # Value Objects
//!
//! - [`Sku`] - validated stock-keeping unit, the natural key
//! - [`InventoryId`] - immutable surrogate identifier (UUID v7)
//!
//! # Entities
//!
//! - [`InventoryRecord`] - quantity and reservations for one SKU
//!
//! # Invariants
//!
//! - `0 ≤ reserved ≤ quantity` after every transition
//! - `available = quantity - reserved` is computed, never stored
//! - one record per SKU (enforced by the store)

pub mod invariants;
pub mod record;
pub mod sku;

pub use invariants::{LedgerResult, LedgerViolation};
pub use record::{InventoryPatch, InventoryRecord, InventoryView};
pub use sku::{InventoryId, Sku, SkuError};
