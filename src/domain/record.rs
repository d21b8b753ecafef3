// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Record Entity
//!
//! One record per SKU. All transitions are pure: they take the current record
//! and an explicit timestamp and return a new record, or the ledger rule the
//! transition would break. Nothing here touches storage.
//!
//! # Transitions
//!
//! ```text
//! restock(n)   quantity += n
//! reserve(n)   reserved += n      requires available >= n
//! release(n)   reserved -= n      requires reserved >= n
//! apply_patch  field overwrite    requires reserved <= quantity afterwards
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::invariants::{self, LedgerResult, LedgerViolation};
use super::{InventoryId, Sku};

/// Stock levels for a single SKU
///
/// `available` is not stored; it is derived on read, see
/// [`InventoryRecord::available`] and [`InventoryView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    id: InventoryId,
    sku: Sku,
    quantity: u64,
    reserved: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    /// Create a new record with a freshly generated identifier
    ///
    /// # Invariants
    /// - `reserved <= quantity`
    pub fn new(sku: Sku, quantity: u64, reserved: u64, at: DateTime<Utc>) -> LedgerResult<Self> {
        Self::with_id(InventoryId::generate(), sku, quantity, reserved, at)
    }

    fn with_id(
        id: InventoryId,
        sku: Sku,
        quantity: u64,
        reserved: u64,
        at: DateTime<Utc>,
    ) -> LedgerResult<Self> {
        invariants::validate_stock_levels(quantity, reserved)?;

        Ok(Self {
            id,
            sku,
            quantity,
            reserved,
            created_at: at,
            updated_at: at,
        })
    }

    pub fn id(&self) -> InventoryId {
        self.id
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn reserved(&self) -> u64 {
        self.reserved
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Units that can still be reserved
    pub fn available(&self) -> u64 {
        invariants::available(self.quantity, self.reserved)
    }

    pub fn is_out_of_stock(&self) -> bool {
        invariants::is_out_of_stock(self.quantity, self.reserved)
    }

    /// Add physical units; reservations are untouched
    pub fn restock(&self, added: u64, at: DateTime<Utc>) -> LedgerResult<Self> {
        let quantity = self
            .quantity
            .checked_add(added)
            .ok_or(LedgerViolation::QuantityOverflow {
                current: self.quantity,
                added,
            })?;

        Ok(Self {
            quantity,
            updated_at: at,
            ..self.clone()
        })
    }

    /// Hold `requested` units against an order
    pub fn reserve(&self, requested: u64, at: DateTime<Utc>) -> LedgerResult<Self> {
        invariants::validate_movement_quantity(requested)?;

        let available = self.available();
        if available < requested {
            return Err(LedgerViolation::InsufficientStock {
                sku: self.sku.clone(),
                requested,
                available,
            });
        }

        Ok(Self {
            reserved: self.reserved + requested,
            updated_at: at,
            ..self.clone()
        })
    }

    /// Return `requested` held units to the sellable pool
    pub fn release(&self, requested: u64, at: DateTime<Utc>) -> LedgerResult<Self> {
        invariants::validate_movement_quantity(requested)?;

        if requested > self.reserved {
            return Err(LedgerViolation::ReleaseExceedsReserved {
                sku: self.sku.clone(),
                requested,
                reserved: self.reserved,
            });
        }

        Ok(Self {
            reserved: self.reserved - requested,
            updated_at: at,
            ..self.clone()
        })
    }

    /// Overwrite the fields present in `patch`
    ///
    /// The patched record must still satisfy `reserved <= quantity`.
    pub fn apply_patch(&self, patch: &InventoryPatch, at: DateTime<Utc>) -> LedgerResult<Self> {
        let quantity = patch.quantity.unwrap_or(self.quantity);
        let reserved = patch.reserved.unwrap_or(self.reserved);
        invariants::validate_stock_levels(quantity, reserved)?;

        Ok(Self {
            id: self.id,
            sku: patch.sku.clone().unwrap_or_else(|| self.sku.clone()),
            quantity,
            reserved,
            created_at: self.created_at,
            updated_at: at,
        })
    }

    /// Wire representation including the derived `available` figure
    pub fn view(&self) -> InventoryView {
        InventoryView::from(self)
    }
}

/// Partial overwrite of an inventory record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryPatch {
    pub sku: Option<Sku>,
    pub quantity: Option<u64>,
    pub reserved: Option<u64>,
}

impl InventoryPatch {
    pub fn is_empty(&self) -> bool {
        self.sku.is_none() && self.quantity.is_none() && self.reserved.is_none()
    }
}

/// Read model returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryView {
    pub id: InventoryId,
    pub sku: Sku,
    pub quantity: u64,
    pub reserved: u64,
    pub available: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&InventoryRecord> for InventoryView {
    fn from(record: &InventoryRecord) -> Self {
        Self {
            id: record.id,
            sku: record.sku.clone(),
            quantity: record.quantity,
            reserved: record.reserved,
            available: record.available(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
