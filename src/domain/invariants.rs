// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Stock Ledger Invariants
//!
//! Every transition of an [`InventoryRecord`](super::InventoryRecord) runs
//! through these checks before a new record value is produced.
//!
//! # Invariants
//!
//! 1. `0 ≤ reserved ≤ quantity`
//! 2. `available = quantity - reserved` is derived, never stored
//! 3. Reservations and releases move at least one unit

use super::Sku;

/// Result of a ledger transition or check
pub type LedgerResult<T> = Result<T, LedgerViolation>;

/// A stock transition that would break a ledger rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerViolation {
    /// Reservation larger than the sellable remainder
    #[error("Insufficient stock for SKU {sku}: requested {requested}, available {available}")]
    InsufficientStock {
        sku: Sku,
        requested: u64,
        available: u64,
    },

    /// Release larger than what is currently held
    #[error("Cannot release more than reserved for SKU {sku}: requested {requested}, reserved {reserved}")]
    ReleaseExceedsReserved {
        sku: Sku,
        requested: u64,
        reserved: u64,
    },

    /// Stock levels where more is reserved than physically present
    #[error("Reserved quantity {reserved} exceeds total quantity {quantity}")]
    ReservedExceedsQuantity { quantity: u64, reserved: u64 },

    /// Reservation or release of zero units
    #[error("Quantity must be at least 1")]
    ZeroQuantity,

    /// Restock that does not fit the quantity type
    #[error("Quantity overflow: {current} + {added}")]
    QuantityOverflow { current: u64, added: u64 },
}

/// Validate invariant 1 for a pair of stock levels
pub fn validate_stock_levels(quantity: u64, reserved: u64) -> LedgerResult<()> {
    if reserved > quantity {
        return Err(LedgerViolation::ReservedExceedsQuantity { quantity, reserved });
    }
    Ok(())
}

/// Validate the size of a reservation or release
pub fn validate_movement_quantity(quantity: u64) -> LedgerResult<()> {
    if quantity == 0 {
        return Err(LedgerViolation::ZeroQuantity);
    }
    Ok(())
}

/// Sellable remainder for the given stock levels
pub fn available(quantity: u64, reserved: u64) -> u64 {
    quantity.saturating_sub(reserved)
}

/// Out of stock means nothing is left to sell
///
/// `quantity == 0` or `quantity <= reserved`.
pub fn is_out_of_stock(quantity: u64, reserved: u64) -> bool {
    quantity == 0 || quantity <= reserved
}
