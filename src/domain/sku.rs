// Copyright (c) 2025 - Cowboy AI, Inc.
//! SKU and Inventory Identifier Value Objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// SKU validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SkuError {
    #[error("SKU is required")]
    Empty,

    #[error("SKU exceeds maximum length of 128 characters: {0}")]
    TooLong(usize),

    #[error("Invalid control character in SKU: {0:?}")]
    ControlCharacter(char),
}

/// Stock-Keeping Unit value object
///
/// The natural key of an inventory record. Invariants:
/// - Non-empty after trimming surrounding whitespace
/// - At most 128 characters
/// - No control characters
///
/// # Examples
///
/// ```rust
/// use stock_ledger::domain::Sku;
///
/// let sku = Sku::new("A-1").unwrap();
/// assert_eq!(sku.as_str(), "A-1");
///
/// assert!(Sku::new("").is_err());
/// assert!(Sku::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    /// Maximum SKU length in characters
    pub const MAX_LENGTH: usize = 128;

    /// Create a new SKU with validation
    pub fn new(sku: impl Into<String>) -> Result<Self, SkuError> {
        let sku = sku.into();
        let trimmed = sku.trim();

        if trimmed.is_empty() {
            return Err(SkuError::Empty);
        }

        let length = trimmed.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(SkuError::TooLong(length));
        }

        if let Some(ch) = trimmed.chars().find(|c| c.is_control()) {
            return Err(SkuError::ControlCharacter(ch));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Get the SKU as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Sku {
    type Err = SkuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Sku {
    type Error = SkuError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self {
        sku.0
    }
}

/// Surrogate identifier of an inventory record
///
/// Assigned once at creation (UUID v7) and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryId(Uuid);

impl InventoryId {
    /// Generate a fresh time-ordered identifier
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for InventoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for InventoryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}
