// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stock Ledger Service
//!
//! # Transaction Semantics
//!
//! Each mutating method is a transaction against one record:
//! 1. Read the record with its storage revision
//! 2. Apply the pure ledger transition
//! 3. Write it back conditioned on the revision
//! 4. On a stale revision, go back to 1 (bounded by `max_write_attempts`)
//!
//! A business-rule rejection in step 2 ends the transaction with the record
//! untouched. Notifications are published after the write and never fail
//! the operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{Clock, SystemClock};
use crate::commands::{
    AvailabilityQuery, CreateInventory, InventoryLookup, StockMovement, UpdateInventory,
};
use crate::domain::{InventoryId, InventoryRecord, LedgerViolation, Sku};
use crate::errors::{InventoryError, InventoryResult};
use crate::events::{LowStock, ProductDeactivation, StockEventPublisher, StockNotification};
use crate::store::{InventoryStore, StoreError, StoredRecord};

/// Tunables of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerSettings {
    /// Attempts per read-modify-write before giving up with `Conflict`
    pub max_write_attempts: u32,
    /// Publish a low-stock notification when a reservation leaves
    /// `available` at or below this value
    pub low_stock_threshold: Option<u64>,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            max_write_attempts: 8,
            low_stock_threshold: None,
        }
    }
}

/// What `create` did with the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new record was inserted
    Created(InventoryRecord),
    /// The SKU existed; its quantity was increased
    Merged(InventoryRecord),
}

impl CreateOutcome {
    pub fn record(&self) -> &InventoryRecord {
        match self {
            CreateOutcome::Created(record) | CreateOutcome::Merged(record) => record,
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self, CreateOutcome::Merged(_))
    }
}

/// Answer to an availability check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub sku: Sku,
    pub quantity: u64,
    pub reserved: u64,
    pub available: u64,
    pub requested: u64,
    pub sufficient: bool,
}

/// Inventory operations
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Insert a record, or add `quantity` to the existing record of the SKU
    async fn create(&self, command: CreateInventory) -> InventoryResult<CreateOutcome>;

    /// Every record
    async fn find_all(&self) -> InventoryResult<Vec<InventoryRecord>>;

    /// One record by id or by SKU
    async fn find_one(&self, lookup: InventoryLookup) -> InventoryResult<InventoryRecord>;

    async fn find_by_sku(&self, sku: &Sku) -> InventoryResult<InventoryRecord>;

    /// Overwrite the fields present in the patch
    async fn update(&self, command: UpdateInventory) -> InventoryResult<InventoryRecord>;

    /// Delete a record and notify the catalog
    async fn remove(&self, id: InventoryId) -> InventoryResult<InventoryRecord>;

    /// Hold stock against an order
    ///
    /// # Errors
    ///
    /// - `NotFound` if the SKU is unknown
    /// - `Conflict` if fewer than `quantity` units are available
    async fn reserve(&self, movement: StockMovement) -> InventoryResult<InventoryRecord>;

    /// Return held stock
    ///
    /// # Errors
    ///
    /// - `NotFound` if the SKU is unknown
    /// - `Conflict` if more than the reserved amount is released
    async fn release(&self, movement: StockMovement) -> InventoryResult<InventoryRecord>;

    /// Records with nothing left to sell
    async fn out_of_stock(&self) -> InventoryResult<Vec<InventoryRecord>>;

    async fn check_availability(&self, query: AvailabilityQuery) -> InventoryResult<Availability>;
}

/// [`InventoryService`] over an [`InventoryStore`]
pub struct StockLedgerService {
    store: Arc<dyn InventoryStore>,
    publisher: Arc<dyn StockEventPublisher>,
    clock: Arc<dyn Clock>,
    settings: LedgerSettings,
}

impl StockLedgerService {
    pub fn new(store: Arc<dyn InventoryStore>, publisher: Arc<dyn StockEventPublisher>) -> Self {
        Self {
            store,
            publisher,
            clock: Arc::new(SystemClock),
            settings: LedgerSettings::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settings(mut self, settings: LedgerSettings) -> Self {
        self.settings = settings;
        self
    }

    fn attempts(&self) -> u32 {
        self.settings.max_write_attempts.max(1)
    }

    async fn load(&self, lookup: &InventoryLookup) -> InventoryResult<StoredRecord> {
        let found = match lookup {
            InventoryLookup::Id(id) => self.store.find_by_id(*id).await?,
            InventoryLookup::Sku(sku) => self.store.find_by_sku(sku).await?,
        };
        found.ok_or_else(|| match lookup {
            InventoryLookup::Id(id) => InventoryError::not_found(id),
            InventoryLookup::Sku(sku) => InventoryError::not_found(sku),
        })
    }

    /// Conditional read-modify-write of one record
    async fn modify<F>(&self, lookup: &InventoryLookup, transition: F) -> InventoryResult<InventoryRecord>
    where
        F: Fn(&InventoryRecord, DateTime<Utc>) -> InventoryResult<InventoryRecord> + Send + Sync,
    {
        let attempts = self.attempts();
        for attempt in 1..=attempts {
            let current = self.load(lookup).await?;
            let next = transition(&current.record, self.clock.now())?;

            let written = match lookup {
                InventoryLookup::Id(id) => self.store.update_by_id(*id, next, current.revision).await,
                InventoryLookup::Sku(sku) => {
                    self.store.update_by_sku(sku, next, current.revision).await
                }
            };

            match written {
                Ok(stored) => return Ok(stored.record),
                Err(StoreError::RevisionMismatch { expected, actual }) => {
                    debug!(
                        attempt,
                        expected, actual, "Record changed during write, re-reading"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(Self::contention(lookup, attempts))
    }

    fn contention(lookup: &InventoryLookup, attempts: u32) -> InventoryError {
        let key = match lookup {
            InventoryLookup::Id(id) => id.to_string(),
            InventoryLookup::Sku(sku) => sku.to_string(),
        };
        warn!(key = %key, attempts, "Giving up after repeated concurrent modification");
        InventoryError::conflict(
            "Inventory was modified concurrently, please retry",
            Some(json!({ "reason": "concurrent modification", "key": key, "attempts": attempts })),
        )
    }

    /// Best-effort publish
    async fn notify(&self, notification: StockNotification) {
        match self.publisher.publish(&notification).await {
            Ok(()) => debug!(
                subject = notification.subject(),
                sku = %notification.sku(),
                "Published notification"
            ),
            Err(err) => warn!(
                subject = notification.subject(),
                sku = %notification.sku(),
                error = %err,
                "Failed to publish notification"
            ),
        }
    }
}

#[async_trait]
impl InventoryService for StockLedgerService {
    async fn create(&self, command: CreateInventory) -> InventoryResult<CreateOutcome> {
        let CreateInventory {
            sku,
            quantity,
            reserved,
        } = command;

        let attempts = self.attempts();
        for attempt in 1..=attempts {
            let at = self.clock.now();

            if let Some(current) = self.store.find_by_sku(&sku).await? {
                let merged = current.record.restock(quantity, at)?;
                match self.store.update_by_sku(&sku, merged, current.revision).await {
                    Ok(stored) => {
                        info!(
                            sku = %sku,
                            added = quantity,
                            quantity = stored.record.quantity(),
                            "Inventory merged into existing SKU"
                        );
                        return Ok(CreateOutcome::Merged(stored.record));
                    }
                    Err(StoreError::RevisionMismatch { .. } | StoreError::NotFound(_)) => {
                        debug!(sku = %sku, attempt, "SKU changed during merge, retrying");
                        continue;
                    }
                    Err(err) => return Err(err.into()),
                }
            }

            let record = InventoryRecord::new(sku.clone(), quantity, reserved.unwrap_or(0), at)
                .map_err(|violation| match violation {
                    LedgerViolation::ReservedExceedsQuantity { .. } => {
                        InventoryError::invalid_field("reserved", violation.to_string())
                    }
                    other => other.into(),
                })?;

            match self.store.insert(record).await {
                Ok(stored) => {
                    info!(
                        sku = %sku,
                        id = %stored.record.id(),
                        quantity = stored.record.quantity(),
                        "Inventory created"
                    );
                    return Ok(CreateOutcome::Created(stored.record));
                }
                Err(StoreError::DuplicateSku(_)) => {
                    debug!(sku = %sku, attempt, "Lost insert race, retrying as merge");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(Self::contention(&InventoryLookup::Sku(sku), attempts))
    }

    async fn find_all(&self) -> InventoryResult<Vec<InventoryRecord>> {
        Ok(self.store.list_all().await?)
    }

    async fn find_one(&self, lookup: InventoryLookup) -> InventoryResult<InventoryRecord> {
        Ok(self.load(&lookup).await?.record)
    }

    async fn find_by_sku(&self, sku: &Sku) -> InventoryResult<InventoryRecord> {
        Ok(self.load(&InventoryLookup::Sku(sku.clone())).await?.record)
    }

    async fn update(&self, command: UpdateInventory) -> InventoryResult<InventoryRecord> {
        let UpdateInventory { id, patch } = command;
        let record = self
            .modify(&InventoryLookup::Id(id), |current, at| {
                Ok(current.apply_patch(&patch, at)?)
            })
            .await?;

        info!(
            id = %id,
            sku = %record.sku(),
            quantity = record.quantity(),
            reserved = record.reserved(),
            "Inventory updated"
        );
        Ok(record)
    }

    async fn remove(&self, id: InventoryId) -> InventoryResult<InventoryRecord> {
        let removed = self.store.delete_by_id(id).await?;
        info!(id = %id, sku = %removed.sku(), "Inventory deleted");

        self.notify(StockNotification::ProductDeactivation(
            ProductDeactivation::for_sku(removed.sku().clone()),
        ))
        .await;

        Ok(removed)
    }

    async fn reserve(&self, movement: StockMovement) -> InventoryResult<InventoryRecord> {
        let StockMovement {
            sku,
            quantity,
            order_id,
        } = movement;

        let result = self
            .modify(&InventoryLookup::Sku(sku.clone()), |current, at| {
                Ok(current.reserve(quantity, at)?)
            })
            .await;

        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!(sku = %sku, order_id = %order_id, quantity, error = %err, "Reservation rejected");
                return Err(err);
            }
        };

        info!(
            sku = %sku,
            order_id = %order_id,
            quantity,
            reserved = record.reserved(),
            available = record.available(),
            "Inventory reserved"
        );

        if let Some(threshold) = self.settings.low_stock_threshold {
            if record.available() <= threshold {
                self.notify(StockNotification::LowStock(LowStock {
                    sku: sku.clone(),
                    available: record.available(),
                    threshold,
                }))
                .await;
            }
        }

        Ok(record)
    }

    async fn release(&self, movement: StockMovement) -> InventoryResult<InventoryRecord> {
        let StockMovement {
            sku,
            quantity,
            order_id,
        } = movement;

        let result = self
            .modify(&InventoryLookup::Sku(sku.clone()), |current, at| {
                Ok(current.release(quantity, at)?)
            })
            .await;

        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!(sku = %sku, order_id = %order_id, quantity, error = %err, "Release rejected");
                return Err(err);
            }
        };

        info!(
            sku = %sku,
            order_id = %order_id,
            quantity,
            reserved = record.reserved(),
            available = record.available(),
            "Inventory released"
        );
        Ok(record)
    }

    async fn out_of_stock(&self) -> InventoryResult<Vec<InventoryRecord>> {
        Ok(self
            .store
            .list_where(&|record: &InventoryRecord| record.is_out_of_stock())
            .await?)
    }

    async fn check_availability(&self, query: AvailabilityQuery) -> InventoryResult<Availability> {
        let record = self.find_by_sku(&query.sku).await?;
        let available = record.available();

        Ok(Availability {
            sku: query.sku,
            quantity: record.quantity(),
            reserved: record.reserved(),
            available,
            requested: query.quantity,
            sufficient: available >= query.quantity,
        })
    }
}
