// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Store Abstraction
//!
//! The storage collaborator the operations engine runs against.
//!
//! # Architecture
//!
//! ```text
//! Engine → read (record, revision) → pure ledger transition
//!        → write(record, expected_revision) → Ok | RevisionMismatch → re-read
//! ```
//!
//! # Store Requirements
//!
//! 1. **Unique SKU**: at most one record per SKU; `insert` of a taken SKU fails
//! 2. **Revisioned writes**: updates succeed only against the expected revision,
//!    which turns every read-modify-write into an atomic conditional update
//! 3. **Distinct failures**: "not found", "duplicate", "stale revision",
//!    "unavailable" and "backend failure" are separate variants so the engine
//!    can classify them

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{InventoryId, InventoryRecord, Sku};

pub mod memory;
pub mod nats_kv;

pub use memory::InMemoryInventoryStore;
pub use nats_kv::NatsKvInventoryStore;

/// Storage failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No record under the given key
    #[error("Record not found: {0}")]
    NotFound(String),

    /// SKU already belongs to another record
    #[error("Duplicate SKU: {0}")]
    DuplicateSku(String),

    /// Record changed since it was read
    #[error("Revision mismatch: expected {expected}, found {actual}")]
    RevisionMismatch { expected: u64, actual: u64 },

    /// Backend cannot be reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Backend reported a failure
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Stored bytes could not be (de)serialized
    #[error("Storage serialization error: {0}")]
    Serialization(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A record together with the storage revision it was read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub record: InventoryRecord,
    pub revision: u64,
}

/// Predicate used by [`InventoryStore::list_where`]
pub type RecordPredicate<'a> = &'a (dyn Fn(&InventoryRecord) -> bool + Send + Sync);

/// Persistent storage for inventory records
///
/// Implementations must keep the SKU index consistent with the records and
/// reject writes whose expected revision is stale.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Look a record up by its SKU
    async fn find_by_sku(&self, sku: &Sku) -> StoreResult<Option<StoredRecord>>;

    /// Look a record up by its identifier
    async fn find_by_id(&self, id: InventoryId) -> StoreResult<Option<StoredRecord>>;

    /// Insert a new record
    ///
    /// # Errors
    ///
    /// - `DuplicateSku` if the SKU already has a record
    async fn insert(&self, record: InventoryRecord) -> StoreResult<StoredRecord>;

    /// Replace the record currently held under `sku`
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record has this SKU
    /// - `RevisionMismatch` if the record moved past `expected_revision`
    async fn update_by_sku(
        &self,
        sku: &Sku,
        record: InventoryRecord,
        expected_revision: u64,
    ) -> StoreResult<StoredRecord>;

    /// Replace the record with identifier `id`
    ///
    /// The replacement may carry a different SKU; the index follows it.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record has this id
    /// - `DuplicateSku` if the new SKU belongs to another record
    /// - `RevisionMismatch` if the record moved past `expected_revision`
    async fn update_by_id(
        &self,
        id: InventoryId,
        record: InventoryRecord,
        expected_revision: u64,
    ) -> StoreResult<StoredRecord>;

    /// Remove a record, returning what was removed
    async fn delete_by_id(&self, id: InventoryId) -> StoreResult<InventoryRecord>;

    /// Every record
    async fn list_all(&self) -> StoreResult<Vec<InventoryRecord>>;

    /// Every record matching `predicate`
    async fn list_where(&self, predicate: RecordPredicate<'_>) -> StoreResult<Vec<InventoryRecord>> {
        let records = self.list_all().await?;
        Ok(records.into_iter().filter(|r| predicate(r)).collect())
    }
}
