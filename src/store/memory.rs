// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory inventory store
//!
//! Intended for tests and local development. A single lock guards the records
//! and the SKU index so both always move together.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{InventoryStore, RecordPredicate, StoreError, StoreResult, StoredRecord};
use crate::domain::{InventoryId, InventoryRecord, Sku};

#[derive(Debug, Default)]
struct MemoryState {
    records: HashMap<InventoryId, StoredRecord>,
    sku_index: HashMap<Sku, InventoryId>,
}

impl MemoryState {
    fn replace(
        &mut self,
        id: InventoryId,
        record: InventoryRecord,
        expected_revision: u64,
    ) -> StoreResult<StoredRecord> {
        let current = self
            .records
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if current.revision != expected_revision {
            return Err(StoreError::RevisionMismatch {
                expected: expected_revision,
                actual: current.revision,
            });
        }

        let old_sku = current.record.sku().clone();
        let new_sku = record.sku().clone();
        if new_sku != old_sku {
            if let Some(owner) = self.sku_index.get(&new_sku) {
                if *owner != id {
                    return Err(StoreError::DuplicateSku(new_sku.to_string()));
                }
            }
            self.sku_index.remove(&old_sku);
            self.sku_index.insert(new_sku, id);
        }

        let stored = StoredRecord {
            record,
            revision: expected_revision + 1,
        };
        self.records.insert(id, stored.clone());
        Ok(stored)
    }
}

/// Inventory store held entirely in process memory
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn find_by_sku(&self, sku: &Sku) -> StoreResult<Option<StoredRecord>> {
        let state = self.state.read().await;
        Ok(state
            .sku_index
            .get(sku)
            .and_then(|id| state.records.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: InventoryId) -> StoreResult<Option<StoredRecord>> {
        Ok(self.state.read().await.records.get(&id).cloned())
    }

    async fn insert(&self, record: InventoryRecord) -> StoreResult<StoredRecord> {
        let mut state = self.state.write().await;

        if state.sku_index.contains_key(record.sku()) {
            return Err(StoreError::DuplicateSku(record.sku().to_string()));
        }

        let id = record.id();
        let stored = StoredRecord {
            record,
            revision: 1,
        };
        state.sku_index.insert(stored.record.sku().clone(), id);
        state.records.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_by_sku(
        &self,
        sku: &Sku,
        record: InventoryRecord,
        expected_revision: u64,
    ) -> StoreResult<StoredRecord> {
        let mut state = self.state.write().await;
        let id = *state
            .sku_index
            .get(sku)
            .ok_or_else(|| StoreError::NotFound(sku.to_string()))?;
        state.replace(id, record, expected_revision)
    }

    async fn update_by_id(
        &self,
        id: InventoryId,
        record: InventoryRecord,
        expected_revision: u64,
    ) -> StoreResult<StoredRecord> {
        self.state.write().await.replace(id, record, expected_revision)
    }

    async fn delete_by_id(&self, id: InventoryId) -> StoreResult<InventoryRecord> {
        let mut state = self.state.write().await;
        let removed = state
            .records
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        state.sku_index.remove(removed.record.sku());
        Ok(removed.record)
    }

    async fn list_all(&self) -> StoreResult<Vec<InventoryRecord>> {
        let state = self.state.read().await;
        let mut records: Vec<InventoryRecord> =
            state.records.values().map(|s| s.record.clone()).collect();
        records.sort_by_key(|r| r.id());
        Ok(records)
    }

    async fn list_where(&self, predicate: RecordPredicate<'_>) -> StoreResult<Vec<InventoryRecord>> {
        let state = self.state.read().await;
        let mut records: Vec<InventoryRecord> = state
            .records
            .values()
            .filter(|s| predicate(&s.record))
            .map(|s| s.record.clone())
            .collect();
        records.sort_by_key(|r| r.id());
        Ok(records)
    }
}
