// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS JetStream key-value inventory store
//!
//! # Key Layout
//!
//! ```text
//! record.{id}        → JSON InventoryRecord   (revision = KV revision)
//! sku.{hex(sku)}     → id                     (uniqueness claim)
//! ```
//!
//! SKUs are hex-encoded because KV keys only allow `[-/_=.a-zA-Z0-9]`.
//! Record writes use the KV `update(key, value, revision)` compare-and-set,
//! so a stale revision is rejected by the server. SKU ownership is claimed
//! with `create`, which fails when the key already exists. A claim whose
//! record is gone, or no longer carries that SKU, is orphaned and gets taken
//! over with a revision-checked `update`.

use async_nats::connection::State;
use async_nats::jetstream::{self, kv};
use async_nats::Client;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::fmt;
use tracing::{debug, info, warn};

use super::{InventoryStore, StoreError, StoreResult, StoredRecord};
use crate::domain::{InventoryId, InventoryRecord, Sku};
use crate::errors::{InfrastructureError, InfrastructureResult};

const RECORD_PREFIX: &str = "record.";
const SKU_PREFIX: &str = "sku.";

fn record_key(id: InventoryId) -> String {
    format!("{RECORD_PREFIX}{id}")
}

fn sku_key(sku: &Sku) -> String {
    format!("{SKU_PREFIX}{}", hex::encode(sku.as_str()))
}

fn parse_claim(bytes: &[u8]) -> StoreResult<InventoryId> {
    std::str::from_utf8(bytes)
        .map_err(|e| StoreError::Serialization(e.to_string()))?
        .parse::<InventoryId>()
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Inventory store persisted in a JetStream KV bucket
pub struct NatsKvInventoryStore {
    client: Client,
    kv: kv::Store,
}

impl NatsKvInventoryStore {
    /// Open the bucket, creating it on first use
    pub async fn open(client: Client, bucket: &str) -> InfrastructureResult<Self> {
        let context = jetstream::new(client.clone());

        let kv = match context.get_key_value(bucket).await {
            Ok(kv) => {
                info!(bucket = %bucket, "Found existing inventory bucket");
                kv
            }
            Err(_) => {
                info!(bucket = %bucket, "Inventory bucket not found, creating");
                context
                    .create_key_value(kv::Config {
                        bucket: bucket.to_string(),
                        description: "Inventory stock ledger".to_string(),
                        ..Default::default()
                    })
                    .await
                    .map_err(|e| InfrastructureError::KeyValue(e.to_string()))?
            }
        };

        Ok(Self { client, kv })
    }

    /// Map a backend failure, distinguishing a lost connection
    fn classify(&self, err: impl fmt::Display) -> StoreError {
        match self.client.connection_state() {
            State::Connected => StoreError::Backend(err.to_string()),
            _ => StoreError::Unavailable(err.to_string()),
        }
    }

    fn encode(record: &InventoryRecord) -> StoreResult<Bytes> {
        serde_json::to_vec(record)
            .map(Bytes::from)
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    async fn read_record(&self, id: InventoryId) -> StoreResult<Option<StoredRecord>> {
        let key = record_key(id);
        let entry = self
            .kv
            .entry(key.as_str())
            .await
            .map_err(|e| self.classify(e))?;

        match entry {
            Some(entry) if matches!(entry.operation, kv::Operation::Put) => {
                let record: InventoryRecord = serde_json::from_slice(&entry.value)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(StoredRecord {
                    record,
                    revision: entry.revision,
                }))
            }
            _ => Ok(None),
        }
    }

    async fn resolve_sku(&self, sku: &Sku) -> StoreResult<Option<InventoryId>> {
        let key = sku_key(sku);
        let value = self
            .kv
            .get(key.as_str())
            .await
            .map_err(|e| self.classify(e))?;

        value.map(|bytes| parse_claim(&bytes)).transpose()
    }

    /// Claim `sku` for `id`; fails with `DuplicateSku` when a live record owns it
    async fn claim_sku(&self, sku: &Sku, id: InventoryId) -> StoreResult<()> {
        let key = sku_key(sku);
        let claim = Bytes::from(id.to_string());
        let err = match self.kv.create(key.as_str(), claim.clone()).await {
            Ok(_) => return Ok(()),
            Err(err) => err,
        };

        let Some(entry) = self
            .kv
            .entry(key.as_str())
            .await
            .map_err(|e| self.classify(e))?
        else {
            return Err(self.classify(err));
        };

        if matches!(entry.operation, kv::Operation::Put) {
            let owner = parse_claim(&entry.value)?;
            let live = self
                .read_record(owner)
                .await?
                .is_some_and(|stored| stored.record.sku() == sku);
            if live {
                return Err(StoreError::DuplicateSku(sku.to_string()));
            }
            warn!(sku = %sku, stale_owner = %owner, "Taking over orphaned SKU index entry");
        }

        // Losing this race means another writer claimed the SKU first
        match self.kv.update(key.as_str(), claim, entry.revision).await {
            Ok(_) => Ok(()),
            Err(err) => match self.classify(err) {
                StoreError::Backend(_) => Err(StoreError::DuplicateSku(sku.to_string())),
                other => Err(other),
            },
        }
    }

    async fn drop_sku_claim(&self, sku: &Sku) {
        let key = sku_key(sku);
        if let Err(err) = self.kv.delete(key.as_str()).await {
            warn!(sku = %sku, error = %err, "Failed to remove SKU index entry");
        }
    }
}

#[async_trait]
impl InventoryStore for NatsKvInventoryStore {
    async fn find_by_sku(&self, sku: &Sku) -> StoreResult<Option<StoredRecord>> {
        match self.resolve_sku(sku).await? {
            Some(id) => Ok(self
                .read_record(id)
                .await?
                .filter(|stored| stored.record.sku() == sku)),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: InventoryId) -> StoreResult<Option<StoredRecord>> {
        self.read_record(id).await
    }

    async fn insert(&self, record: InventoryRecord) -> StoreResult<StoredRecord> {
        let payload = Self::encode(&record)?;
        self.claim_sku(record.sku(), record.id()).await?;

        let key = record_key(record.id());
        match self.kv.create(key.as_str(), payload).await {
            Ok(revision) => {
                debug!(sku = %record.sku(), revision, "Inserted inventory record");
                Ok(StoredRecord { record, revision })
            }
            Err(err) => {
                self.drop_sku_claim(record.sku()).await;
                Err(self.classify(err))
            }
        }
    }

    async fn update_by_sku(
        &self,
        sku: &Sku,
        record: InventoryRecord,
        expected_revision: u64,
    ) -> StoreResult<StoredRecord> {
        let id = self
            .resolve_sku(sku)
            .await?
            .ok_or_else(|| StoreError::NotFound(sku.to_string()))?;
        self.update_by_id(id, record, expected_revision).await
    }

    async fn update_by_id(
        &self,
        id: InventoryId,
        record: InventoryRecord,
        expected_revision: u64,
    ) -> StoreResult<StoredRecord> {
        let current = self
            .read_record(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if current.revision != expected_revision {
            return Err(StoreError::RevisionMismatch {
                expected: expected_revision,
                actual: current.revision,
            });
        }

        let payload = Self::encode(&record)?;
        let old_sku = current.record.sku().clone();
        let sku_moved = record.sku() != &old_sku;
        if sku_moved {
            self.claim_sku(record.sku(), id).await?;
        }

        let key = record_key(id);
        match self.kv.update(key.as_str(), payload, expected_revision).await {
            Ok(revision) => {
                if sku_moved {
                    self.drop_sku_claim(&old_sku).await;
                }
                Ok(StoredRecord { record, revision })
            }
            Err(err) => {
                if sku_moved {
                    self.drop_sku_claim(record.sku()).await;
                }
                match self.read_record(id).await? {
                    Some(latest) if latest.revision != expected_revision => {
                        Err(StoreError::RevisionMismatch {
                            expected: expected_revision,
                            actual: latest.revision,
                        })
                    }
                    Some(_) => Err(self.classify(err)),
                    None => Err(StoreError::NotFound(id.to_string())),
                }
            }
        }
    }

    async fn delete_by_id(&self, id: InventoryId) -> StoreResult<InventoryRecord> {
        let current = self
            .read_record(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let key = record_key(id);
        self.kv
            .delete(key.as_str())
            .await
            .map_err(|e| self.classify(e))?;
        self.drop_sku_claim(current.record.sku()).await;

        Ok(current.record)
    }

    async fn list_all(&self) -> StoreResult<Vec<InventoryRecord>> {
        let keys = self.kv.keys().await.map_err(|e| self.classify(e))?;
        tokio::pin!(keys);

        let mut records = Vec::new();
        while let Some(key) = keys.next().await {
            let key = key.map_err(|e| self.classify(e))?;
            let Some(raw_id) = key.strip_prefix(RECORD_PREFIX) else {
                continue;
            };
            let id = raw_id
                .parse::<InventoryId>()
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            if let Some(stored) = self.read_record(id).await? {
                records.push(stored.record);
            }
        }

        records.sort_by_key(|r| r.id());
        Ok(records)
    }
}
