// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Service
//!
//! Serves the inventory commands over NATS request/reply and consumes
//! inventory events from other services.
//!
//! Run with: cargo run --bin inventory-service
//!
//! Prerequisites:
//! 1. NATS server running (default: localhost:4222)
//! 2. JetStream enabled when `INVENTORY_STORE=nats-kv`

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use stock_ledger::{
    CommandRouter, InMemoryInventoryStore, InventoryRpcServer, InventoryStore, NatsClient,
    NatsKvInventoryStore, NatsStockEventPublisher, ServiceConfig, StockLedgerService,
    StorageBackend,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting inventory service");

    let config = ServiceConfig::from_env().context("Invalid service configuration")?;
    info!(
        servers = ?config.nats.servers,
        rpc_subject = %config.endpoints.rpc_subject,
        event_subject = %config.endpoints.event_subject,
        queue_group = %config.endpoints.queue_group,
        storage = ?config.storage,
        max_write_attempts = config.ledger.max_write_attempts,
        low_stock_threshold = ?config.ledger.low_stock_threshold,
        "Configuration loaded"
    );

    let client = NatsClient::new(config.nats.clone())
        .await
        .context("Failed to connect to NATS")?;

    let store: Arc<dyn InventoryStore> = match &config.storage {
        StorageBackend::Memory => {
            warn!("Using in-memory store, inventory is lost on restart");
            Arc::new(InMemoryInventoryStore::new())
        }
        StorageBackend::NatsKv { bucket } => Arc::new(
            NatsKvInventoryStore::open(client.inner().clone(), bucket)
                .await
                .with_context(|| format!("Failed to open KV bucket {bucket}"))?,
        ),
    };

    let publisher = Arc::new(NatsStockEventPublisher::new(client.clone()));
    let service = StockLedgerService::new(store, publisher).with_settings(config.ledger);
    let router = CommandRouter::new(Arc::new(service));
    let server = InventoryRpcServer::new(client, router, config.endpoints.clone());

    tokio::select! {
        result = server.run() => {
            result.context("Inventory server stopped")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("Inventory service stopped");
    Ok(())
}
