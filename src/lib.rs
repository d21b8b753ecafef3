//! Inventory stock ledger with reservation arbitration over NATS
//!
//! This crate tracks stock per SKU, arbitrates concurrent reservations
//! against it, and serves the operations as message-pattern RPC with a
//! uniform reply envelope.

pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod nats;
pub mod response;
pub mod router;
pub mod service;
pub mod store;
pub mod subjects;

// Re-export commonly used types
pub use commands::{InventoryCommand, InventoryEvent};
pub use config::{ServiceConfig, StorageBackend};
pub use domain::{InventoryId, InventoryRecord, InventoryView, Sku};
pub use errors::{ErrorKind, InfrastructureError, InfrastructureResult, InventoryError, InventoryResult};
pub use nats::{InventoryRpcServer, NatsClient, NatsConfig, NatsStockEventPublisher, RpcEndpoints};
pub use response::Reply;
pub use router::{CommandMessage, CommandRouter, EventMessage};
pub use service::{Clock, InventoryService, LedgerSettings, StockLedgerService, SystemClock};
pub use store::{InMemoryInventoryStore, InventoryStore, NatsKvInventoryStore};
