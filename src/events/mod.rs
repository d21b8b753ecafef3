// Copyright (c) 2025 - Cowboy AI, Inc.
//! Outbound Stock Notifications
//!
//! One-way messages the service emits to other contexts. Delivery is
//! fire-and-forget: the engine logs a failed publish and carries on, no
//! acknowledgment is awaited from the receiving side.
//!
//! # Notifications
//!
//! - [`ProductDeactivation`] on `product.deactivate` after a record is deleted
//! - [`LowStock`] on `inventory.low-stock` after a reservation leaves
//!   availability at or below the configured threshold

pub mod notification;

pub use notification::{LowStock, ProductDeactivation, StockEventPublisher, StockNotification};
