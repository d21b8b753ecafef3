// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Reservation Arithmetic
//!
//! Arbitrary sequences of restock, reserve and release are applied to one
//! record. Rejected steps must leave the record untouched; accepted steps
//! must keep `reserved <= quantity`.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use std::sync::Arc;

use stock_ledger::commands::CreateInventory;
use stock_ledger::domain::InventoryRecord;
use stock_ledger::errors::InfrastructureResult;
use stock_ledger::events::{StockEventPublisher, StockNotification};
use stock_ledger::{InMemoryInventoryStore, InventoryService, Sku, StockLedgerService};

// ============================================================================
// Strategies
// ============================================================================

#[derive(Debug, Clone)]
enum Step {
    Restock(u64),
    Reserve(u64),
    Release(u64),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0u64..50).prop_map(Step::Restock),
        (0u64..60).prop_map(Step::Reserve),
        (0u64..60).prop_map(Step::Release),
    ]
}

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 19, 12, 0, 0).unwrap()
}

fn sku() -> Sku {
    Sku::new("PROP-1").unwrap()
}

struct DiscardingPublisher;

#[async_trait::async_trait]
impl StockEventPublisher for DiscardingPublisher {
    async fn publish(&self, _notification: &StockNotification) -> InfrastructureResult<()> {
        Ok(())
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// reserved never exceeds quantity, whatever the sequence
    #[test]
    fn prop_reserved_never_exceeds_quantity(
        initial in 0u64..100,
        steps in prop::collection::vec(step_strategy(), 0..40),
    ) {
        let mut record = InventoryRecord::new(sku(), initial, 0, at()).unwrap();

        for step in steps {
            let before = record.clone();
            let result = match step {
                Step::Restock(n) => record.restock(n, at()),
                Step::Reserve(n) => record.reserve(n, at()),
                Step::Release(n) => record.release(n, at()),
            };

            match result {
                Ok(next) => record = next,
                Err(_) => prop_assert_eq!(&record, &before),
            }

            prop_assert!(record.reserved() <= record.quantity());
            prop_assert_eq!(record.available(), record.quantity() - record.reserved());
        }
    }

    /// A reservation succeeds exactly when enough stock is available
    #[test]
    fn prop_reserve_succeeds_iff_available(
        quantity in 0u64..100,
        reserved_ratio in 0.0f64..=1.0,
        requested in 1u64..120,
    ) {
        let reserved = (quantity as f64 * reserved_ratio) as u64;
        let record = InventoryRecord::new(sku(), quantity, reserved, at()).unwrap();

        let result = record.reserve(requested, at());
        prop_assert_eq!(result.is_ok(), requested <= quantity - reserved);
        if let Ok(next) = result {
            prop_assert_eq!(next.reserved(), reserved + requested);
            prop_assert_eq!(next.quantity(), quantity);
        }
    }

    /// Reserve followed by release of the same amount is the identity on stock levels
    #[test]
    fn prop_release_undoes_reserve(quantity in 1u64..100, requested in 1u64..100) {
        prop_assume!(requested <= quantity);
        let record = InventoryRecord::new(sku(), quantity, 0, at()).unwrap();

        let released = record
            .reserve(requested, at())
            .and_then(|r| r.release(requested, at()))
            .unwrap();

        prop_assert_eq!(released.quantity(), record.quantity());
        prop_assert_eq!(released.reserved(), record.reserved());
    }

    /// Out-of-stock selection is exactly `quantity == 0 || quantity <= reserved`
    #[test]
    fn prop_out_of_stock_selection(
        levels in prop::collection::vec((0u64..10, 0u64..=100), 1..12),
    ) {
        tokio_test::block_on(async {
            let service = StockLedgerService::new(
                Arc::new(InMemoryInventoryStore::new()),
                Arc::new(DiscardingPublisher),
            );

            let mut expected = Vec::new();
            for (index, (quantity, percent)) in levels.iter().enumerate() {
                let reserved = quantity * percent / 100;
                let sku = Sku::new(format!("SKU-{index}")).unwrap();
                service
                    .create(CreateInventory {
                        sku: sku.clone(),
                        quantity: *quantity,
                        reserved: Some(reserved),
                    })
                    .await
                    .unwrap();
                if *quantity == 0 || *quantity <= reserved {
                    expected.push(sku);
                }
            }

            let mut selected: Vec<Sku> = service
                .out_of_stock()
                .await
                .unwrap()
                .into_iter()
                .map(|r| r.sku().clone())
                .collect();
            selected.sort();
            expected.sort();

            prop_assert_eq!(selected, expected);
            Ok(())
        })?;
    }
}
