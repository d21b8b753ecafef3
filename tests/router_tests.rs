// Copyright (c) 2025 - Cowboy AI, Inc.
//! Wire behavior of the command router
//!
//! Every request gets exactly one envelope; events never answer.

mod fixtures;

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use fixtures::{request, reserve_body, sku, FixedClock, RecordingPublisher, TestLedger};
use stock_ledger::store::{StoreError, StoreResult, StoredRecord};
use stock_ledger::subjects::{CommandPattern, EventName};
use stock_ledger::{
    CommandRouter, EventMessage, InventoryId, InventoryRecord, InventoryService, InventoryStore,
    Reply, Sku, StockLedgerService,
};

fn data(reply: &Reply) -> &Value {
    reply.data().expect("expected a success reply")
}

fn failure(reply: &Reply) -> (String, u16) {
    let error = reply.error().expect("expected an error reply");
    (error.code.clone(), error.status_code)
}

/// Scenario from the wire's point of view
#[tokio::test]
async fn test_reservation_lifecycle_over_router() {
    // Given a router over an empty ledger
    let ledger = TestLedger::new();
    let router = ledger.router();

    // When A-1 is created with 10 units
    let reply = request(&router, CommandPattern::Create, json!({ "sku": "A-1", "quantity": 10 })).await;
    assert!(reply.is_success());

    // And O1 reserves 7
    let reply = request(&router, CommandPattern::Reserve, reserve_body("A-1", 7, "O1")).await;
    let Reply::Success(success) = &reply else {
        panic!("reserve failed: {reply:?}");
    };
    assert_eq!(success.message, "Inventory reserved successfully");
    assert_eq!(success.data["reserved"], 7);
    assert_eq!(success.data["available"], 3);

    // Then O2 cannot take 5
    let reply = request(&router, CommandPattern::Reserve, reserve_body("A-1", 5, "O2")).await;
    assert_eq!(failure(&reply), ("CONFLICT".to_string(), 409));

    // And releasing O1 frees everything
    let reply = request(&router, CommandPattern::Release, reserve_body("A-1", 7, "O1")).await;
    assert_eq!(data(&reply)["reserved"], 0);
}

#[tokio::test]
async fn test_merge_reports_existing_sku() {
    let ledger = TestLedger::new();
    let router = ledger.router();

    request(&router, CommandPattern::Create, json!({ "sku": "A-1", "quantity": 5 })).await;
    let reply = request(&router, CommandPattern::Create, json!({ "sku": "A-1", "quantity": 3 })).await;

    let Reply::Success(success) = reply else {
        panic!("merge failed");
    };
    assert_eq!(success.message, "Inventory updated (SKU already existed)");
    assert_eq!(success.data["quantity"], 8);
}

#[tokio::test]
async fn test_record_view_shape() {
    let ledger = TestLedger::new();
    let router = ledger.router();

    let reply = request(&router, CommandPattern::Create, json!({ "sku": "A-1", "quantity": 4, "reserved": 1 })).await;
    let view = data(&reply);

    assert!(view["id"].is_string());
    assert_eq!(view["sku"], "A-1");
    assert_eq!(view["quantity"], 4);
    assert_eq!(view["reserved"], 1);
    assert_eq!(view["available"], 3);
    assert!(view["createdAt"].is_string());
    assert!(view["updatedAt"].is_string());
}

#[tokio::test]
async fn test_listings_carry_count() {
    let ledger = TestLedger::new();
    let router = ledger.router();
    request(&router, CommandPattern::Create, json!({ "sku": "A-1", "quantity": 0 })).await;
    request(&router, CommandPattern::Create, json!({ "sku": "B-1", "quantity": 2 })).await;

    let all = request(&router, CommandPattern::FindAll, Value::Null).await;
    assert_eq!(data(&all)["count"], 2);
    assert_eq!(data(&all)["inventories"].as_array().unwrap().len(), 2);

    let empty = request(&router, CommandPattern::OutOfStock, json!({})).await;
    assert_eq!(data(&empty)["count"], 1);
    assert_eq!(data(&empty)["inventories"][0]["sku"], "A-1");
}

#[tokio::test]
async fn test_not_found_envelope() {
    let ledger = TestLedger::new();
    let router = ledger.router();

    let reply = request(&router, CommandPattern::FindBySku, json!({ "sku": "GHOST" })).await;

    let Reply::Failure(envelope) = reply else {
        panic!("expected failure");
    };
    assert!(!envelope.success);
    assert_eq!(envelope.error.code, "RESOURCE_NOT_FOUND");
    assert_eq!(envelope.error.status_code, 404);
    assert_eq!(envelope.error.details.as_ref().unwrap()["resource"], "Inventory");
    assert_eq!(envelope.error.details.as_ref().unwrap()["identifier"], "GHOST");
    assert_eq!(envelope.timestamp, "2026-01-19T12:00:00.000Z");
}

#[tokio::test]
async fn test_schema_failures_are_validation_errors() {
    let ledger = TestLedger::new();
    let router = ledger.router();

    let cases = [
        (CommandPattern::Create, json!({ "quantity": 1 })),
        (CommandPattern::Create, json!({ "sku": "A-1", "quantity": -1 })),
        (CommandPattern::Reserve, json!({ "sku": "A-1", "quantity": 0, "orderId": "O1" })),
        (CommandPattern::Release, json!({ "sku": "A-1", "quantity": 1 })),
        (CommandPattern::Update, json!({ "quantity": 1 })),
        (CommandPattern::Remove, json!({ "id": "not-a-uuid" })),
        (CommandPattern::FindOne, json!({})),
        (CommandPattern::CheckAvailability, json!({ "sku": "A-1" })),
    ];

    for (pattern, body) in cases {
        let reply = request(&router, pattern, body.clone()).await;
        assert_eq!(
            failure(&reply),
            ("VALIDATION_ERROR".to_string(), 400),
            "{pattern} with {body}"
        );
    }

    // Nothing reached the ledger
    assert!(ledger.service.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_pattern_and_malformed_envelope() {
    let ledger = TestLedger::new();
    let router = ledger.router();

    let reply = router
        .handle_raw_request(br#"{ "pattern": "inventory/teleport", "body": {} }"#)
        .await;
    assert_eq!(failure(&reply), ("VALIDATION_ERROR".to_string(), 400));
    assert_eq!(
        reply.error().unwrap().details.as_ref().unwrap()["pattern"],
        "inventory/teleport"
    );

    let reply = router.handle_raw_request(b"[1, 2, 3]").await;
    assert_eq!(failure(&reply), ("VALIDATION_ERROR".to_string(), 400));
}

#[tokio::test]
async fn test_check_availability_reply() {
    let ledger = TestLedger::new();
    let router = ledger.router();
    request(&router, CommandPattern::Create, json!({ "sku": "A-1", "quantity": 10 })).await;
    request(&router, CommandPattern::Reserve, reserve_body("A-1", 4, "O1")).await;

    let reply = request(
        &router,
        CommandPattern::CheckAvailability,
        json!({ "sku": "A-1", "quantity": 6 }),
    )
    .await;

    assert_eq!(
        data(&reply),
        &json!({
            "sku": "A-1",
            "quantity": 10,
            "reserved": 4,
            "available": 6,
            "requested": 6,
            "sufficient": true,
        })
    );
}

#[tokio::test]
async fn test_remove_over_router() {
    let ledger = TestLedger::new();
    let router = ledger.router();
    let created = request(&router, CommandPattern::Create, json!({ "sku": "A-1", "quantity": 1 })).await;
    let id = data(&created)["id"].clone();

    let reply = request(&router, CommandPattern::Remove, json!({ "id": id })).await;
    assert!(reply.is_success());
    assert_eq!(ledger.publisher.sent().len(), 1);

    let reply = request(&router, CommandPattern::Remove, json!({ "id": id })).await;
    assert_eq!(failure(&reply), ("RESOURCE_NOT_FOUND".to_string(), 404));
}

/// Externally created inventory merges through the event path
#[tokio::test]
async fn test_created_event_merges() {
    let ledger = TestLedger::new();
    let router = ledger.router();

    router
        .handle_event(EventMessage::new(
            EventName::InventoryCreated,
            json!({ "sku": "A-1", "quantity": 2 }),
        ))
        .await;
    router
        .handle_event(EventMessage::new(
            EventName::InventoryCreated,
            json!({ "sku": "A-1", "quantity": 3 }),
        ))
        .await;

    let record = ledger.service.find_by_sku(&sku("A-1")).await.unwrap();
    assert_eq!(record.quantity(), 5);
}

/// Event failures are swallowed and never change state
#[tokio::test]
async fn test_event_failures_are_contained() {
    let ledger = TestLedger::new();
    let router = ledger.router();

    // Invalid payload
    router
        .handle_event(EventMessage::new(EventName::InventoryCreated, json!({ "sku": "" })))
        .await;
    // Unknown event name
    router
        .handle_event(EventMessage {
            event: "inventory.vanished".to_string(),
            payload: json!({ "sku": "A-1" }),
        })
        .await;
    // Malformed envelope
    router.handle_raw_event(b"not json").await;
    // Audit-only events never mutate
    router
        .handle_event(EventMessage::new(
            EventName::InventoryReserved,
            json!({ "sku": "A-1", "quantity": 1, "orderId": "O1" }),
        ))
        .await;

    assert!(ledger.service.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_health_reply() {
    let ledger = TestLedger::new();
    let router = ledger.router();

    let reply = request(&router, CommandPattern::Health, Value::Null).await;

    assert_eq!(
        data(&reply),
        &json!({ "status": "healthy", "timestamp": "2026-01-19T12:00:00.000Z" })
    );
}

/// Store whose every call fails the same way
struct BrokenStore(StoreError);

#[async_trait]
impl InventoryStore for BrokenStore {
    async fn find_by_sku(&self, _: &Sku) -> StoreResult<Option<StoredRecord>> {
        Err(self.0.clone())
    }
    async fn find_by_id(&self, _: InventoryId) -> StoreResult<Option<StoredRecord>> {
        Err(self.0.clone())
    }
    async fn insert(&self, _: InventoryRecord) -> StoreResult<StoredRecord> {
        Err(self.0.clone())
    }
    async fn update_by_sku(&self, _: &Sku, _: InventoryRecord, _: u64) -> StoreResult<StoredRecord> {
        Err(self.0.clone())
    }
    async fn update_by_id(
        &self,
        _: InventoryId,
        _: InventoryRecord,
        _: u64,
    ) -> StoreResult<StoredRecord> {
        Err(self.0.clone())
    }
    async fn delete_by_id(&self, _: InventoryId) -> StoreResult<InventoryRecord> {
        Err(self.0.clone())
    }
    async fn list_all(&self) -> StoreResult<Vec<InventoryRecord>> {
        Err(self.0.clone())
    }
}

fn router_over(store: BrokenStore) -> CommandRouter {
    let service = StockLedgerService::new(Arc::new(store), Arc::new(RecordingPublisher::default()));
    CommandRouter::new(Arc::new(service)).with_clock(Arc::new(FixedClock::default()))
}

#[tokio::test]
async fn test_backend_failure_envelope() {
    let router = router_over(BrokenStore(StoreError::Backend("disk on fire".to_string())));

    let reply = request(&router, CommandPattern::Reserve, reserve_body("A-1", 1, "O1")).await;

    let Reply::Failure(envelope) = reply else {
        panic!("expected failure");
    };
    assert_eq!(envelope.error.code, "INTERNAL_SERVER_ERROR");
    assert_eq!(envelope.error.status_code, 500);
    assert_eq!(
        envelope.error.details.as_ref().unwrap()["originalError"],
        "Storage backend error: disk on fire"
    );
    assert_eq!(envelope.timestamp, "2026-01-19T12:00:00.000Z");
}

#[tokio::test]
async fn test_unreachable_store_envelope() {
    let router = router_over(BrokenStore(StoreError::Unavailable(
        "connection refused".to_string(),
    )));

    let reply = request(&router, CommandPattern::FindAll, Value::Null).await;

    let error = reply.error().expect("expected an error reply");
    assert_eq!(error.code, "SERVICE_UNAVAILABLE");
    assert_eq!(error.status_code, 503);
    assert_eq!(error.details.as_ref().unwrap()["service"], "storage");
}
