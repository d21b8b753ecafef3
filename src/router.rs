// Copyright (c) 2025 - Cowboy AI, Inc.
//! Command Router
//!
//! Stateless dispatch from a message name to an engine call.
//!
//! ```text
//! Request: { pattern, body } → parse → engine → Reply (success or error envelope)
//! Event:   { event, payload } → parse → engine → log, nothing is sent back
//! ```
//!
//! Request callers always get exactly one [`Reply`], including for unknown
//! patterns, malformed JSON and panics inside the engine. Event handling never
//! fails outward.

use chrono::SecondsFormat;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::commands::{InventoryCommand, InventoryEvent};
use crate::domain::{InventoryRecord, InventoryView};
use crate::errors::{InventoryError, InventoryResult};
use crate::response::{into_reply, log_failure, Reply, SuccessEnvelope};
use crate::service::{Clock, CreateOutcome, InventoryService, SystemClock};
use crate::subjects::{CommandPattern, EventName};

/// Request-mode envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandMessage {
    pub pattern: String,
    #[serde(default)]
    pub body: Value,
}

impl CommandMessage {
    pub fn new(pattern: CommandPattern, body: Value) -> Self {
        Self {
            pattern: pattern.as_str().to_string(),
            body,
        }
    }
}

/// Event-mode envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    pub event: String,
    #[serde(default)]
    pub payload: Value,
}

impl EventMessage {
    pub fn new(event: EventName, payload: Value) -> Self {
        Self {
            event: event.as_str().to_string(),
            payload,
        }
    }
}

/// Routes envelopes to an [`InventoryService`]
#[derive(Clone)]
pub struct CommandRouter {
    service: Arc<dyn InventoryService>,
    clock: Arc<dyn Clock>,
}

impl CommandRouter {
    pub fn new(service: Arc<dyn InventoryService>) -> Self {
        Self {
            service,
            clock: Arc::new(SystemClock),
        }
    }

    /// Clock used for error envelope timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Decode and handle a raw request payload
    pub async fn handle_raw_request(&self, payload: &[u8]) -> Reply {
        match serde_json::from_slice::<CommandMessage>(payload) {
            Ok(message) => self.handle_request(message).await,
            Err(err) => into_reply(
                Err(InventoryError::Validation {
                    message: "Malformed command envelope".to_string(),
                    details: Some(json!({ "reason": err.to_string() })),
                }),
                self.clock.now(),
            ),
        }
    }

    /// Decode and handle a raw event payload
    pub async fn handle_raw_event(&self, payload: &[u8]) {
        match serde_json::from_slice::<EventMessage>(payload) {
            Ok(message) => self.handle_event(message).await,
            Err(err) => warn!(error = %err, "Dropping malformed event envelope"),
        }
    }

    /// Handle a request-mode command, always producing a reply
    pub async fn handle_request(&self, message: CommandMessage) -> Reply {
        let pattern = message.pattern.clone();
        let started = Instant::now();
        debug!(pattern = %pattern, "Handling command");

        let result = AssertUnwindSafe(self.execute(message))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(InventoryError::internal(
                    "An unexpected error occurred",
                    panic_message(&*panic),
                ))
            });

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(pattern = %pattern, code = "OK", elapsed_ms, "Command handled"),
            Err(err) => info!(pattern = %pattern, code = %err.kind(), elapsed_ms, "Command failed"),
        }
        into_reply(result, self.clock.now())
    }

    /// Handle an event-mode message; failures are logged only
    pub async fn handle_event(&self, message: EventMessage) {
        let Some(name) = EventName::parse(&message.event) else {
            warn!(event = %message.event, "Ignoring unknown event");
            return;
        };

        let outcome = AssertUnwindSafe(self.apply_event(name, message.payload))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => debug!(event = %name, "Event handled"),
            Ok(Err(err)) => {
                warn!(event = %name, "Event handling failed");
                log_failure(&err);
            }
            Err(panic) => error!(
                event = %name,
                panic = %panic_message(&*panic),
                "Event handler panicked"
            ),
        }
    }

    async fn execute(&self, message: CommandMessage) -> InventoryResult<SuccessEnvelope> {
        let pattern = CommandPattern::parse(&message.pattern).ok_or_else(|| {
            InventoryError::Validation {
                message: format!("Unknown command pattern: {}", message.pattern),
                details: Some(json!({ "pattern": message.pattern })),
            }
        })?;

        let command = InventoryCommand::parse(pattern, message.body)?;
        self.dispatch(command).await
    }

    async fn dispatch(&self, command: InventoryCommand) -> InventoryResult<SuccessEnvelope> {
        let envelope = match command {
            InventoryCommand::Create(create) => match self.service.create(create).await? {
                CreateOutcome::Created(record) => {
                    SuccessEnvelope::new("Inventory created successfully", view(&record)?)
                }
                CreateOutcome::Merged(record) => {
                    SuccessEnvelope::new("Inventory updated (SKU already existed)", view(&record)?)
                }
            },
            InventoryCommand::FindAll => {
                let records = self.service.find_all().await?;
                SuccessEnvelope::new("Inventory items fetched successfully", listing(&records)?)
            }
            InventoryCommand::FindOne(lookup) => {
                let record = self.service.find_one(lookup).await?;
                SuccessEnvelope::new("Inventory found", view(&record)?)
            }
            InventoryCommand::FindBySku(sku) => {
                let record = self.service.find_by_sku(&sku).await?;
                SuccessEnvelope::new("Inventory found", view(&record)?)
            }
            InventoryCommand::Update(update) => {
                let record = self.service.update(update).await?;
                SuccessEnvelope::new("Inventory updated successfully", view(&record)?)
            }
            InventoryCommand::Remove(id) => {
                let record = self.service.remove(id).await?;
                SuccessEnvelope::new("Inventory deleted successfully", view(&record)?)
            }
            InventoryCommand::Reserve(movement) => {
                let record = self.service.reserve(movement).await?;
                SuccessEnvelope::new("Inventory reserved successfully", view(&record)?)
            }
            InventoryCommand::Release(movement) => {
                let record = self.service.release(movement).await?;
                SuccessEnvelope::new("Inventory released successfully", view(&record)?)
            }
            InventoryCommand::OutOfStock => {
                let records = self.service.out_of_stock().await?;
                SuccessEnvelope::new("Out of stock items fetched successfully", listing(&records)?)
            }
            InventoryCommand::CheckAvailability(query) => {
                let availability = self.service.check_availability(query).await?;
                SuccessEnvelope::new("Availability checked successfully", to_data(&availability)?)
            }
            InventoryCommand::Health => SuccessEnvelope::new(
                "Service is healthy",
                json!({
                    "status": "healthy",
                    "timestamp": self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true),
                }),
            ),
        };
        Ok(envelope)
    }

    async fn apply_event(&self, name: EventName, payload: Value) -> InventoryResult<()> {
        match InventoryEvent::parse(name, payload)? {
            InventoryEvent::Created(create) => {
                let outcome = self.service.create(create).await?;
                info!(
                    event = %name,
                    sku = %outcome.record().sku(),
                    merged = outcome.is_merged(),
                    "Applied external inventory creation"
                );
            }
            InventoryEvent::Reserved(movement) => info!(
                event = %name,
                sku = %movement.sku,
                quantity = movement.quantity,
                order_id = %movement.order_id,
                "Inventory reserved elsewhere"
            ),
            InventoryEvent::Released(movement) => info!(
                event = %name,
                sku = %movement.sku,
                quantity = movement.quantity,
                order_id = %movement.order_id,
                "Inventory released elsewhere"
            ),
        }
        Ok(())
    }
}

fn to_data<T: Serialize>(value: &T) -> InventoryResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| InventoryError::internal("Failed to serialize reply", e))
}

fn view(record: &InventoryRecord) -> InventoryResult<Value> {
    to_data(&record.view())
}

fn listing(records: &[InventoryRecord]) -> InventoryResult<Value> {
    let inventories: Vec<InventoryView> = records.iter().map(InventoryView::from).collect();
    Ok(json!({
        "count": inventories.len(),
        "inventories": to_data(&inventories)?,
    }))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
