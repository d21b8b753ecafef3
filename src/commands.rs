// Copyright (c) 2025 - Cowboy AI, Inc.
//! Typed Commands and Inbound Events
//!
//! Each pattern has exactly one body schema. Bodies are parsed and validated
//! once, here, before the operations engine sees them:
//!
//! ```text
//! { pattern, body: JSON } → InventoryCommand::parse → typed command → engine
//! ```
//!
//! A body that does not fit its schema is a `ValidationError`; the engine is
//! never invoked for it.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::{InventoryId, InventoryPatch, Sku};
use crate::errors::{InventoryError, InventoryResult};
use crate::subjects::{CommandPattern, EventName};

/// Create a record, or restock an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateInventory {
    pub sku: Sku,
    pub quantity: u64,
    /// Only honored when a new record is inserted
    pub reserved: Option<u64>,
}

/// How `find-one` locates a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryLookup {
    Id(InventoryId),
    Sku(Sku),
}

/// Partial overwrite of a record addressed by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInventory {
    pub id: InventoryId,
    pub patch: InventoryPatch,
}

/// Reservation or release of stock for an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockMovement {
    pub sku: Sku,
    pub quantity: u64,
    pub order_id: String,
}

/// Can `quantity` units of `sku` be reserved right now?
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub sku: Sku,
    pub quantity: u64,
}

/// A validated request-mode command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryCommand {
    Create(CreateInventory),
    FindAll,
    FindOne(InventoryLookup),
    Update(UpdateInventory),
    Remove(InventoryId),
    FindBySku(Sku),
    Reserve(StockMovement),
    Release(StockMovement),
    OutOfStock,
    CheckAvailability(AvailabilityQuery),
    Health,
}

impl InventoryCommand {
    /// Parse a command body against the schema of `pattern`
    pub fn parse(pattern: CommandPattern, body: Value) -> InventoryResult<Self> {
        let command = match pattern {
            CommandPattern::Create => InventoryCommand::Create(parse_body::<CreateBody>(body)?.validate()?),
            CommandPattern::FindAll => InventoryCommand::FindAll,
            CommandPattern::FindOne => InventoryCommand::FindOne(parse_body::<FindOneBody>(body)?.validate()?),
            CommandPattern::Update => InventoryCommand::Update(parse_body::<UpdateBody>(body)?.validate()?),
            CommandPattern::Remove => {
                let body = parse_body::<IdBody>(body)?;
                InventoryCommand::Remove(required_id(body.id)?)
            }
            CommandPattern::FindBySku => {
                let body = parse_body::<SkuBody>(body)?;
                InventoryCommand::FindBySku(required_sku(body.sku)?)
            }
            CommandPattern::Reserve => InventoryCommand::Reserve(parse_body::<MovementBody>(body)?.validate()?),
            CommandPattern::Release => InventoryCommand::Release(parse_body::<MovementBody>(body)?.validate()?),
            CommandPattern::OutOfStock => InventoryCommand::OutOfStock,
            CommandPattern::Health => InventoryCommand::Health,
            CommandPattern::CheckAvailability => {
                let body = parse_body::<AvailabilityBody>(body)?;
                InventoryCommand::CheckAvailability(AvailabilityQuery {
                    sku: required_sku(body.sku)?,
                    quantity: required_quantity(body.quantity)?,
                })
            }
        };
        Ok(command)
    }
}

/// A validated fire-and-forget event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    /// Record created elsewhere; merged like a create
    Created(CreateInventory),
    /// Audit notice of a reservation made elsewhere
    Reserved(StockMovement),
    /// Audit notice of a release made elsewhere
    Released(StockMovement),
}

impl InventoryEvent {
    pub fn parse(name: EventName, payload: Value) -> InventoryResult<Self> {
        let event = match name {
            EventName::InventoryCreated => {
                InventoryEvent::Created(parse_body::<CreateBody>(payload)?.validate()?)
            }
            EventName::InventoryReserved => {
                InventoryEvent::Reserved(parse_body::<MovementBody>(payload)?.validate()?)
            }
            EventName::InventoryReleased => {
                InventoryEvent::Released(parse_body::<MovementBody>(payload)?.validate()?)
            }
        };
        Ok(event)
    }
}

fn parse_body<T: DeserializeOwned>(body: Value) -> InventoryResult<T> {
    serde_json::from_value(body).map_err(|e| InventoryError::Validation {
        message: "Invalid request body".to_string(),
        details: Some(json!({ "reason": e.to_string() })),
    })
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required_sku(sku: Option<String>) -> InventoryResult<Sku> {
    let sku = present(sku).ok_or_else(|| InventoryError::invalid_field("sku", "SKU is required"))?;
    Ok(Sku::new(sku)?)
}

fn required_id(id: Option<String>) -> InventoryResult<InventoryId> {
    let id = present(id).ok_or_else(|| InventoryError::invalid_field("id", "ID is required"))?;
    id.parse()
        .map_err(|_| InventoryError::invalid_field("id", format!("ID {id} is not a valid identifier")))
}

fn required_quantity(quantity: Option<u64>) -> InventoryResult<u64> {
    quantity.ok_or_else(|| InventoryError::invalid_field("quantity", "Quantity is required"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBody {
    sku: Option<String>,
    quantity: Option<u64>,
    #[serde(default)]
    reserved: Option<u64>,
}

impl CreateBody {
    fn validate(self) -> InventoryResult<CreateInventory> {
        Ok(CreateInventory {
            sku: required_sku(self.sku)?,
            quantity: required_quantity(self.quantity)?,
            reserved: self.reserved,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FindOneBody {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    sku: Option<String>,
}

impl FindOneBody {
    fn validate(self) -> InventoryResult<InventoryLookup> {
        match (present(self.id), present(self.sku)) {
            (Some(id), None) => Ok(InventoryLookup::Id(required_id(Some(id))?)),
            (None, Some(sku)) => Ok(InventoryLookup::Sku(required_sku(Some(sku))?)),
            (Some(_), Some(_)) => Err(InventoryError::Validation {
                message: "Provide either ID or SKU, not both".to_string(),
                details: Some(json!({ "fields": ["id", "sku"] })),
            }),
            (None, None) => Err(InventoryError::Validation {
                message: "ID or SKU is required".to_string(),
                details: Some(json!({ "fields": ["id", "sku"] })),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBody {
    id: Option<String>,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    quantity: Option<u64>,
    #[serde(default)]
    reserved: Option<u64>,
}

impl UpdateBody {
    fn validate(self) -> InventoryResult<UpdateInventory> {
        let id = required_id(self.id)?;
        let sku = match self.sku {
            Some(sku) => Some(Sku::new(sku)?),
            None => None,
        };
        Ok(UpdateInventory {
            id,
            patch: InventoryPatch {
                sku,
                quantity: self.quantity,
                reserved: self.reserved,
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct IdBody {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SkuBody {
    sku: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovementBody {
    sku: Option<String>,
    quantity: Option<u64>,
    order_id: Option<String>,
}

impl MovementBody {
    fn validate(self) -> InventoryResult<StockMovement> {
        let sku = required_sku(self.sku)?;
        let quantity = required_quantity(self.quantity)?;
        if quantity == 0 {
            return Err(InventoryError::invalid_field(
                "quantity",
                "Quantity must be at least 1",
            ));
        }
        let order_id = present(self.order_id)
            .ok_or_else(|| InventoryError::invalid_field("orderId", "Order ID is required"))?;

        Ok(StockMovement {
            sku,
            quantity,
            order_id: order_id.trim().to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct AvailabilityBody {
    sku: Option<String>,
    quantity: Option<u64>,
}
