// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS transport for the inventory service
//!
//! ```text
//! inventory.rpc    (queue group) → CommandRouter::handle_raw_request → msg.reply
//! inventory.events (queue group) → CommandRouter::handle_raw_event
//! StockNotification              → publish on its own subject
//! ```
//!
//! Every inbound message is handled on its own task, so a slow command never
//! holds up the subscription.

use async_nats::{Client, ConnectOptions, Message, Subscriber};
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::events::{StockEventPublisher, StockNotification};
use crate::router::CommandRouter;
use crate::subjects;

/// Configuration for NATS connection
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "inventory-service".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// NATS client wrapper
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Connect with the given configuration
    pub async fn new(config: NatsConfig) -> InfrastructureResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| InfrastructureError::NatsConnection(e.to_string()))?;

        info!(servers = ?config.servers, name = %config.name, "Connected to NATS");

        Ok(Self { client })
    }

    /// Publish a JSON message to a subject
    pub async fn publish<T>(&self, subject: &str, message: &T) -> InfrastructureResult<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_vec(message)?;
        self.publish_bytes(subject, payload).await
    }

    /// Publish an already encoded payload
    pub async fn publish_bytes(&self, subject: &str, payload: Vec<u8>) -> InfrastructureResult<()> {
        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| InfrastructureError::NatsPublish(e.to_string()))?;

        debug!(subject = %subject, "Published message");
        Ok(())
    }

    /// Join a queue group on a subject
    pub async fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> InfrastructureResult<Subscriber> {
        let subscriber = self
            .client
            .queue_subscribe(subject.to_string(), queue_group.to_string())
            .await
            .map_err(|e| InfrastructureError::NatsSubscribe(e.to_string()))?;

        info!(subject = %subject, queue_group = %queue_group, "Subscribed to subject");
        Ok(subscriber)
    }

    /// Request-reply pattern
    pub async fn request<T, R>(&self, subject: &str, request: &T) -> InfrastructureResult<R>
    where
        T: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let payload = serde_json::to_vec(request)?;

        let response = self
            .client
            .request(subject.to_string(), payload.into())
            .await
            .map_err(|e| InfrastructureError::NatsPublish(e.to_string()))?;

        let result: R = serde_json::from_slice(&response.payload)
            .map_err(|e| InfrastructureError::Deserialization(e.to_string()))?;

        Ok(result)
    }

    /// Get the underlying NATS client for advanced operations
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Publishes stock notifications as plain JSON on their subjects
#[derive(Clone)]
pub struct NatsStockEventPublisher {
    client: NatsClient,
}

impl NatsStockEventPublisher {
    pub fn new(client: NatsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StockEventPublisher for NatsStockEventPublisher {
    async fn publish(&self, notification: &StockNotification) -> InfrastructureResult<()> {
        let payload = notification.to_payload()?;
        self.client
            .publish_bytes(notification.subject(), payload)
            .await
    }
}

/// Subjects the RPC server listens on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcEndpoints {
    pub rpc_subject: String,
    pub event_subject: String,
    pub queue_group: String,
}

impl Default for RpcEndpoints {
    fn default() -> Self {
        Self {
            rpc_subject: subjects::DEFAULT_RPC_SUBJECT.to_string(),
            event_subject: subjects::DEFAULT_EVENT_SUBJECT.to_string(),
            queue_group: subjects::DEFAULT_QUEUE_GROUP.to_string(),
        }
    }
}

/// Serves commands and events from NATS through a [`CommandRouter`]
pub struct InventoryRpcServer {
    client: NatsClient,
    router: CommandRouter,
    endpoints: RpcEndpoints,
}

impl InventoryRpcServer {
    pub fn new(client: NatsClient, router: CommandRouter, endpoints: RpcEndpoints) -> Self {
        Self {
            client,
            router,
            endpoints,
        }
    }

    /// Process messages until both subscriptions close
    pub async fn run(&self) -> InfrastructureResult<()> {
        let mut requests = self
            .client
            .queue_subscribe(&self.endpoints.rpc_subject, &self.endpoints.queue_group)
            .await?;
        let mut events = self
            .client
            .queue_subscribe(&self.endpoints.event_subject, &self.endpoints.queue_group)
            .await?;

        info!(
            rpc_subject = %self.endpoints.rpc_subject,
            event_subject = %self.endpoints.event_subject,
            "Inventory service listening"
        );

        loop {
            tokio::select! {
                Some(message) = requests.next() => self.spawn_request(message),
                Some(message) = events.next() => self.spawn_event(message),
                else => break,
            }
        }

        warn!("Inventory subscriptions closed");
        Ok(())
    }

    fn spawn_request(&self, message: Message) {
        let router = self.router.clone();
        let client = self.client.clone();

        tokio::spawn(async move {
            let reply = router.handle_raw_request(&message.payload).await;

            let Some(reply_to) = message.reply else {
                warn!(subject = %message.subject, "Request has no reply subject, dropping reply");
                return;
            };

            if let Err(err) = client.publish(&reply_to.to_string(), &reply).await {
                error!(reply_to = %reply_to, error = %err, "Failed to send reply");
            }
        });
    }

    fn spawn_event(&self, message: Message) {
        let router = self.router.clone();

        tokio::spawn(async move {
            router.handle_raw_event(&message.payload).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NatsConfig::default();
        assert_eq!(config.servers, vec!["nats://localhost:4222".to_string()]);
        assert_eq!(config.name, "inventory-service");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_default_endpoints() {
        let endpoints = RpcEndpoints::default();
        assert_eq!(endpoints.rpc_subject, "inventory.rpc");
        assert_eq!(endpoints.event_subject, "inventory.events");
        assert_eq!(endpoints.queue_group, "inventory-service");
    }
}
