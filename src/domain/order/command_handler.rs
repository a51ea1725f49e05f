use std::sync::Arc;
use std::time::Instant;

use crate::metrics::Metrics;
use crate::store::{OrderPage, OrderStore, StoreError};
use crate::utils::{retry_on_transient, IsTransient, RetryConfig};

use super::aggregate::Order;
use super::commands::{CreateOrder, UpdateOrderStatus};
use super::errors::OrderServiceError;
use super::lifecycle::{transition, Clock};
use super::value_objects::OrderId;

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Lifecycle → Order Store
//
// The store never calls the lifecycle. Errors from either pass through
// unchanged; the only retry here is drawing a fresh id when a new order
// collides with an existing key.
//
// ============================================================================

impl IsTransient for OrderServiceError {
    fn is_transient(&self) -> bool {
        matches!(self, OrderServiceError::Store(StoreError::Conflict(_)))
    }
}

pub struct OrderCommandHandler {
    store: Arc<dyn OrderStore>,
    clock: Clock,
    page_size: usize,
    create_attempts: u32,
    metrics: Option<Arc<Metrics>>,
}

impl OrderCommandHandler {
    pub fn new(store: Arc<dyn OrderStore>, clock: Clock, page_size: usize) -> Self {
        Self {
            store,
            clock,
            page_size: page_size.max(1),
            create_attempts: 3,
            metrics: None,
        }
    }

    pub fn with_create_attempts(mut self, attempts: u32) -> Self {
        self.create_attempts = attempts.max(1);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn store(&self) -> &Arc<dyn OrderStore> {
        &self.store
    }

    /// Validate, stamp and insert a new order under a random id.
    pub async fn create(&self, command: CreateOrder) -> Result<Order, OrderServiceError> {
        let started = Instant::now();
        let result = self.create_inner(command).await;
        self.observe("create", started, &result);
        result
    }

    async fn create_inner(&self, command: CreateOrder) -> Result<Order, OrderServiceError> {
        command.validate()?;
        let created_at = self.clock.now();
        let CreateOrder {
            customer_id,
            line_items,
        } = command;

        let config = RetryConfig::immediate(self.create_attempts);
        let order = retry_on_transient(config, |attempt| {
            let order = Order::new(rand::random(), customer_id, line_items.clone(), created_at);
            let store = self.store.clone();
            async move {
                if attempt > 1 {
                    tracing::debug!(order_id = order.id(), attempt, "Retrying with a fresh order id");
                }
                store.insert(&order).await?;
                Ok::<_, OrderServiceError>(order)
            }
        })
        .await
        .into_result()?;

        tracing::info!(
            order_id = order.id(),
            customer_id = %order.customer_id(),
            item_count = order.line_items().len(),
            total = order.total(),
            "Created order"
        );

        Ok(order)
    }

    pub async fn get(&self, id: OrderId) -> Result<Order, OrderServiceError> {
        let started = Instant::now();
        let result = self.store.find_by_id(id).await.map_err(OrderServiceError::from);
        self.observe("get", started, &result);
        result
    }

    /// One page of orders with the configured page size.
    pub async fn list(&self, cursor: u64) -> Result<OrderPage, OrderServiceError> {
        let started = Instant::now();
        let result = self
            .store
            .find_page(cursor, self.page_size)
            .await
            .map_err(OrderServiceError::from);
        self.observe("list", started, &result);
        result
    }

    /// Load, apply the requested transition, write back.
    pub async fn update_status(
        &self,
        id: OrderId,
        command: UpdateOrderStatus,
    ) -> Result<Order, OrderServiceError> {
        let started = Instant::now();
        let result = self.update_status_inner(id, command).await;
        self.observe("update_status", started, &result);
        result
    }

    async fn update_status_inner(
        &self,
        id: OrderId,
        command: UpdateOrderStatus,
    ) -> Result<Order, OrderServiceError> {
        let target = command.target()?;
        let current = self.store.find_by_id(id).await?;
        let next = transition(&current, target, self.clock.now())?;
        self.store.update_by_id(&next).await?;

        tracing::info!(order_id = id, from = %current.status(), to = %next.status(), "Order status changed");
        Ok(next)
    }

    pub async fn delete(&self, id: OrderId) -> Result<(), OrderServiceError> {
        let started = Instant::now();
        let result = self.store.delete_by_id(id).await.map_err(OrderServiceError::from);
        self.observe("delete", started, &result);
        result
    }

    fn observe<T>(&self, operation: &str, started: Instant, result: &Result<T, OrderServiceError>) {
        let outcome = match result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };

        if let Err(e) = result {
            if e.is_operational() {
                tracing::error!(operation, error = %e, "Order operation failed");
            } else {
                tracing::debug!(operation, error = %e, "Order operation rejected");
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.record(operation, outcome, started.elapsed());
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
