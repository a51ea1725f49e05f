use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{LineItem, OrderId, OrderStatus, Timestamp};

// ============================================================================
// Order Aggregate
// ============================================================================
//
// Status is never stored. In memory it is the `Fulfillment` tag, which holds
// exactly the timestamps that justify it; on the wire it flattens back to
// two nullable timestamps.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fulfillment {
    Created,
    Shipped {
        shipped_at: Timestamp,
    },
    Completed {
        shipped_at: Timestamp,
        completed_at: Timestamp,
    },
}

impl Fulfillment {
    pub fn status(&self) -> OrderStatus {
        match self {
            Fulfillment::Created => OrderStatus::Created,
            Fulfillment::Shipped { .. } => OrderStatus::Shipped,
            Fulfillment::Completed { .. } => OrderStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OrderRecord", into = "OrderRecord")]
pub struct Order {
    id: OrderId,
    customer_id: Uuid,
    line_items: Vec<LineItem>,
    created_at: Timestamp,
    fulfillment: Fulfillment,
}

impl Order {
    /// A freshly created order with no fulfillment timestamps.
    pub fn new(
        id: OrderId,
        customer_id: Uuid,
        line_items: Vec<LineItem>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            customer_id,
            line_items,
            created_at,
            fulfillment: Fulfillment::Created,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer_id(&self) -> Uuid {
        self.customer_id
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn fulfillment(&self) -> Fulfillment {
        self.fulfillment
    }

    pub fn status(&self) -> OrderStatus {
        self.fulfillment.status()
    }

    pub fn shipped_at(&self) -> Option<Timestamp> {
        match self.fulfillment {
            Fulfillment::Created => None,
            Fulfillment::Shipped { shipped_at } | Fulfillment::Completed { shipped_at, .. } => {
                Some(shipped_at)
            }
        }
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        match self.fulfillment {
            Fulfillment::Completed { completed_at, .. } => Some(completed_at),
            _ => None,
        }
    }

    /// Sum of quantity times unit price, in minor units.
    pub fn total(&self) -> u64 {
        self.line_items
            .iter()
            .map(|item| item.quantity.saturating_mul(item.unit_price))
            .fold(0u64, u64::saturating_add)
    }

    pub(crate) fn with_fulfillment(&self, fulfillment: Fulfillment) -> Self {
        Self {
            fulfillment,
            ..self.clone()
        }
    }
}

// ============================================================================
// Wire Record
// ============================================================================

/// Flat JSON shape persisted in the backend and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub customer_id: Uuid,
    pub line_items: Vec<LineItem>,
    pub created_at: Timestamp,
    pub shipped_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("completed_at is set but shipped_at is not")]
    CompletedWithoutShipment,
}

impl TryFrom<OrderRecord> for Order {
    type Error = RecordError;

    fn try_from(record: OrderRecord) -> Result<Self, Self::Error> {
        let fulfillment = match (record.shipped_at, record.completed_at) {
            (None, None) => Fulfillment::Created,
            (Some(shipped_at), None) => Fulfillment::Shipped { shipped_at },
            (Some(shipped_at), Some(completed_at)) => Fulfillment::Completed {
                shipped_at,
                completed_at,
            },
            (None, Some(_)) => return Err(RecordError::CompletedWithoutShipment),
        };

        Ok(Self {
            id: record.order_id,
            customer_id: record.customer_id,
            line_items: record.line_items,
            created_at: record.created_at,
            fulfillment,
        })
    }
}

impl From<Order> for OrderRecord {
    fn from(order: Order) -> Self {
        let shipped_at = order.shipped_at();
        let completed_at = order.completed_at();
        Self {
            order_id: order.id,
            customer_id: order.customer_id,
            line_items: order.line_items,
            created_at: order.created_at,
            shipped_at,
            completed_at,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
