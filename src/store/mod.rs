// ============================================================================
// Order Store - persistence and enumeration of orders
// ============================================================================
//
// Layout shared by every backend:
// - one entry per order under `{prefix}order:{id}`, holding the JSON record
// - one shared set `{prefix}orders` listing the keys of all live orders
//
// Insert and delete touch both in one atomic unit. Enumeration walks the
// shared set with a resumable cursor and no snapshot: under concurrent
// writes an order may be seen zero, one or several times.
//
// ============================================================================

mod memory;
mod redis_store;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::order::{Order, OrderId};

pub use self::memory::MemoryOrderStore;
pub use self::redis_store::RedisOrderStore;

/// Cursor value that starts a walk, and that signals a finished one.
pub const CURSOR_START: u64 = 0;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Order {0} not found")]
    NotFound(OrderId),

    #[error("Order {0} already exists")]
    Conflict(OrderId),

    #[error("Order store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt order record at '{key}': {message}")]
    Corrupt { key: String, message: String },
}

impl StoreError {
    pub fn is_operational(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Corrupt { .. })
    }
}

/// One page of a walk over the order index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    /// Position to resume from; `CURSOR_START` once the walk is exhausted.
    pub cursor: u64,
}

impl OrderPage {
    pub fn is_last(&self) -> bool {
        self.cursor == CURSOR_START
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Write a new order and register it in the index, atomically.
    /// Fails with `Conflict` when the id is taken.
    async fn insert(&self, order: &Order) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: OrderId) -> Result<Order, StoreError>;

    /// Overwrite an existing order. Never recreates a deleted one.
    async fn update_by_id(&self, order: &Order) -> Result<(), StoreError>;

    /// Remove the order and its index entry, atomically.
    async fn delete_by_id(&self, id: OrderId) -> Result<(), StoreError>;

    /// Fetch up to about `limit` orders starting at `cursor`.
    /// Index entries whose record has vanished are skipped.
    async fn find_page(&self, cursor: u64, limit: usize) -> Result<OrderPage, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

// ============================================================================
// Keys
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKeys {
    prefix: String,
}

impl OrderKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn record(&self, id: OrderId) -> String {
        format!("{}order:{}", self.prefix, id)
    }

    pub fn index(&self) -> String {
        format!("{}orders", self.prefix)
    }
}

impl Default for OrderKeys {
    fn default() -> Self {
        Self::new("")
    }
}

// ============================================================================
// Record codec
// ============================================================================

pub(crate) fn encode_order(key: &str, order: &Order) -> Result<String, StoreError> {
    serde_json::to_string(order).map_err(|e| StoreError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn decode_order(key: &str, payload: &str) -> Result<Order, StoreError> {
    serde_json::from_str(payload).map_err(|e| StoreError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })
}

// ============================================================================
// Unit Tests
// ============================================================================
