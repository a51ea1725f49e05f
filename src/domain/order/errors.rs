use super::value_objects::{OrderStatus, TargetStatus};
use crate::store::StoreError;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: TargetStatus },

    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Customer id cannot be nil")]
    NilCustomer,

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),
}

// ============================================================================
// Service Errors - everything the command handler can surface
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderServiceError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrderServiceError {
    /// Backend failures that warrant an alert, as opposed to rejected input.
    pub fn is_operational(&self) -> bool {
        match self {
            OrderServiceError::Order(_) => false,
            OrderServiceError::Store(e) => e.is_operational(),
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderServiceError::Order(OrderError::InvalidTransition { .. }) => "invalid_transition",
            OrderServiceError::Order(_) => "validation",
            OrderServiceError::Store(StoreError::NotFound(_)) => "not_found",
            OrderServiceError::Store(StoreError::Conflict(_)) => "conflict",
            OrderServiceError::Store(StoreError::Unavailable(_)) => "store_unavailable",
            OrderServiceError::Store(StoreError::Corrupt { .. }) => "corrupt",
        }
    }
}
