use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Numeric order identifier, drawn at random by the creator.
pub type OrderId = u64;

/// Timestamps carry the civil offset they were taken in.
pub type Timestamp = DateTime<FixedOffset>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LineItem {
    pub item_id: Uuid,
    pub quantity: u64,
    /// Minor currency units.
    pub unit_price: u64,
}

/// Status derived from which fulfillment timestamps are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Shipped,
    Completed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Created => write!(f, "created"),
            OrderStatus::Shipped => write!(f, "shipped"),
            OrderStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A status a caller may ask an order to move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    Shipped,
    Completed,
}

impl From<TargetStatus> for OrderStatus {
    fn from(target: TargetStatus) -> Self {
        match target {
            TargetStatus::Shipped => OrderStatus::Shipped,
            TargetStatus::Completed => OrderStatus::Completed,
        }
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&OrderStatus::from(*self), f)
    }
}

impl FromStr for TargetStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shipped" | "enviado" => Ok(TargetStatus::Shipped),
            "completed" | "concluido" => Ok(TargetStatus::Completed),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
