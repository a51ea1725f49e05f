use chrono::{FixedOffset, Utc};

use super::aggregate::{Fulfillment, Order};
use super::errors::OrderError;
use super::value_objects::{TargetStatus, Timestamp};

// ============================================================================
// Order Lifecycle - status state machine
// ============================================================================
//
//   Created --shipped--> Shipped --completed--> Completed
//
// Pure: takes the current order and the instant to stamp, returns the next
// order value. Persisting the result is the caller's job.
//
// ============================================================================

/// Apply a requested status change to `order`.
pub fn transition(order: &Order, target: TargetStatus, now: Timestamp) -> Result<Order, OrderError> {
    let next = match (order.fulfillment(), target) {
        (Fulfillment::Created, TargetStatus::Shipped) => Fulfillment::Shipped { shipped_at: now },
        (Fulfillment::Shipped { shipped_at }, TargetStatus::Completed) => Fulfillment::Completed {
            shipped_at,
            completed_at: now,
        },
        (current, target) => {
            return Err(OrderError::InvalidTransition {
                from: current.status(),
                to: target,
            })
        }
    };

    Ok(order.with_fulfillment(next))
}

/// Source of "now" in the deployment's single civil offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    offset: FixedOffset,
}

impl Clock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Offset given in minutes east of UTC; `None` when outside ±24h.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> Timestamp {
        Utc::now().with_timezone(&self.offset)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{LineItem, OrderStatus};
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn t0() -> Timestamp {
        FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 15, 12, 0, 0)
            .unwrap()
    }

    fn created() -> Order {
        Order::new(
            1,
            Uuid::new_v4(),
            vec![LineItem {
                item_id: Uuid::new_v4(),
                quantity: 2,
                unit_price: 500,
            }],
            t0(),
        )
    }

    #[test]
    fn test_ship_created_order() {
        let shipped_at = t0() + Duration::hours(1);
        let order = transition(&created(), TargetStatus::Shipped, shipped_at).unwrap();

        assert_eq!(order.status(), OrderStatus::Shipped);
        assert_eq!(order.shipped_at(), Some(shipped_at));
        assert_eq!(order.completed_at(), None);
        assert_eq!(order.created_at(), t0());
    }

    #[test]
    fn test_ship_twice_is_rejected() {
        let order = transition(&created(), TargetStatus::Shipped, t0()).unwrap();
        let err = transition(&order, TargetStatus::Shipped, t0()).unwrap_err();

        assert_eq!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Shipped,
                to: TargetStatus::Shipped,
            }
        );
    }

    #[test]
    fn test_complete_requires_shipment() {
        let err = transition(&created(), TargetStatus::Completed, t0()).unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition { from: OrderStatus::Created, .. }
        ));
    }

    #[test]
    fn test_complete_keeps_shipped_at() {
        let shipped_at = t0() + Duration::hours(1);
        let completed_at = t0() + Duration::hours(5);

        let shipped = transition(&created(), TargetStatus::Shipped, shipped_at).unwrap();
        let completed = transition(&shipped, TargetStatus::Completed, completed_at).unwrap();

        assert_eq!(completed.status(), OrderStatus::Completed);
        assert_eq!(completed.shipped_at(), Some(shipped_at));
        assert_eq!(completed.completed_at(), Some(completed_at));
    }

    #[test]
    fn test_completed_is_terminal() {
        let shipped = transition(&created(), TargetStatus::Shipped, t0()).unwrap();
        let completed = transition(&shipped, TargetStatus::Completed, t0()).unwrap();

        for target in [TargetStatus::Shipped, TargetStatus::Completed] {
            let err = transition(&completed, target, t0()).unwrap_err();
            assert!(matches!(
                err,
                OrderError::InvalidTransition { from: OrderStatus::Completed, .. }
            ));
        }
    }

    #[test]
    fn test_rejected_transition_leaves_input_untouched() {
        let order = created();
        let before = order.clone();
        let _ = transition(&order, TargetStatus::Completed, t0());
        assert_eq!(order, before);
    }

    #[test]
    fn test_clock_uses_configured_offset() {
        let clock = Clock::from_offset_minutes(-180).unwrap();
        assert_eq!(clock.now().offset().local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn test_clock_rejects_out_of_range_offset() {
        assert!(Clock::from_offset_minutes(24 * 60).is_none());
        assert!(Clock::from_offset_minutes(i32::MAX).is_none());
        assert!(Clock::from_offset_minutes(0).is_some());
    }
}
