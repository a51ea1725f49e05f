use serde::Deserialize;
use uuid::Uuid;

use super::errors::OrderError;
use super::value_objects::{LineItem, TargetStatus};

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub customer_id: Uuid,
    pub line_items: Vec<LineItem>,
}

impl CreateOrder {
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.customer_id.is_nil() {
            return Err(OrderError::NilCustomer);
        }
        if self.line_items.is_empty() {
            return Err(OrderError::EmptyItems);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatus {
    pub status: String,
}

impl UpdateOrderStatus {
    pub fn target(&self) -> Result<TargetStatus, OrderError> {
        self.status.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_validation() {
        let items = vec![LineItem {
            item_id: Uuid::new_v4(),
            quantity: 0,
            unit_price: 0,
        }];

        let ok = CreateOrder {
            customer_id: Uuid::new_v4(),
            line_items: items.clone(),
        };
        assert!(ok.validate().is_ok());

        let nil = CreateOrder {
            customer_id: Uuid::nil(),
            line_items: items,
        };
        assert_eq!(nil.validate(), Err(OrderError::NilCustomer));

        let empty = CreateOrder {
            customer_id: Uuid::new_v4(),
            line_items: vec![],
        };
        assert_eq!(empty.validate(), Err(OrderError::EmptyItems));
    }

    #[test]
    fn test_create_order_from_request_body() {
        let body = format!(
            r#"{{"customer_id":"{}","line_items":[{{"item_id":"{}","quantity":3,"unit_price":99}}]}}"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let command: CreateOrder = serde_json::from_str(&body).unwrap();
        assert_eq!(command.line_items[0].quantity, 3);
    }

    #[test]
    fn test_update_status_target() {
        let update: UpdateOrderStatus = serde_json::from_str(r#"{"status":"shipped"}"#).unwrap();
        assert_eq!(update.target(), Ok(TargetStatus::Shipped));

        let bogus = UpdateOrderStatus {
            status: "returned".into(),
        };
        assert!(matches!(bogus.target(), Err(OrderError::UnknownStatus(_))));
    }
}
