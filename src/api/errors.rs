use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::domain::order::{OrderError, OrderServiceError};
use crate::store::StoreError;

// ============================================================================
// Error → HTTP response
// ============================================================================

impl ResponseError for OrderServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            OrderServiceError::Order(OrderError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            OrderServiceError::Order(_) => StatusCode::BAD_REQUEST,
            OrderServiceError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            OrderServiceError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            OrderServiceError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            OrderServiceError::Store(StoreError::Corrupt { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Backend details stay in the logs.
        let message = if self.is_operational() {
            "internal storage error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "message": message,
        }))
    }
}
