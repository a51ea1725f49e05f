// ============================================================================
// Order Domain
// ============================================================================
//
// - Value objects (LineItem, OrderStatus, TargetStatus)
// - Aggregate (Order, its fulfillment state and wire record)
// - Lifecycle (status transitions, clock)
// - Commands (CreateOrder, UpdateOrderStatus)
// - Errors (OrderError, OrderServiceError)
// - Command Handler (OrderCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod aggregate;
pub mod lifecycle;
pub mod commands;
pub mod errors;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use aggregate::*;
pub use lifecycle::*;
pub use commands::*;
pub use errors::*;
pub use command_handler::*;
