// ============================================================================
// HTTP API
// ============================================================================
//
// Thin actix-web layer over `OrderCommandHandler`: decode the request, call
// the handler, map `OrderServiceError` onto a status code.
//
// ============================================================================

mod errors;
mod routes;
mod server;

pub use routes::{configure, AppState, ListQuery, ListResponse};
pub use server::run_server;
