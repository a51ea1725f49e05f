use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::domain::order::{
    CreateOrder, Order, OrderCommandHandler, OrderId, OrderServiceError, UpdateOrderStatus,
};
use crate::metrics::Metrics;
use crate::store::{OrderStore, CURSOR_START};

/// Shared state handed to every request handler.
pub struct AppState {
    pub orders: Arc<OrderCommandHandler>,
    pub metrics: Arc<Metrics>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub cursor: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub orders: Vec<Order>,
    /// 0 once there is nothing left to fetch.
    pub next_cursor: u64,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics))
        .service(
            web::scope("/orders")
                .route("", web::post().to(create_order))
                .route("", web::get().to(list_orders))
                .route("/{id}", web::get().to(get_order))
                .route("/{id}", web::put().to(update_order))
                .route("/{id}", web::delete().to(delete_order)),
        );
}

async fn root() -> impl Responder {
    HttpResponse::Ok().finish()
}

async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrder>,
) -> Result<HttpResponse, OrderServiceError> {
    let order = state.orders.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

async fn list_orders(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, OrderServiceError> {
    let cursor = query.cursor.unwrap_or(CURSOR_START);
    let page = state.orders.list(cursor).await?;
    Ok(HttpResponse::Ok().json(ListResponse {
        orders: page.orders,
        next_cursor: page.cursor,
    }))
}

async fn get_order(
    state: web::Data<AppState>,
    id: web::Path<OrderId>,
) -> Result<HttpResponse, OrderServiceError> {
    let order = state.orders.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn update_order(
    state: web::Data<AppState>,
    id: web::Path<OrderId>,
    body: web::Json<UpdateOrderStatus>,
) -> Result<HttpResponse, OrderServiceError> {
    let order = state
        .orders
        .update_status(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn delete_order(
    state: web::Data<AppState>,
    id: web::Path<OrderId>,
) -> Result<HttpResponse, OrderServiceError> {
    state.orders.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn health(state: web::Data<AppState>) -> impl Responder {
    match state.orders.store().ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "service": "order-api"
        })),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "service": "order-api"
            }))
        }
    }
}

async fn metrics(state: web::Data<AppState>) -> impl Responder {
    match state.metrics.render() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}
