use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use super::routes::{configure, AppState};

/// Target that per-request access lines are logged under.
pub const REQUEST_LOG_TARGET: &str = "order_api::http";

/// One access line per request: peer, request line, status, body size, latency.
pub fn request_logger() -> Logger {
    Logger::new("%a \"%r\" %s %b %Dms").log_target(REQUEST_LOG_TARGET)
}

/// Serve the order API until the process receives SIGINT/SIGTERM.
pub async fn run_server(state: AppState, bind: (String, u16)) -> std::io::Result<()> {
    tracing::info!("Starting order API on http://{}:{}", bind.0, bind.1);

    let state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .wrap(request_logger())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}
