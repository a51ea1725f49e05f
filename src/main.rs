use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_api::api::{run_server, AppState};
use order_api::config::AppConfig;
use order_api::domain::order::OrderCommandHandler;
use order_api::metrics::Metrics;
use order_api::store::{OrderKeys, OrderStore, RedisOrderStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_api=debug"))
        )
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(
        port = config.server_port,
        page_size = config.page_size,
        utc_offset_minutes = config.utc_offset_minutes,
        "Configuration loaded"
    );

    // === 1. Shared Redis connection, opened once ===
    let store = RedisOrderStore::connect(
        &config.redis_connection_url(),
        OrderKeys::new(config.key_prefix.clone()),
    )
    .await
    .context("connecting to Redis")?;
    store.ping().await.context("pinging Redis")?;

    // === 2. Metrics ===
    let metrics = Arc::new(Metrics::new()?);

    // === 3. Command handler ===
    let orders = OrderCommandHandler::new(Arc::new(store), config.clock()?, config.page_size)
        .with_create_attempts(config.create_attempts)
        .with_metrics(metrics.clone());

    // === 4. HTTP API, stops on SIGINT/SIGTERM ===
    let state = AppState {
        orders: Arc::new(orders),
        metrics,
    };
    run_server(state, config.bind_address())
        .await
        .context("running HTTP server")?;

    tracing::info!("Order API stopped");
    Ok(())
}
