use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use super::{decode_order, encode_order, OrderKeys, OrderPage, OrderStore, StoreError};
use crate::domain::order::{Order, OrderId};

// ============================================================================
// Redis Order Store
// ============================================================================
//
// Paired writes (record + index) go through one MULTI/EXEC pipeline, so
// Redis applies both or neither. There is no in-process locking: every
// request task clones the same multiplexed connection.
//
// ============================================================================

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

#[derive(Clone)]
pub struct RedisOrderStore {
    connection: MultiplexedConnection,
    keys: OrderKeys,
}

impl RedisOrderStore {
    pub fn new(connection: MultiplexedConnection, keys: OrderKeys) -> Self {
        Self { connection, keys }
    }

    /// Open the shared connection once; callers clone the store, not the socket.
    pub async fn connect(url: &str, keys: OrderKeys) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;

        tracing::info!(index = %keys.index(), "Connected to Redis order store");

        Ok(Self::new(connection, keys))
    }

    pub fn keys(&self) -> &OrderKeys {
        &self.keys
    }
}

#[async_trait]
impl OrderStore for RedisOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let key = self.keys.record(order.id());
        let payload = encode_order(&key, order)?;
        let mut connection = self.connection.clone();

        // SET NX answers nil on an occupied key. The SADD then re-adds a key
        // that is already a member, so a conflict leaves no trace.
        let (written, _indexed): (Option<String>, i64) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&key)
            .arg(&payload)
            .arg("NX")
            .cmd("SADD")
            .arg(self.keys.index())
            .arg(&key)
            .query_async(&mut connection)
            .await?;

        if written.is_none() {
            tracing::debug!(order_id = order.id(), "Order id already taken");
            return Err(StoreError::Conflict(order.id()));
        }

        tracing::info!(order_id = order.id(), "Inserted order");
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Order, StoreError> {
        let key = self.keys.record(id);
        let mut connection = self.connection.clone();

        let payload: Option<String> = connection.get(&key).await?;
        match payload {
            Some(payload) => decode_order(&key, &payload),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn update_by_id(&self, order: &Order) -> Result<(), StoreError> {
        let key = self.keys.record(order.id());
        let payload = encode_order(&key, order)?;
        let mut connection = self.connection.clone();

        let written: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(&payload)
            .arg("XX")
            .query_async(&mut connection)
            .await?;

        if written.is_none() {
            return Err(StoreError::NotFound(order.id()));
        }

        tracing::info!(order_id = order.id(), status = %order.status(), "Updated order");
        Ok(())
    }

    async fn delete_by_id(&self, id: OrderId) -> Result<(), StoreError> {
        let key = self.keys.record(id);
        let mut connection = self.connection.clone();

        let (deleted, _unindexed): (i64, i64) = redis::pipe()
            .atomic()
            .cmd("DEL")
            .arg(&key)
            .cmd("SREM")
            .arg(self.keys.index())
            .arg(&key)
            .query_async(&mut connection)
            .await?;

        if deleted == 0 {
            return Err(StoreError::NotFound(id));
        }

        tracing::info!(order_id = id, "Deleted order");
        Ok(())
    }

    async fn find_page(&self, cursor: u64, limit: usize) -> Result<OrderPage, StoreError> {
        let mut connection = self.connection.clone();

        // COUNT is only a hint: small sets come back whole in one call.
        let (next, keys): (u64, Vec<String>) = redis::cmd("SSCAN")
            .arg(self.keys.index())
            .arg(cursor)
            .arg("COUNT")
            .arg(limit.max(1))
            .query_async(&mut connection)
            .await?;

        if keys.is_empty() {
            return Ok(OrderPage {
                orders: Vec::new(),
                cursor: next,
            });
        }

        let payloads: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut connection)
            .await?;

        let mut orders = Vec::with_capacity(keys.len());
        for (key, payload) in keys.iter().zip(payloads) {
            match payload {
                Some(payload) => orders.push(decode_order(key, &payload)?),
                None => tracing::debug!(key = %key, "Skipping index entry without a record"),
            }
        }

        tracing::debug!(cursor, next, count = orders.len(), "Fetched order page");

        Ok(OrderPage { orders, cursor: next })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut connection).await?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisOrderStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RedisOrderStore")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}
