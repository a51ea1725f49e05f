//! In-process order store.
//!
//! Same contract and key layout as the Redis store, kept behind one lock so
//! the paired record/index writes stay atomic. Useful for development and
//! tests where no Redis is around.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{decode_order, encode_order, OrderKeys, OrderPage, OrderStore, StoreError, CURSOR_START};
use crate::domain::order::{Order, OrderId};

#[derive(Debug, Default)]
struct MemoryState {
    records: HashMap<String, String>,
    /// Members of the shared index, in insertion order.
    index: Vec<String>,
}

/// Cursor is the position of the next index entry to visit.
#[derive(Debug, Clone, Default)]
pub struct MemoryOrderStore {
    state: Arc<RwLock<MemoryState>>,
    keys: OrderKeys,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let key = self.keys.record(order.id());
        let payload = encode_order(&key, order)?;

        let mut state = self.state.write().await;
        if state.records.contains_key(&key) {
            return Err(StoreError::Conflict(order.id()));
        }
        state.records.insert(key.clone(), payload);
        if !state.index.contains(&key) {
            state.index.push(key);
        }

        tracing::info!(order_id = order.id(), "Inserted order");
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Order, StoreError> {
        let key = self.keys.record(id);
        let state = self.state.read().await;

        match state.records.get(&key) {
            Some(payload) => decode_order(&key, payload),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn update_by_id(&self, order: &Order) -> Result<(), StoreError> {
        let key = self.keys.record(order.id());
        let payload = encode_order(&key, order)?;

        let mut state = self.state.write().await;
        match state.records.get_mut(&key) {
            Some(slot) => *slot = payload,
            None => return Err(StoreError::NotFound(order.id())),
        }

        tracing::info!(order_id = order.id(), status = %order.status(), "Updated order");
        Ok(())
    }

    async fn delete_by_id(&self, id: OrderId) -> Result<(), StoreError> {
        let key = self.keys.record(id);

        let mut state = self.state.write().await;
        if state.records.remove(&key).is_none() {
            return Err(StoreError::NotFound(id));
        }
        state.index.retain(|member| member != &key);

        tracing::info!(order_id = id, "Deleted order");
        Ok(())
    }

    async fn find_page(&self, cursor: u64, limit: usize) -> Result<OrderPage, StoreError> {
        let state = self.state.read().await;

        let start = usize::try_from(cursor).unwrap_or(usize::MAX).min(state.index.len());
        let end = start.saturating_add(limit.max(1)).min(state.index.len());

        let mut orders = Vec::with_capacity(end - start);
        for key in &state.index[start..end] {
            match state.records.get(key) {
                Some(payload) => orders.push(decode_order(key, payload)?),
                None => tracing::debug!(key = %key, "Skipping index entry without a record"),
            }
        }

        let next = if end >= state.index.len() {
            CURSOR_START
        } else {
            end as u64
        };

        Ok(OrderPage { orders, cursor: next })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{transition, LineItem, TargetStatus};
    use chrono::{FixedOffset, TimeZone};
    use std::collections::HashSet;
    use uuid::Uuid;

    fn order(id: OrderId) -> Order {
        let created_at = FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 10, 8, 30, 0)
            .unwrap();
        Order::new(
            id,
            Uuid::new_v4(),
            vec![LineItem {
                item_id: Uuid::new_v4(),
                quantity: 2,
                unit_price: 500,
            }],
            created_at,
        )
    }

    #[tokio::test]
    async fn test_insert_then_find_round_trips() {
        let store = MemoryOrderStore::new();
        let original = order(1);

        store.insert(&original).await.unwrap();
        let found = store.find_by_id(1).await.unwrap();

        assert_eq!(found, original);
    }

    #[tokio::test]
    async fn test_reinsert_conflicts_and_keeps_original() {
        let store = MemoryOrderStore::new();
        let original = order(5);
        store.insert(&original).await.unwrap();

        let impostor = order(5);
        let result = store.insert(&impostor).await;

        assert!(matches!(result, Err(StoreError::Conflict(5))));
        assert_eq!(store.find_by_id(5).await.unwrap(), original);
        assert_eq!(store.state.read().await.index.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_find_is_not_found() {
        let store = MemoryOrderStore::new();
        store.insert(&order(9)).await.unwrap();

        store.delete_by_id(9).await.unwrap();

        assert!(matches!(store.find_by_id(9).await, Err(StoreError::NotFound(9))));
        assert!(store.state.read().await.index.is_empty());
        assert!(matches!(store.delete_by_id(9).await, Err(StoreError::NotFound(9))));
    }

    #[tokio::test]
    async fn test_update_missing_has_no_effect() {
        let store = MemoryOrderStore::new();

        let result = store.update_by_id(&order(3)).await;

        assert!(matches!(result, Err(StoreError::NotFound(3))));
        assert!(store.is_empty().await);
        assert!(store.state.read().await.index.is_empty());
    }

    #[tokio::test]
    async fn test_update_overwrites_existing() {
        let store = MemoryOrderStore::new();
        let created = order(4);
        store.insert(&created).await.unwrap();

        let shipped = transition(&created, TargetStatus::Shipped, created.created_at()).unwrap();
        store.update_by_id(&shipped).await.unwrap();

        assert_eq!(store.find_by_id(4).await.unwrap(), shipped);
    }

    #[tokio::test]
    async fn test_pagination_visits_every_order() {
        let store = MemoryOrderStore::new();
        let ids: HashSet<OrderId> = (1..=123).collect();
        for id in &ids {
            store.insert(&order(*id)).await.unwrap();
        }

        let mut seen = HashSet::new();
        let mut cursor = CURSOR_START;
        let mut pages = 0;
        loop {
            let page = store.find_page(cursor, 50).await.unwrap();
            assert!(page.orders.len() <= 50);
            seen.extend(page.orders.iter().map(Order::id));
            pages += 1;
            if page.is_last() {
                break;
            }
            cursor = page.cursor;
        }

        assert_eq!(seen, ids);
        assert_eq!(pages, 3);
    }

    #[tokio::test]
    async fn test_empty_store_page_is_last() {
        let store = MemoryOrderStore::new();
        let page = store.find_page(CURSOR_START, 50).await.unwrap();
        assert!(page.orders.is_empty());
        assert!(page.is_last());
    }

    #[tokio::test]
    async fn test_dangling_index_entry_is_skipped() {
        let store = MemoryOrderStore::new();
        store.insert(&order(1)).await.unwrap();
        store.insert(&order(2)).await.unwrap();
        store.state.write().await.records.remove("order:1");

        let page = store.find_page(CURSOR_START, 10).await.unwrap();

        assert_eq!(page.orders.len(), 1);
        assert_eq!(page.orders[0].id(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_record_fails_lookup_and_page() {
        let store = MemoryOrderStore::new();
        store.insert(&order(8)).await.unwrap();
        store
            .state
            .write()
            .await
            .records
            .insert("order:8".into(), "{\"order_id\":8}".into());

        assert!(matches!(store.find_by_id(8).await, Err(StoreError::Corrupt { .. })));
        assert!(matches!(
            store.find_page(CURSOR_START, 10).await,
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_concurrent_inserts_of_same_id_have_one_winner() {
        let store = MemoryOrderStore::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.insert(&order(77)).await }));
        }

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                wins += 1;
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(store.len().await, 1);
    }
}
