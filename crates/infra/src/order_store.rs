//! In-memory order ledger.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use bodega_catalog::{ProductId, SkuId};
use bodega_orders::{Order, OrderId, OrderItem, OrderItemId, OrderStatus};

use crate::error::StorageError;

/// Ledger of committed orders and their items.
///
/// Orders enter through `OrderInsert` (always together with their items,
/// never partially) and are read-only from the checkout path afterwards;
/// order management goes through `OrderUpdate`.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
    items: RwLock<HashMap<OrderItemId, OrderItem>>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(&self, id: OrderId) -> Result<Option<Order>, StorageError> {
        let orders = self.orders.read().map_err(|_| StorageError::Poisoned("orders"))?;
        Ok(orders.get(&id).cloned())
    }

    /// The order's items in creation order (item ids are time-ordered).
    pub fn items_of(&self, order_id: OrderId) -> Result<Vec<OrderItem>, StorageError> {
        let items = self.items.read().map_err(|_| StorageError::Poisoned("order items"))?;
        let mut found: Vec<OrderItem> = items
            .values()
            .filter(|item| item.order_id() == order_id)
            .cloned()
            .collect();
        found.sort_by_key(OrderItem::id_typed);
        Ok(found)
    }

    /// Orders with the given status, newest first.
    pub fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StorageError> {
        let orders = self.orders.read().map_err(|_| StorageError::Poisoned("orders"))?;
        let mut found: Vec<Order> = orders
            .values()
            .filter(|order| order.status() == status)
            .cloned()
            .collect();
        found.sort_by_key(|order| std::cmp::Reverse(order.id_typed()));
        Ok(found)
    }

    pub fn count(&self) -> Result<usize, StorageError> {
        let orders = self.orders.read().map_err(|_| StorageError::Poisoned("orders"))?;
        Ok(orders.len())
    }

    /// Whether any order item references the product (blocks deletion).
    pub fn references_product(&self, id: ProductId) -> Result<bool, StorageError> {
        let items = self.items.read().map_err(|_| StorageError::Poisoned("order items"))?;
        Ok(items.values().any(|item| item.product_id() == id))
    }

    /// Whether any order item references the SKU (blocks deletion).
    pub fn references_sku(&self, id: SkuId) -> Result<bool, StorageError> {
        let items = self.items.read().map_err(|_| StorageError::Poisoned("order items"))?;
        Ok(items.values().any(|item| item.sku_id() == id))
    }

    /// Acquire the write locks needed to insert an order with its items.
    ///
    /// Acquisition is the only fallible step; the insert itself cannot
    /// fail, which is what lets the checkout transaction order its effects
    /// so that nothing is written once anything can still go wrong.
    pub(crate) fn begin_insert(&self) -> Result<OrderInsert<'_>, StorageError> {
        let orders = self.orders.write().map_err(|_| StorageError::Poisoned("orders"))?;
        let items = self.items.write().map_err(|_| StorageError::Poisoned("order items"))?;
        Ok(OrderInsert { orders, items })
    }

    /// Acquire the write lock for an in-place order update; `None` when the
    /// order does not exist.
    pub(crate) fn begin_update(&self, id: OrderId) -> Result<Option<OrderUpdate<'_>>, StorageError> {
        let orders = self.orders.write().map_err(|_| StorageError::Poisoned("orders"))?;
        if !orders.contains_key(&id) {
            return Ok(None);
        }
        Ok(Some(OrderUpdate { orders, id }))
    }
}

/// Write-locked insertion slot for one order and its items.
#[derive(Debug)]
pub(crate) struct OrderInsert<'a> {
    orders: RwLockWriteGuard<'a, HashMap<OrderId, Order>>,
    items: RwLockWriteGuard<'a, HashMap<OrderItemId, OrderItem>>,
}

impl OrderInsert<'_> {
    /// Insert the order together with all of its items. Infallible.
    pub(crate) fn insert(mut self, order: Order, items: Vec<OrderItem>) {
        self.orders.insert(order.id_typed(), order);
        for item in items {
            self.items.insert(item.id_typed(), item);
        }
    }
}

/// Write-locked handle on one existing order.
#[derive(Debug)]
pub(crate) struct OrderUpdate<'a> {
    orders: RwLockWriteGuard<'a, HashMap<OrderId, Order>>,
    id: OrderId,
}

impl OrderUpdate<'_> {
    pub(crate) fn is_canceled(&self) -> bool {
        self.orders
            .get(&self.id)
            .map(Order::is_canceled)
            .unwrap_or(true)
    }

    /// Mark the order canceled while the write lock is held.
    pub(crate) fn mark_canceled(mut self, now: DateTime<Utc>) {
        if let Some(order) = self.orders.get_mut(&self.id) {
            // Cannot conflict: the caller checked `is_canceled` under this
            // same write lock.
            let _ = order.mark_canceled(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodega_core::EntityId;
    use bodega_orders::CustomerDetails;

    fn customer() -> CustomerDetails {
        CustomerDetails {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            address_line: "12 Analytical Way".to_string(),
            ..CustomerDetails::default()
        }
    }

    fn insert_order(store: &OrderStore, item_count: usize) -> OrderId {
        let now = Utc::now();
        let order_id = OrderId::new(EntityId::new());
        let items: Vec<OrderItem> = (0..item_count)
            .map(|_| {
                OrderItem::new(
                    OrderItemId::new(EntityId::new()),
                    order_id,
                    ProductId::new(EntityId::new()),
                    SkuId::new(EntityId::new()),
                    2,
                    500,
                    now,
                )
                .unwrap()
            })
            .collect();
        let order = Order::new(order_id, customer(), 500 * 2 * item_count as u64, now);
        store.begin_insert().unwrap().insert(order, items);
        order_id
    }

    #[test]
    fn order_and_items_come_back_together() {
        let store = OrderStore::new();
        let order_id = insert_order(&store, 3);
        assert!(store.order(order_id).unwrap().is_some());
        assert_eq!(store.items_of(order_id).unwrap().len(), 3);
    }

    #[test]
    fn items_of_ignores_other_orders() {
        let store = OrderStore::new();
        let first = insert_order(&store, 2);
        let _second = insert_order(&store, 1);
        assert_eq!(store.items_of(first).unwrap().len(), 2);
    }

    #[test]
    fn list_by_status_filters() {
        let store = OrderStore::new();
        let order_id = insert_order(&store, 1);
        assert_eq!(store.list_by_status(OrderStatus::New).unwrap().len(), 1);
        assert!(store.list_by_status(OrderStatus::Canceled).unwrap().is_empty());

        let update = store.begin_update(order_id).unwrap().unwrap();
        update.mark_canceled(Utc::now());
        assert_eq!(store.list_by_status(OrderStatus::Canceled).unwrap().len(), 1);
    }

    #[test]
    fn reference_checks_see_inserted_items() {
        let store = OrderStore::new();
        let order_id = insert_order(&store, 1);
        let item = &store.items_of(order_id).unwrap()[0];
        assert!(store.references_product(item.product_id()).unwrap());
        assert!(store.references_sku(item.sku_id()).unwrap());
        assert!(!store.references_sku(SkuId::new(EntityId::new())).unwrap());
    }

    #[test]
    fn begin_update_on_missing_order_is_none() {
        let store = OrderStore::new();
        assert!(store.begin_update(OrderId::new(EntityId::new())).unwrap().is_none());
    }
}
