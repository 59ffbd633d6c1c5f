//! Unit of work over a set of locked SKU rows.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use bodega_catalog::{Sku, SkuId};
use bodega_orders::{Order, OrderItem};

use crate::error::StorageError;
use crate::order_store::OrderInsert;

/// Exclusive hold on every SKU row a stock mutation implicates.
///
/// Opening acquires all row locks up front. The handles come pre-sorted in
/// ascending SKU-id order, so any two transactions over overlapping SKU
/// sets acquire in the same order and cannot deadlock. The locks are held
/// until the transaction is dropped. Nothing is written before `commit`;
/// dropping the value without committing releases the rows with no
/// persistent effect.
#[derive(Debug)]
pub(crate) struct StockTxn<'a> {
    rows: Vec<(SkuId, MutexGuard<'a, Sku>)>,
}

impl<'a> StockTxn<'a> {
    /// Lock the given rows, in the order the slice provides them.
    ///
    /// `CatalogStore::sku_handles` is the only producer of handle slices
    /// and guarantees ascending id order.
    pub(crate) fn open(handles: &'a [(SkuId, Arc<Mutex<Sku>>)]) -> Result<Self, StorageError> {
        let mut rows = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let guard = handle.lock().map_err(|_| StorageError::Poisoned("sku row"))?;
            rows.push((*id, guard));
        }
        Ok(Self { rows })
    }

    /// The locked row for a SKU, if it was among the opened handles.
    pub(crate) fn row(&self, id: SkuId) -> Option<&Sku> {
        self.rows
            .iter()
            .find(|(row_id, _)| *row_id == id)
            .map(|(_, guard)| &**guard)
    }

    /// Return units to a locked row (order cancellation). No-op for rows
    /// outside the transaction.
    pub(crate) fn restock(&mut self, id: SkuId, quantity: i64, now: DateTime<Utc>) {
        if let Some((_, row)) = self.rows.iter_mut().find(|(row_id, _)| *row_id == id) {
            row.restock(quantity, now);
        }
    }

    /// Apply every effect of a validated checkout: deduct each item's
    /// quantity from its locked row, then insert the order with its items.
    ///
    /// Every step in here is infallible (the caller has already acquired
    /// the order-ledger locks and validated each line against the locked
    /// rows), so the commit cannot stop halfway.
    pub(crate) fn commit(
        mut self,
        insert: OrderInsert<'_>,
        order: Order,
        items: Vec<OrderItem>,
        now: DateTime<Utc>,
    ) {
        for item in &items {
            if let Some((_, row)) = self
                .rows
                .iter_mut()
                .find(|(row_id, _)| *row_id == item.sku_id())
            {
                row.deduct(item.quantity(), now);
            }
        }
        insert.insert(order, items);
    }
}
