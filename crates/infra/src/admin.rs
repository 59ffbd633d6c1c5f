//! Order administration: cancel-and-restock.

use chrono::Utc;
use tracing::info;

use bodega_catalog::SkuId;
use bodega_orders::OrderId;

use crate::error::StoreError;
use crate::stock_txn::StockTxn;
use crate::storefront::Storefront;

impl Storefront {
    /// Cancel each given order and return its items' stock.
    ///
    /// Already-canceled orders are skipped. For every order actually
    /// canceled, its items' SKU rows are locked under the same
    /// ascending-id discipline as checkout, stock is returned, and the
    /// status flips to `CANCELED`, all before the row locks are released;
    /// a concurrent checkout of the same SKU serializes against the
    /// restock. Returns how many orders were canceled.
    pub fn cancel_and_restock(&self, order_ids: &[OrderId]) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut updated = 0;
        for &order_id in order_ids {
            let Some(order) = self.orders().order(order_id)? else {
                continue;
            };
            if order.is_canceled() {
                continue;
            }
            let items = self.orders().items_of(order_id)?;
            let sku_ids: Vec<SkuId> = items.iter().map(|item| item.sku_id()).collect();

            let handles = self.catalog().sku_handles(&sku_ids)?;
            let mut txn = StockTxn::open(&handles)?;
            let Some(update) = self.orders().begin_update(order_id)? else {
                continue;
            };
            if update.is_canceled() {
                // Lost the race to another cancellation.
                continue;
            }
            for item in &items {
                txn.restock(item.sku_id(), item.quantity(), now);
            }
            update.mark_canceled(now);
            drop(txn);

            info!(order_id = %order_id, items = items.len(), "order canceled and restocked");
            updated += 1;
        }
        Ok(updated)
    }
}
