//! Checkout: the transaction that turns a cart into an order.
//!
//! The protocol prices the cart **outside** any lock, then locks every
//! implicated SKU row (ascending id order), re-validates existence,
//! activity and availability against the locked rows, and only then
//! creates the order and deducts stock, all before a single row lock is
//! released. A failure on any line aborts the whole attempt; partial
//! orders are never created.
//!
//! Prices are deliberately not re-read under lock: the snapshot taken
//! before locking is what the order records, and a catalog price change
//! inside that window is an accepted staleness. Availability is what gets
//! strictly re-checked, because availability is what oversells.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use bodega_cart::Cart;
use bodega_catalog::{ProductId, SkuId};
use bodega_core::{EntityId, Price};
use bodega_orders::{CustomerDetails, Order, OrderId, OrderItem, OrderItemId};

use crate::error::StorageError;
use crate::stock_txn::StockTxn;
use crate::storefront::Storefront;

/// A checkout attempt that was turned away. User-facing; carries the
/// specific reason and, where relevant, the quantity still available.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutRejection {
    #[error("cart is empty")]
    EmptyCart,

    #[error("name, email and address are required")]
    MissingFields,

    #[error("SKU {sku_id} not found or inactive")]
    SkuUnavailable { sku_id: SkuId },

    #[error("not enough stock for {code}; available: {available}")]
    InsufficientStock { code: String, available: i64 },
}

/// Checkout failure: a typed rejection the caller may act on, or an
/// infrastructure fault reported as a generic could-not-complete condition
/// (internal detail is not leaked to the shopper).
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("{0}")]
    Rejected(#[from] CheckoutRejection),

    #[error("could not complete checkout")]
    Storage(#[from] StorageError),
}

/// Priced line captured before any lock is held.
#[derive(Debug, Clone)]
struct LineRequest {
    sku_id: SkuId,
    product_id: ProductId,
    quantity: i64,
    price_cents: u64,
    line_total_cents: u64,
}

impl Storefront {
    /// Run the checkout transaction for `cart`.
    ///
    /// On success the committed order (status `New`) is returned and the
    /// caller is expected to clear the cart; on any rejection the cart is
    /// left untouched and nothing was persisted.
    pub fn checkout(
        &self,
        cart: &Cart,
        customer: &CustomerDetails,
    ) -> Result<Order, CheckoutError> {
        let customer = customer.trimmed();
        if customer.validate().is_err() {
            return Err(CheckoutRejection::MissingFields.into());
        }

        // Snapshot pricing, outside the lock window.
        let lines = cart.lines(self.catalog());
        if lines.is_empty() {
            return Err(CheckoutRejection::EmptyCart.into());
        }

        let now = Utc::now();
        let mut requests = Vec::with_capacity(lines.len());
        let mut total_cents: u64 = 0;
        for line in &lines {
            let price = Price::from_decimal(line.price)
                .map_err(|e| StorageError::Corrupt(format!("bad snapshot price: {e}")))?;
            let line_total_cents = price
                .line_total(line.quantity)
                .map_err(|e| StorageError::Corrupt(format!("bad snapshot line: {e}")))?;
            total_cents = total_cents
                .checked_add(line_total_cents)
                .ok_or_else(|| StorageError::Corrupt("order total overflows".to_string()))?;
            requests.push(LineRequest {
                sku_id: line.sku.id_typed(),
                product_id: line.product.id_typed(),
                quantity: line.quantity,
                price_cents: price.cents(),
                line_total_cents,
            });
        }

        // Lock every implicated row before the first availability read.
        let sku_ids: Vec<SkuId> = requests.iter().map(|r| r.sku_id).collect();
        let handles = self.catalog().sku_handles(&sku_ids)?;
        let txn = StockTxn::open(&handles)?;

        // Re-validate each line against the locked, current rows. A stale
        // snapshot is fine for prices but never for availability.
        for request in &requests {
            let row = txn.row(request.sku_id).filter(|sku| sku.is_active());
            let Some(sku) = row else {
                debug!(sku_id = %request.sku_id, "checkout rejected: SKU missing or inactive");
                return Err(CheckoutRejection::SkuUnavailable {
                    sku_id: request.sku_id,
                }
                .into());
            };
            if !sku.can_fulfill(request.quantity) {
                debug!(
                    sku = sku.code(),
                    requested = request.quantity,
                    available = sku.available(),
                    "checkout rejected: insufficient stock"
                );
                return Err(CheckoutRejection::InsufficientStock {
                    code: sku.code().to_string(),
                    available: sku.available(),
                }
                .into());
            }
        }

        // Commit. Assembling the order and acquiring the ledger locks are
        // the last fallible steps; after `begin_insert` succeeds, every
        // remaining effect is infallible, so the unit of work cannot stop
        // halfway.
        let order_id = OrderId::new(EntityId::new());
        let order = Order::new(order_id, customer, total_cents, now);
        let mut items = Vec::with_capacity(requests.len());
        for request in &requests {
            let item = OrderItem::new(
                OrderItemId::new(EntityId::new()),
                order_id,
                request.product_id,
                request.sku_id,
                request.quantity,
                request.price_cents,
                now,
            )
            .map_err(|e| StorageError::Corrupt(format!("bad order item: {e}")))?;
            debug_assert_eq!(item.line_total_cents(), request.line_total_cents);
            items.push(item);
        }

        let insert = self.orders().begin_insert()?;
        let line_count = items.len();
        txn.commit(insert, order.clone(), items, now);

        info!(order_id = %order_id, lines = line_count, total_cents, "checkout committed");
        Ok(order)
    }
}
