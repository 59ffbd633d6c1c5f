//! Integration tests for the full checkout path.
//!
//! Scenarios: happy path, exact depletion, inactive SKU, empty cart,
//! missing checkout fields, price-snapshot integrity, cancel-and-restock,
//! and concurrent checkouts racing for the same stock.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use chrono::Utc;

    use bodega_cart::Cart;
    use bodega_catalog::{Category, CategoryId, Product, ProductId, Sku, SkuId};
    use bodega_core::EntityId;
    use bodega_orders::{CustomerDetails, OrderStatus};

    use crate::checkout::{CheckoutError, CheckoutRejection};
    use crate::storefront::Storefront;

    fn customer() -> CustomerDetails {
        CustomerDetails {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            address_line: "12 Analytical Way".to_string(),
            city: "London".to_string(),
            ..CustomerDetails::default()
        }
    }

    /// One product with one SKU holding `on_hand` units.
    fn seeded(price_cents: u64, on_hand: i64) -> (Storefront, ProductId, SkuId) {
        let store = Storefront::new();
        let now = Utc::now();
        let category_id = store
            .catalog()
            .add_category(Category::new(CategoryId::new(EntityId::new()), "Kitchen", now).unwrap())
            .unwrap();
        let product_id = store
            .catalog()
            .add_product(
                Product::new(
                    ProductId::new(EntityId::new()),
                    category_id,
                    "Enamel Mug",
                    price_cents,
                    now,
                )
                .unwrap(),
            )
            .unwrap();
        let sku_id = store
            .catalog()
            .add_sku(
                Sku::new(SkuId::new(EntityId::new()), product_id, "MUG-BLUE", now)
                    .unwrap()
                    .with_stock(on_hand),
            )
            .unwrap();
        (store, product_id, sku_id)
    }

    fn cart_with(store: &Storefront, sku_id: SkuId, qty: i64) -> Cart {
        let available = store.catalog().sku(sku_id).unwrap().unwrap().available();
        let mut cart = Cart::new();
        cart.add(sku_id, qty, available);
        cart
    }

    #[test]
    fn happy_path_commits_order_and_deducts_stock() {
        let (store, product_id, sku_id) = seeded(1299, 10);
        let mut cart = cart_with(&store, sku_id, 3);

        let order = store.checkout(&cart, &customer()).unwrap();
        cart.clear();

        assert_eq!(order.status(), OrderStatus::New);
        assert_eq!(order.total_cents(), 3 * 1299);

        let items = store.orders().items_of(order.id_typed()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity(), 3);
        assert_eq!(items[0].price_cents(), 1299);
        assert_eq!(items[0].line_total_cents(), 3 * 1299);
        assert_eq!(items[0].product_id(), product_id);

        let sku = store.catalog().sku(sku_id).unwrap().unwrap();
        assert_eq!(sku.on_hand(), 7);
        assert!(cart.is_empty());
    }

    #[test]
    fn exact_depletion_then_rejection() {
        let (store, _, sku_id) = seeded(500, 2);

        let cart = cart_with(&store, sku_id, 2);
        store.checkout(&cart, &customer()).unwrap();
        assert_eq!(store.catalog().sku(sku_id).unwrap().unwrap().on_hand(), 0);

        // The second cart was built while stock still existed.
        let mut second = Cart::new();
        second.add(sku_id, 1, 2);
        let err = store.checkout(&second, &customer()).unwrap_err();
        match err {
            CheckoutError::Rejected(CheckoutRejection::InsufficientStock { code, available }) => {
                assert_eq!(code, "MUG-BLUE");
                assert_eq!(available, 0);
            }
            other => panic!("Expected InsufficientStock rejection, got {other:?}"),
        }
        assert_eq!(store.catalog().sku(sku_id).unwrap().unwrap().on_hand(), 0);
        assert_eq!(store.orders().count().unwrap(), 1);
    }

    #[test]
    fn inactive_sku_rejects_whole_checkout() {
        let (store, _, sku_id) = seeded(500, 5);
        let cart = cart_with(&store, sku_id, 1);
        store
            .catalog()
            .set_sku_active(sku_id, false, Utc::now())
            .unwrap();

        let err = store.checkout(&cart, &customer()).unwrap_err();
        match err {
            CheckoutError::Rejected(CheckoutRejection::SkuUnavailable { sku_id: rejected }) => {
                assert_eq!(rejected, sku_id);
            }
            other => panic!("Expected SkuUnavailable rejection, got {other:?}"),
        }
        assert_eq!(store.orders().count().unwrap(), 0);
        assert_eq!(store.catalog().sku(sku_id).unwrap().unwrap().on_hand(), 5);
    }

    #[test]
    fn empty_cart_never_opens_a_transaction() {
        let (store, _, _) = seeded(500, 5);
        let err = store.checkout(&Cart::new(), &customer()).unwrap_err();
        match err {
            CheckoutError::Rejected(CheckoutRejection::EmptyCart) => {}
            other => panic!("Expected EmptyCart rejection, got {other:?}"),
        }
    }

    #[test]
    fn stale_cart_lines_reduce_to_empty() {
        let (store, _, _) = seeded(500, 5);
        // A SKU that was removed from the catalog after being carted.
        let mut cart = Cart::new();
        cart.add(SkuId::new(EntityId::new()), 2, 10);
        let err = store.checkout(&cart, &customer()).unwrap_err();
        match err {
            CheckoutError::Rejected(CheckoutRejection::EmptyCart) => {}
            other => panic!("Expected EmptyCart rejection, got {other:?}"),
        }
    }

    #[test]
    fn missing_fields_reject_before_any_lock() {
        let (store, _, sku_id) = seeded(500, 5);
        let cart = cart_with(&store, sku_id, 1);
        let incomplete = CustomerDetails {
            name: "Ada".to_string(),
            ..CustomerDetails::default()
        };
        let err = store.checkout(&cart, &incomplete).unwrap_err();
        match err {
            CheckoutError::Rejected(CheckoutRejection::MissingFields) => {}
            other => panic!("Expected MissingFields rejection, got {other:?}"),
        }
        assert_eq!(store.catalog().sku(sku_id).unwrap().unwrap().on_hand(), 5);
    }

    #[test]
    fn multi_line_failure_persists_nothing() {
        let (store, product_id, in_stock) = seeded(1000, 10);
        let dry = store
            .catalog()
            .add_sku(
                Sku::new(SkuId::new(EntityId::new()), product_id, "MUG-RED", Utc::now())
                    .unwrap()
                    .with_stock(0),
            )
            .unwrap();

        let mut cart = Cart::new();
        cart.add(in_stock, 2, 10);
        cart.add(dry, 1, 1); // clamp bypassed deliberately: stock vanished after carting

        let err = store.checkout(&cart, &customer()).unwrap_err();
        match err {
            CheckoutError::Rejected(CheckoutRejection::InsufficientStock { .. }) => {}
            other => panic!("Expected InsufficientStock rejection, got {other:?}"),
        }
        // Atomicity: the fulfillable line must not have been deducted.
        assert_eq!(store.orders().count().unwrap(), 0);
        assert_eq!(store.catalog().sku(in_stock).unwrap().unwrap().on_hand(), 10);
    }

    #[test]
    fn price_snapshot_survives_catalog_price_change() {
        let (store, product_id, sku_id) = seeded(1299, 10);
        let cart = cart_with(&store, sku_id, 2);

        let order = store.checkout(&cart, &customer()).unwrap();
        store
            .catalog()
            .update_product_price(product_id, 9999, Utc::now())
            .unwrap();

        let items = store.orders().items_of(order.id_typed()).unwrap();
        assert_eq!(items[0].price_cents(), 1299);
        assert_eq!(order.total_cents(), 2 * 1299);
        // The catalog moved on; the ledger did not.
        assert_eq!(
            store.catalog().product(product_id).unwrap().unwrap().price_cents(),
            9999
        );
    }

    #[test]
    fn order_total_is_sum_of_line_totals() {
        let (store, product_id, first) = seeded(1299, 10);
        let second = store
            .catalog()
            .add_sku(
                Sku::new(SkuId::new(EntityId::new()), product_id, "MUG-RED", Utc::now())
                    .unwrap()
                    .with_stock(4),
            )
            .unwrap();

        let mut cart = Cart::new();
        cart.add(first, 3, 10);
        cart.add(second, 2, 4);

        let order = store.checkout(&cart, &customer()).unwrap();
        let items = store.orders().items_of(order.id_typed()).unwrap();
        let total: u64 = items.iter().map(|item| item.line_total_cents()).sum();
        assert_eq!(order.total_cents(), total);
        assert_eq!(items.len(), 2);
        for item in &items {
            assert_eq!(
                item.line_total_cents(),
                item.price_cents() * item.quantity() as u64
            );
        }
    }

    #[test]
    fn cancel_and_restock_returns_stock_once() {
        let (store, _, sku_id) = seeded(500, 5);
        let cart = cart_with(&store, sku_id, 3);
        let order = store.checkout(&cart, &customer()).unwrap();
        assert_eq!(store.catalog().sku(sku_id).unwrap().unwrap().on_hand(), 2);

        let canceled = store.cancel_and_restock(&[order.id_typed()]).unwrap();
        assert_eq!(canceled, 1);
        assert_eq!(store.catalog().sku(sku_id).unwrap().unwrap().on_hand(), 5);
        assert_eq!(
            store.orders().order(order.id_typed()).unwrap().unwrap().status(),
            OrderStatus::Canceled
        );

        // Canceling again is a no-op.
        let canceled = store.cancel_and_restock(&[order.id_typed()]).unwrap();
        assert_eq!(canceled, 0);
        assert_eq!(store.catalog().sku(sku_id).unwrap().unwrap().on_hand(), 5);
    }

    #[test]
    fn concurrent_checkouts_never_oversell() {
        // 10 units, 8 threads each wanting 3: at most 3 can win.
        let (store, _, sku_id) = seeded(500, 10);
        let store = Arc::new(store);
        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let mut cart = Cart::new();
                    cart.add(sku_id, 3, 10);
                    barrier.wait();
                    store.checkout(&cart, &customer()).is_ok()
                })
            })
            .collect();

        let committed = handles
            .into_iter()
            .map(|handle| handle.join())
            .filter(|result| matches!(result, Ok(true)))
            .count();

        assert_eq!(committed, 3, "exactly floor(10/3) checkouts can win");
        let sku = store.catalog().sku(sku_id).unwrap().unwrap();
        assert_eq!(sku.on_hand(), 10 - 3 * committed as i64);
        assert!(sku.on_hand() - sku.reserved() >= 0);
        assert_eq!(store.orders().count().unwrap(), committed);
    }

    #[test]
    fn concurrent_cancel_and_checkout_stay_consistent() {
        // A canceled order's stock flows back and can be re-sold, never
        // double-counted.
        let (store, _, sku_id) = seeded(500, 2);
        let first = store
            .checkout(&cart_with(&store, sku_id, 2), &customer())
            .unwrap();
        let store = Arc::new(store);
        let barrier = Arc::new(Barrier::new(2));

        let canceler = {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let order_id = first.id_typed();
            thread::spawn(move || {
                barrier.wait();
                store.cancel_and_restock(&[order_id]).unwrap()
            })
        };
        let buyer = {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut cart = Cart::new();
                cart.add(sku_id, 2, 2);
                barrier.wait();
                store.checkout(&cart, &customer()).is_ok()
            })
        };

        let canceled = canceler.join().unwrap();
        let bought = buyer.join().unwrap();
        assert_eq!(canceled, 1);

        let sku = store.catalog().sku(sku_id).unwrap().unwrap();
        // Either the buyer lost the race (stock back to 2) or won after
        // the restock (stock back to 0); both are consistent.
        if bought {
            assert_eq!(sku.on_hand(), 0);
        } else {
            assert_eq!(sku.on_hand(), 2);
        }
    }

    #[test]
    fn removal_is_blocked_while_ledger_references_rows() {
        let (store, product_id, sku_id) = seeded(500, 5);
        store
            .checkout(&cart_with(&store, sku_id, 1), &customer())
            .unwrap();

        assert!(store.remove_sku(sku_id).is_err());
        assert!(store.remove_product(product_id).is_err());
        // Still present.
        assert!(store.catalog().sku(sku_id).unwrap().is_some());
    }
}
