//! Order ledger domain: committed orders, their items, and the customer
//! details captured at checkout.
//!
//! Orders and items are created exactly once, as a unit, by the checkout
//! transaction, and are read-only from that path afterwards. Status
//! transitions belong to order management.

pub mod customer;
pub mod order;

pub use customer::CustomerDetails;
pub use order::{Order, OrderId, OrderItem, OrderItemId, OrderStatus};
