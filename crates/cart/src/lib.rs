//! Shopping cart: an explicit, session-owned value plus the snapshot
//! builder that resolves it against the catalog.
//!
//! The cart itself never touches persisted stock; it only manipulates its
//! own SKU→quantity mapping, clamped against availability figures supplied
//! by the caller. Correctness against concurrently-changing stock is
//! re-established at checkout time, not here.

pub mod cart;
pub mod snapshot;

pub use cart::{Cart, parse_quantity};
pub use snapshot::{CartLine, CatalogReader};
