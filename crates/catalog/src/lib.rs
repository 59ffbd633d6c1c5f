//! Catalog domain: categories, products, SKUs and the stock ledger.
//!
//! Pure domain logic (no storage, no locking). Stock mutation goes through
//! the `Sku` ledger operations only; the checkout path in `bodega-infra`
//! is the sole writer of stock outside catalog management.

pub mod category;
pub mod product;
pub mod sku;
pub mod slug;

pub use category::{Category, CategoryId};
pub use product::{Product, ProductId};
pub use sku::{Sku, SkuId};
pub use slug::slugify;
