//! The assembled storefront: catalog plus order ledger.

use bodega_core::DomainError;
use bodega_catalog::{ProductId, SkuId};

use crate::catalog_store::CatalogStore;
use crate::error::StoreError;
use crate::order_store::OrderStore;

/// Catalog rows and the order ledger behind one value.
///
/// Shared across request threads behind `Arc`. Cross-store rules
/// (deletions blocked while the order ledger references a row, cascades
/// from product to SKU) live here so neither store can be driven into a
/// referentially broken state through this type.
#[derive(Debug, Default)]
pub struct Storefront {
    catalog: CatalogStore,
    orders: OrderStore,
}

impl Storefront {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn orders(&self) -> &OrderStore {
        &self.orders
    }

    /// Remove a product and cascade to its SKUs.
    ///
    /// Blocked while any order item references the product or one of its
    /// SKUs; historical price integrity depends on those rows surviving.
    pub fn remove_product(&self, id: ProductId) -> Result<(), StoreError> {
        if self.orders.references_product(id)? {
            return Err(DomainError::conflict("product is referenced by order items").into());
        }
        for sku in self.catalog.skus_of_product(id)? {
            if self.orders.references_sku(sku.id_typed())? {
                return Err(
                    DomainError::conflict("product SKU is referenced by order items").into(),
                );
            }
        }
        self.catalog.remove_product_cascade(id)
    }

    /// Remove a SKU; blocked while any order item references it.
    pub fn remove_sku(&self, id: SkuId) -> Result<(), StoreError> {
        if self.orders.references_sku(id)? {
            return Err(DomainError::conflict("SKU is referenced by order items").into());
        }
        self.catalog.remove_sku_row(id)
    }
}
