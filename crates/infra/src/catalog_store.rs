//! In-memory catalog store: categories, products, and lockable SKU rows.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};

use bodega_cart::CatalogReader;
use bodega_catalog::{Category, CategoryId, Product, ProductId, Sku, SkuId};
use bodega_core::DomainError;

use crate::error::{StorageError, StoreError};

/// In-memory catalog.
///
/// SKU rows sit behind individual mutexes so concurrent checkouts touching
/// disjoint SKUs proceed in parallel; the outer maps are locked only long
/// enough to fetch row handles or clone snapshots, never across a
/// validation window.
#[derive(Debug, Default)]
pub struct CatalogStore {
    categories: RwLock<HashMap<CategoryId, Category>>,
    products: RwLock<HashMap<ProductId, Product>>,
    skus: RwLock<HashMap<SkuId, Arc<Mutex<Sku>>>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- categories ----

    /// Insert a category; name and slug must be unique.
    pub fn add_category(&self, category: Category) -> Result<CategoryId, StoreError> {
        let mut categories = self
            .categories
            .write()
            .map_err(|_| StorageError::Poisoned("categories"))?;
        if categories
            .values()
            .any(|c| c.name() == category.name() || c.slug() == category.slug())
        {
            return Err(DomainError::conflict("category name or slug already exists").into());
        }
        let id = category.id_typed();
        categories.insert(id, category);
        Ok(id)
    }

    pub fn category(&self, id: CategoryId) -> Result<Option<Category>, StorageError> {
        let categories = self
            .categories
            .read()
            .map_err(|_| StorageError::Poisoned("categories"))?;
        Ok(categories.get(&id).cloned())
    }

    /// Remove a category; blocked while any product references it.
    pub fn remove_category(&self, id: CategoryId) -> Result<(), StoreError> {
        let products = self
            .products
            .read()
            .map_err(|_| StorageError::Poisoned("products"))?;
        if products.values().any(|p| p.category_id() == id) {
            return Err(DomainError::conflict("category is referenced by products").into());
        }
        drop(products);
        let mut categories = self
            .categories
            .write()
            .map_err(|_| StorageError::Poisoned("categories"))?;
        if categories.remove(&id).is_none() {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    // ---- products ----

    /// Insert a product; its category must exist and its slug be unique.
    pub fn add_product(&self, product: Product) -> Result<ProductId, StoreError> {
        let categories = self
            .categories
            .read()
            .map_err(|_| StorageError::Poisoned("categories"))?;
        if !categories.contains_key(&product.category_id()) {
            return Err(DomainError::not_found().into());
        }
        drop(categories);

        let mut products = self
            .products
            .write()
            .map_err(|_| StorageError::Poisoned("products"))?;
        if products.values().any(|p| p.slug() == product.slug()) {
            return Err(DomainError::conflict("product slug already exists").into());
        }
        let id = product.id_typed();
        products.insert(id, product);
        Ok(id)
    }

    pub fn product(&self, id: ProductId) -> Result<Option<Product>, StorageError> {
        let products = self
            .products
            .read()
            .map_err(|_| StorageError::Poisoned("products"))?;
        Ok(products.get(&id).cloned())
    }

    /// Active products, sorted by name.
    pub fn list_active_products(&self) -> Result<Vec<Product>, StorageError> {
        let products = self
            .products
            .read()
            .map_err(|_| StorageError::Poisoned("products"))?;
        let mut active: Vec<Product> = products
            .values()
            .filter(|p| p.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(active)
    }

    pub fn update_product_price(
        &self,
        id: ProductId,
        price_cents: u64,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut products = self
            .products
            .write()
            .map_err(|_| StorageError::Poisoned("products"))?;
        let product = products.get_mut(&id).ok_or_else(DomainError::not_found)?;
        product.set_price_cents(price_cents, now);
        Ok(())
    }

    pub fn set_product_active(
        &self,
        id: ProductId,
        active: bool,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut products = self
            .products
            .write()
            .map_err(|_| StorageError::Poisoned("products"))?;
        let product = products.get_mut(&id).ok_or_else(DomainError::not_found)?;
        product.set_active(active, now);
        Ok(())
    }

    /// Remove a product together with its SKUs.
    ///
    /// Referential checks against the order ledger live on `Storefront`;
    /// this only performs the cascade.
    pub(crate) fn remove_product_cascade(&self, id: ProductId) -> Result<(), StoreError> {
        let mut products = self
            .products
            .write()
            .map_err(|_| StorageError::Poisoned("products"))?;
        let mut skus = self.skus.write().map_err(|_| StorageError::Poisoned("skus"))?;
        if products.remove(&id).is_none() {
            return Err(DomainError::not_found().into());
        }
        skus.retain(|_, row| match row.lock() {
            Ok(sku) => sku.product_id() != id,
            Err(_) => true,
        });
        Ok(())
    }

    // ---- SKUs ----

    /// Insert a SKU; its product must exist and its code be unique.
    pub fn add_sku(&self, sku: Sku) -> Result<SkuId, StoreError> {
        let products = self
            .products
            .read()
            .map_err(|_| StorageError::Poisoned("products"))?;
        if !products.contains_key(&sku.product_id()) {
            return Err(DomainError::not_found().into());
        }
        drop(products);

        let mut skus = self.skus.write().map_err(|_| StorageError::Poisoned("skus"))?;
        for row in skus.values() {
            let existing = row.lock().map_err(|_| StorageError::Poisoned("sku row"))?;
            if existing.code() == sku.code() {
                return Err(DomainError::conflict("SKU code already exists").into());
            }
        }
        let id = sku.id_typed();
        skus.insert(id, Arc::new(Mutex::new(sku)));
        Ok(id)
    }

    /// Point-in-time clone of a SKU row.
    pub fn sku(&self, id: SkuId) -> Result<Option<Sku>, StorageError> {
        let skus = self.skus.read().map_err(|_| StorageError::Poisoned("skus"))?;
        match skus.get(&id) {
            None => Ok(None),
            Some(row) => {
                let sku = row.lock().map_err(|_| StorageError::Poisoned("sku row"))?;
                Ok(Some(sku.clone()))
            }
        }
    }

    /// The product's SKUs, sorted by code.
    pub fn skus_of_product(&self, id: ProductId) -> Result<Vec<Sku>, StorageError> {
        let skus = self.skus.read().map_err(|_| StorageError::Poisoned("skus"))?;
        let mut found = Vec::new();
        for row in skus.values() {
            let sku = row.lock().map_err(|_| StorageError::Poisoned("sku row"))?;
            if sku.product_id() == id {
                found.push(sku.clone());
            }
        }
        drop(skus);
        found.sort_by(|a, b| a.code().cmp(b.code()));
        Ok(found)
    }

    /// Sum of available stock over the product's SKUs.
    pub fn product_stock_available(&self, id: ProductId) -> Result<i64, StorageError> {
        Ok(self.skus_of_product(id)?.iter().map(Sku::available).sum())
    }

    pub fn set_sku_active(
        &self,
        id: SkuId,
        active: bool,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.with_sku_row(id, |sku| sku.set_active(active, now))
    }

    /// Admin adjustment of a SKU's stock counters.
    pub fn set_sku_stock(
        &self,
        id: SkuId,
        on_hand: i64,
        reserved: i64,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.with_sku_row(id, |sku| sku.set_stock(on_hand, reserved, now))
    }

    pub(crate) fn remove_sku_row(&self, id: SkuId) -> Result<(), StoreError> {
        let mut skus = self.skus.write().map_err(|_| StorageError::Poisoned("skus"))?;
        if skus.remove(&id).is_none() {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    /// Row handles for the given SKU ids, deduplicated and sorted in
    /// ascending id order so every caller acquires row locks in the same
    /// order. Ids with no row are skipped; the caller decides what their
    /// absence means.
    pub(crate) fn sku_handles(
        &self,
        ids: &[SkuId],
    ) -> Result<Vec<(SkuId, Arc<Mutex<Sku>>)>, StorageError> {
        let skus = self.skus.read().map_err(|_| StorageError::Poisoned("skus"))?;
        let mut wanted: Vec<SkuId> = ids.to_vec();
        wanted.sort();
        wanted.dedup();
        Ok(wanted
            .into_iter()
            .filter_map(|id| skus.get(&id).map(|row| (id, Arc::clone(row))))
            .collect())
    }

    fn with_sku_row(
        &self,
        id: SkuId,
        mutate: impl FnOnce(&mut Sku),
    ) -> Result<(), StoreError> {
        let skus = self.skus.read().map_err(|_| StorageError::Poisoned("skus"))?;
        let row = skus.get(&id).ok_or_else(DomainError::not_found)?;
        let mut sku = row.lock().map_err(|_| StorageError::Poisoned("sku row"))?;
        mutate(&mut sku);
        Ok(())
    }
}

impl CatalogReader for CatalogStore {
    fn sku_with_product(&self, sku_id: SkuId) -> Option<(Sku, Product)> {
        let sku = self.sku(sku_id).ok()??;
        let product = self.product(sku.product_id()).ok()??;
        Some((sku, product))
    }
}
