use rust_decimal::Decimal;

use bodega_catalog::{Product, Sku, SkuId};

use crate::cart::Cart;

/// Read-only access to the catalog, as the snapshot builder needs it.
///
/// Implementations hand back point-in-time clones. The builder performs no
/// locking and no mutation; it is explicitly allowed to race with
/// concurrent catalog/stock writers, because checkout re-establishes
/// correctness under lock.
pub trait CatalogReader {
    /// The SKU together with its owning product, if the SKU exists.
    fn sku_with_product(&self, sku_id: SkuId) -> Option<(Sku, Product)>;
}

/// One resolved, priced cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub sku: Sku,
    pub product: Product,
    pub quantity: i64,
    /// Unit price as an exact decimal, for display.
    pub price: Decimal,
    pub line_total: Decimal,
    /// Sellable stock at snapshot time.
    pub available: i64,
}

impl Cart {
    /// Resolve the cart against the catalog into priced line views.
    ///
    /// Finite and restartable: calling it again re-reads the catalog.
    /// Stale lines (SKU no longer present) are dropped silently, treated
    /// as already removed. Inactive SKUs are kept; rejecting
    /// them is checkout's job, under lock.
    pub fn lines<R: CatalogReader>(&self, catalog: &R) -> Vec<CartLine> {
        self.entries()
            .filter_map(|(sku_id, quantity)| {
                let (sku, product) = catalog.sku_with_product(sku_id)?;
                let price = product.price();
                let line_total = price * Decimal::from(quantity);
                let available = sku.available();
                Some(CartLine {
                    sku,
                    product,
                    quantity,
                    price,
                    line_total,
                    available,
                })
            })
            .collect()
    }

    /// Cart total over the resolved lines, in exact decimal arithmetic.
    pub fn total<R: CatalogReader>(&self, catalog: &R) -> Decimal {
        self.lines(catalog).iter().map(|line| line.line_total).sum()
    }
}
