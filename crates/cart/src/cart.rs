use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use bodega_catalog::SkuId;
use bodega_core::{DomainError, DomainResult};

/// Session-owned shopping cart: SKU id → desired quantity.
///
/// An explicit value owned by the calling session; the session layer
/// serializes it (it round-trips through JSON) and passes it back in. The
/// core never stores a cart. Every mutation clamps the resulting quantity
/// into `[0, max_available]`, and a line whose quantity reaches zero is
/// removed.
///
/// The clamp is a soft guard for display purposes: available stock can
/// shrink between the clamp and checkout, so the authoritative check is
/// the lock-protected re-validation inside the checkout transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: BTreeMap<SkuId, i64>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units on top of the current line, clamped to
    /// `max_available`.
    pub fn add(&mut self, sku_id: SkuId, quantity: i64, max_available: i64) {
        let current = self.lines.get(&sku_id).copied().unwrap_or(0);
        self.store(sku_id, current.saturating_add(quantity), max_available);
    }

    /// Replace the line quantity, clamped to `max_available`.
    pub fn set(&mut self, sku_id: SkuId, quantity: i64, max_available: i64) {
        self.store(sku_id, quantity, max_available);
    }

    pub fn remove(&mut self, sku_id: SkuId) {
        self.lines.remove(&sku_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Quantity currently held for a SKU (0 when absent).
    pub fn quantity(&self, sku_id: SkuId) -> i64 {
        self.lines.get(&sku_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Lines in ascending SKU id order.
    pub fn entries(&self) -> impl Iterator<Item = (SkuId, i64)> + '_ {
        self.lines.iter().map(|(id, qty)| (*id, *qty))
    }

    fn store(&mut self, sku_id: SkuId, quantity: i64, max_available: i64) {
        let clamped = quantity.clamp(0, max_available.max(0));
        if clamped == 0 {
            self.lines.remove(&sku_id);
        } else {
            self.lines.insert(sku_id, clamped);
        }
    }
}

/// Parse a raw add-to-cart quantity.
///
/// Missing or non-numeric input defaults to 1; an explicit non-positive
/// quantity is rejected.
pub fn parse_quantity(raw: Option<&str>) -> DomainResult<i64> {
    let quantity = match raw {
        None => 1,
        Some(s) => s.trim().parse::<i64>().unwrap_or(1),
    };
    if quantity <= 0 {
        return Err(DomainError::validation("quantity must be positive"));
    }
    Ok(quantity)
}
