use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bodega_core::{DomainError, DomainResult, Entity, EntityId};

use crate::product::ProductId;

/// SKU identifier.
///
/// Ordered; lock acquisition over multiple SKUs always happens in
/// ascending id order.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SkuId(pub EntityId);

impl SkuId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for SkuId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Sellable stock-keeping unit (a concrete variant of a product), carrying
/// the stock ledger for that variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    id: SkuId,
    product_id: ProductId,
    code: String,
    /// Physical units in inventory. Only external data corruption can make
    /// this negative; no ledger operation does.
    on_hand: i64,
    /// Units notionally held against outstanding activity. Consulted by
    /// `available` but never incremented by any current path; carts do
    /// not reserve stock. Kept as headroom for a future hold step.
    reserved: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Sku {
    /// Create an active SKU with empty stock.
    pub fn new(
        id: SkuId,
        product_id: ProductId,
        code: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(DomainError::validation("code cannot be empty"));
        }
        Ok(Self {
            id,
            product_id,
            code,
            on_hand: 0,
            reserved: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_stock(mut self, on_hand: i64) -> Self {
        self.on_hand = on_hand;
        self
    }

    pub fn id_typed(&self) -> SkuId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn on_hand(&self) -> i64 {
        self.on_hand
    }

    pub fn reserved(&self) -> i64 {
        self.reserved
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sellable quantity: on-hand minus reserved, floored at zero.
    pub fn available(&self) -> i64 {
        (self.on_hand - self.reserved).max(0)
    }

    /// Whether `quantity` units could be sold right now.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        quantity > 0 && self.available() >= quantity
    }

    /// Reduce on-hand stock by `quantity`, floored at zero.
    ///
    /// The caller must already have established `can_fulfill` and must
    /// hold the row's lock; this performs no re-check and is not safe to
    /// call concurrently on the same SKU without external serialization.
    pub fn deduct(&mut self, quantity: i64, now: DateTime<Utc>) {
        self.on_hand = (self.on_hand - quantity.max(0)).max(0);
        self.updated_at = now;
    }

    /// Return units to on-hand stock (order cancellation).
    pub fn restock(&mut self, quantity: i64, now: DateTime<Utc>) {
        self.on_hand += quantity.max(0);
        self.updated_at = now;
    }

    pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.is_active = active;
        self.updated_at = now;
    }

    /// Admin adjustment of both counters.
    pub fn set_stock(&mut self, on_hand: i64, reserved: i64, now: DateTime<Utc>) {
        self.on_hand = on_hand;
        self.reserved = reserved;
        self.updated_at = now;
    }
}

impl Entity for Sku {
    type Id = SkuId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
