use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bodega_catalog::{ProductId, SkuId};
use bodega_core::{DomainError, DomainResult, Entity, EntityId, Price};

use crate::customer::CustomerDetails;

/// Order identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OrderId(pub EntityId);

impl OrderId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order item identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OrderItemId(pub EntityId);

impl OrderItemId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order status lifecycle.
///
/// Checkout only ever produces `New`; the other transitions belong to
/// order management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    New,
    Paid,
    Shipped,
    Canceled,
}

/// Committed order header.
///
/// Created atomically with its items by the checkout transaction and
/// never partially persisted; read-only from the checkout path afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer: CustomerDetails,
    status: OrderStatus,
    /// Sum of the items' line totals, fixed at creation.
    total_cents: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Assemble a new order header (status `New`).
    pub fn new(
        id: OrderId,
        customer: CustomerDetails,
        total_cents: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            customer,
            status: OrderStatus::New,
            total_cents,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn customer(&self) -> &CustomerDetails {
        &self.customer
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn total_cents(&self) -> u64 {
        self.total_cents
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_canceled(&self) -> bool {
        self.status == OrderStatus::Canceled
    }

    /// `New` → `Paid`.
    pub fn mark_paid(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != OrderStatus::New {
            return Err(DomainError::conflict("only new orders can be marked paid"));
        }
        self.status = OrderStatus::Paid;
        self.updated_at = now;
        Ok(())
    }

    /// `Paid` → `Shipped`.
    pub fn mark_shipped(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != OrderStatus::Paid {
            return Err(DomainError::conflict("only paid orders can be shipped"));
        }
        self.status = OrderStatus::Shipped;
        self.updated_at = now;
        Ok(())
    }

    /// Any non-canceled status → `Canceled`.
    pub fn mark_canceled(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_canceled() {
            return Err(DomainError::conflict("order is already canceled"));
        }
        self.status = OrderStatus::Canceled;
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// One purchased line.
///
/// `price_cents` is a snapshot of the unit price at purchase time and
/// stays fixed even if the product's catalog price later changes;
/// `line_total_cents` is computed once here and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    sku_id: SkuId,
    quantity: i64,
    price_cents: u64,
    line_total_cents: u64,
    created_at: DateTime<Utc>,
}

impl OrderItem {
    pub fn new(
        id: OrderItemId,
        order_id: OrderId,
        product_id: ProductId,
        sku_id: SkuId,
        quantity: i64,
        price_cents: u64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let line_total_cents = Price::from_cents(price_cents).line_total(quantity)?;
        Ok(Self {
            id,
            order_id,
            product_id,
            sku_id,
            quantity,
            price_cents,
            line_total_cents,
            created_at: now,
        })
    }

    pub fn id_typed(&self) -> OrderItemId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn sku_id(&self) -> SkuId {
        self.sku_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn price_cents(&self) -> u64 {
        self.price_cents
    }

    pub fn line_total_cents(&self) -> u64 {
        self.line_total_cents
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for OrderItem {
    type Id = OrderItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
