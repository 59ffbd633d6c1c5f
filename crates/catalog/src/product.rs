use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bodega_core::{DomainError, DomainResult, Entity, EntityId, Price};

use crate::category::CategoryId;
use crate::slug::slugify;

/// Product identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductId(pub EntityId);

impl ProductId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Catalog product. Owns zero or more SKUs; its price is the unit price
/// every SKU of the product sells at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    category_id: CategoryId,
    name: String,
    slug: String,
    description: String,
    /// Money is stored as integer cents, never floating point.
    price_cents: u64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    /// Create an active product; the slug is derived from the name.
    pub fn new(
        id: ProductId,
        category_id: CategoryId,
        name: impl Into<String>,
        price_cents: u64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(DomainError::validation(
                "name must contain at least one alphanumeric character",
            ));
        }
        Ok(Self {
            id,
            category_id,
            name,
            slug,
            description: String::new(),
            price_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replace the derived slug with an explicit one.
    pub fn with_slug(mut self, slug: impl Into<String>) -> DomainResult<Self> {
        let slug = slug.into();
        if slug.trim().is_empty() {
            return Err(DomainError::validation("slug cannot be empty"));
        }
        self.slug = slug;
        Ok(self)
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price_cents(&self) -> u64 {
        self.price_cents
    }

    /// Display price: exact decimal derived from the stored cents.
    pub fn price(&self) -> Decimal {
        Price::from_cents(self.price_cents).as_decimal()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn can_be_sold(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_price_cents(&mut self, price_cents: u64, now: DateTime<Utc>) {
        self.price_cents = price_cents;
        self.updated_at = now;
    }

    pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.is_active = active;
        self.updated_at = now;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product() -> Product {
        Product::new(
            ProductId::new(EntityId::new()),
            CategoryId::new(EntityId::new()),
            "Stoneware Teapot",
            4250,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn new_product_derives_slug_and_starts_active() {
        let product = test_product();
        assert_eq!(product.slug(), "stoneware-teapot");
        assert!(product.can_be_sold());
    }

    #[test]
    fn display_price_is_exact_decimal() {
        let product = test_product();
        assert_eq!(product.price().to_string(), "42.50");
    }

    #[test]
    fn price_change_touches_updated_at() {
        let mut product = test_product();
        let later = product.updated_at() + chrono::Duration::seconds(5);
        product.set_price_cents(3999, later);
        assert_eq!(product.price_cents(), 3999);
        assert_eq!(product.updated_at(), later);
    }

    #[test]
    fn deactivated_product_cannot_be_sold() {
        let mut product = test_product();
        product.set_active(false, Utc::now());
        assert!(!product.can_be_sold());
    }

    #[test]
    fn rejects_empty_name() {
        let err = Product::new(
            ProductId::new(EntityId::new()),
            CategoryId::new(EntityId::new()),
            "  ",
            100,
            Utc::now(),
        )
        .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }
}
