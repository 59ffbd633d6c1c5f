use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bodega_core::{DomainError, DomainResult, Entity, EntityId};

use crate::slug::slugify;

/// Category identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CategoryId(pub EntityId);

impl CategoryId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Catalog category. Long-lived; mutated by catalog management only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    slug: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Category {
    /// Create an active category; the slug is derived from the name.
    pub fn new(
        id: CategoryId,
        name: impl Into<String>,
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
            name,
            slug,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
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

    pub fn id_typed(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
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

    pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.is_active = active;
        self.updated_at = now;
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
