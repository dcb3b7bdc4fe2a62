// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Persistence gateway.
//!
//! One repository trait per entity, all object-safe and `Send + Sync` so
//! handlers can hold the store behind an `Arc`.
//!
//! | Implementation | Backing | Used by |
//! |----------------|---------|---------|
//! | `sqlx::PgPool` | PostgreSQL | the server when a database URL is set |
//! | [`MemoryStore`] | `tokio::sync::RwLock` tables | tests, local runs |
//!
//! # Guarantees
//!
//! - `list_*` returns records ordered by `created_at` ascending.
//! - `create_*` assigns a UUID v4 and sets `created_at == updated_at`.
//! - `update_*` returns `None` for an unknown id and otherwise bumps
//!   `updated_at` strictly past its previous value.
//! - Deleting a product or ingredient removes its association rows in the
//!   same transaction.
//! - `detach` is idempotent.

mod memory;
mod postgres;

use async_trait::async_trait;
use elabel_core::EntityKind;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;

use crate::schema::{
    Ingredient, IngredientData, IngredientPatch, Product, ProductData, ProductIngredient, ProductPatch
};

/// Failure inside the persistence gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database driver failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An association referenced a record that does not exist.
    #[error("{kind} {id} does not exist")]
    MissingReference { kind: EntityKind, id: Uuid },

    /// The ingredient is already attached to the product.
    #[error("ingredient {ingredient_id} is already attached to product {product_id}")]
    DuplicateAssociation { product_id: Uuid, ingredient_id: Uuid },

    /// A stored row could not be turned back into a record.
    #[error("corrupt {kind} row: {reason}")]
    Corrupt { kind: EntityKind, reason: String }
}

/// Product persistence.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products, oldest first.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

    async fn create_product(&self, data: ProductData) -> Result<Product, StoreError>;

    /// Merge `patch` into the stored product. `None` if the id is unknown.
    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, StoreError>;

    /// Delete the product and its association rows. `false` if nothing was
    /// stored under `id`.
    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Ingredient persistence.
#[async_trait]
pub trait IngredientRepository: Send + Sync {
    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, StoreError>;

    async fn find_ingredient(&self, id: Uuid) -> Result<Option<Ingredient>, StoreError>;

    async fn create_ingredient(&self, data: IngredientData) -> Result<Ingredient, StoreError>;

    async fn update_ingredient(&self, id: Uuid, patch: IngredientPatch) -> Result<Option<Ingredient>, StoreError>;

    async fn delete_ingredient(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Product ↔ ingredient links.
#[async_trait]
pub trait AssociationRepository: Send + Sync {
    /// Association rows of one product, oldest first.
    async fn list_associations(&self, product_id: Uuid) -> Result<Vec<ProductIngredient>, StoreError>;

    /// Link an ingredient to a product.
    ///
    /// Fails with [`StoreError::MissingReference`] if either side is
    /// unknown and [`StoreError::DuplicateAssociation`] if already linked.
    async fn attach(
        &self,
        product_id: Uuid,
        ingredient_id: Uuid,
        quantity: Option<String>,
        unit: Option<String>
    ) -> Result<ProductIngredient, StoreError>;

    /// Remove a link, returning the number of rows removed.
    async fn detach(&self, product_id: Uuid, ingredient_id: Uuid) -> Result<u64, StoreError>;
}

/// Everything the HTTP layer needs from a backend.
pub trait Store: ProductRepository + IngredientRepository + AssociationRepository + 'static {}

impl<T> Store for T where T: ProductRepository + IngredientRepository + AssociationRepository + 'static {}
