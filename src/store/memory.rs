// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! In-process store.
//!
//! Tables are plain vectors in insertion order behind one `RwLock`, so each
//! operation, including a cascading delete, is atomic.

use async_trait::async_trait;
use elabel_core::EntityKind;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AssociationRepository, IngredientRepository, ProductRepository, StoreError};
use crate::schema::{
    self, Ingredient, IngredientData, IngredientPatch, Product, ProductData, ProductIngredient, ProductPatch
};

#[derive(Debug, Default)]
struct Tables {
    products:     Vec<Product>,
    ingredients:  Vec<Ingredient>,
    associations: Vec<ProductIngredient>
}

/// Store that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.tables.read().await.products.clone())
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn create_product(&self, data: ProductData) -> Result<Product, StoreError> {
        let mut tables = self.tables.write().await;
        let now = schema::now();
        let product = Product {
            id: Uuid::new_v4(),
            data,
            created_at: now,
            updated_at: now
        };
        tables.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(product) = tables.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        patch.apply(&mut product.data);
        product.updated_at = schema::touched_after(product.updated_at);
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        tables.associations.retain(|a| a.product_id != id);
        Ok(tables.products.len() != before)
    }
}

#[async_trait]
impl IngredientRepository for MemoryStore {
    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, StoreError> {
        Ok(self.tables.read().await.ingredients.clone())
    }

    async fn find_ingredient(&self, id: Uuid) -> Result<Option<Ingredient>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.ingredients.iter().find(|i| i.id == id).cloned())
    }

    async fn create_ingredient(&self, data: IngredientData) -> Result<Ingredient, StoreError> {
        let mut tables = self.tables.write().await;
        let now = schema::now();
        let ingredient = Ingredient {
            id: Uuid::new_v4(),
            data,
            created_at: now,
            updated_at: now
        };
        tables.ingredients.push(ingredient.clone());
        Ok(ingredient)
    }

    async fn update_ingredient(&self, id: Uuid, patch: IngredientPatch) -> Result<Option<Ingredient>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(ingredient) = tables.ingredients.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        patch.apply(&mut ingredient.data);
        ingredient.updated_at = schema::touched_after(ingredient.updated_at);
        Ok(Some(ingredient.clone()))
    }

    async fn delete_ingredient(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.ingredients.len();
        tables.ingredients.retain(|i| i.id != id);
        tables.associations.retain(|a| a.ingredient_id != id);
        Ok(tables.ingredients.len() != before)
    }
}

#[async_trait]
impl AssociationRepository for MemoryStore {
    async fn list_associations(&self, product_id: Uuid) -> Result<Vec<ProductIngredient>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .associations
            .iter()
            .filter(|a| a.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn attach(
        &self,
        product_id: Uuid,
        ingredient_id: Uuid,
        quantity: Option<String>,
        unit: Option<String>
    ) -> Result<ProductIngredient, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.products.iter().any(|p| p.id == product_id) {
            return Err(StoreError::MissingReference {
                kind: EntityKind::Product,
                id:   product_id
            });
        }
        if !tables.ingredients.iter().any(|i| i.id == ingredient_id) {
            return Err(StoreError::MissingReference {
                kind: EntityKind::Ingredient,
                id:   ingredient_id
            });
        }
        if tables
            .associations
            .iter()
            .any(|a| a.product_id == product_id && a.ingredient_id == ingredient_id)
        {
            return Err(StoreError::DuplicateAssociation {
                product_id,
                ingredient_id
            });
        }
        let link = ProductIngredient {
            id: Uuid::new_v4(),
            product_id,
            ingredient_id,
            quantity,
            unit,
            created_at: schema::now()
        };
        tables.associations.push(link.clone());
        Ok(link)
    }

    async fn detach(&self, product_id: Uuid, ingredient_id: Uuid) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.associations.len();
        tables
            .associations
            .retain(|a| !(a.product_id == product_id && a.ingredient_id == ingredient_id));
        Ok((before - tables.associations.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{IngredientCategory, WineType};

    fn product(name: &str) -> ProductData {
        ProductData {
            name: name.into(),
            ..ProductData::default()
        }
    }

    fn ingredient(name: &str) -> IngredientData {
        IngredientData {
            name: name.into(),
            category: IngredientCategory::Preservative,
            ..IngredientData::default()
        }
    }

    #[tokio::test]
    async fn create_sets_equal_timestamps() {
        let store = MemoryStore::new();
        let p = store.create_product(product("A")).await.unwrap();
        assert_eq!(p.created_at, p.updated_at);
        assert_eq!(store.find_product(p.id).await.unwrap(), Some(p));
    }

    #[tokio::test]
    async fn list_keeps_creation_order() {
        let store = MemoryStore::new();
        for name in ["A", "B", "C"] {
            store.create_product(product(name)).await.unwrap();
        }
        let names: Vec<_> = store
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.data.name)
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_stay_in_timestamp_order() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let tasks: Vec<_> = (0..64)
            .map(|n| {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move { store.create_product(product(&n.to_string())).await.unwrap() })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let products = store.list_products().await.unwrap();
        assert_eq!(products.len(), 64);
        assert!(products.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[tokio::test]
    async fn update_bumps_timestamp_and_merges() {
        let store = MemoryStore::new();
        let p = store.create_product(product("A")).await.unwrap();
        let patch = ProductPatch {
            wine_type: Some(Some(WineType::White)),
            ..ProductPatch::default()
        };
        let updated = store.update_product(p.id, patch).await.unwrap().unwrap();
        assert!(updated.updated_at > p.updated_at);
        assert_eq!(updated.created_at, p.created_at);
        assert_eq!(updated.data.wine_type, Some(WineType::White));
        assert_eq!(updated.data.name, "A");
    }

    #[tokio::test]
    async fn update_unknown_is_none() {
        let store = MemoryStore::new();
        let result = store
            .update_ingredient(Uuid::new_v4(), IngredientPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn attach_checks_references_and_uniqueness() {
        let store = MemoryStore::new();
        let p = store.create_product(product("A")).await.unwrap();
        let i = store.create_ingredient(ingredient("E220")).await.unwrap();

        let missing = store.attach(p.id, Uuid::new_v4(), None, None).await;
        assert!(matches!(
            missing,
            Err(StoreError::MissingReference {
                kind: EntityKind::Ingredient,
                ..
            })
        ));

        store.attach(p.id, i.id, Some("30".into()), Some("mg/l".into())).await.unwrap();
        let duplicate = store.attach(p.id, i.id, None, None).await;
        assert!(matches!(duplicate, Err(StoreError::DuplicateAssociation { .. })));
    }

    #[tokio::test]
    async fn deleting_ingredient_cascades() {
        let store = MemoryStore::new();
        let a = store.create_product(product("A")).await.unwrap();
        let b = store.create_product(product("B")).await.unwrap();
        let i = store.create_ingredient(ingredient("E220")).await.unwrap();
        store.attach(a.id, i.id, None, None).await.unwrap();
        store.attach(b.id, i.id, None, None).await.unwrap();

        assert!(store.delete_ingredient(i.id).await.unwrap());
        assert!(store.list_associations(a.id).await.unwrap().is_empty());
        assert!(store.list_associations(b.id).await.unwrap().is_empty());
        assert!(!store.delete_ingredient(i.id).await.unwrap());
    }

    #[tokio::test]
    async fn detach_is_idempotent() {
        let store = MemoryStore::new();
        let p = store.create_product(product("A")).await.unwrap();
        let i = store.create_ingredient(ingredient("E220")).await.unwrap();
        store.attach(p.id, i.id, None, None).await.unwrap();
        assert_eq!(store.detach(p.id, i.id).await.unwrap(), 1);
        assert_eq!(store.detach(p.id, i.id).await.unwrap(), 0);
    }
}
