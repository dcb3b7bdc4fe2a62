// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `PgPool` repositories. Each test gets a fresh migrated database from
//! `DATABASE_URL`; run with `cargo test -- --ignored`.

use elabel::{
    schema::{IngredientCategory, IngredientData, IngredientPatch, ProductData, ProductPatch, WineType},
    store::{AssociationRepository, IngredientRepository, ProductRepository, StoreError}
};
use elabel_core::EntityKind;
use sqlx::PgPool;
use uuid::Uuid;

fn product(name: &str) -> ProductData {
    ProductData {
        name: name.into(),
        wine_type: Some(WineType::Red),
        ..ProductData::default()
    }
}

fn ingredient(name: &str) -> IngredientData {
    IngredientData {
        name: name.into(),
        category: IngredientCategory::Preservative,
        e_number: Some("E220".into()),
        other_ingredient_detail: None,
        allergens: vec!["sulphites".into()]
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn create_and_read_back(pool: PgPool) {
    let created = pool.create_product(product("Château Test")).await.unwrap();
    assert_eq!(created.created_at, created.updated_at);

    let found = pool.find_product(created.id).await.unwrap().unwrap();
    assert_eq!(found, created);
    assert_eq!(pool.list_products().await.unwrap(), vec![created]);
    assert!(pool.find_product(Uuid::new_v4()).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn update_touches_only_patched_fields(pool: PgPool) {
    let created = pool.create_product(product("X")).await.unwrap();
    let patch = ProductPatch {
        brand: Some(Some("NewBrand".into())),
        ..ProductPatch::default()
    };

    let updated = pool.update_product(created.id, patch).await.unwrap().unwrap();
    assert_eq!(updated.data.brand.as_deref(), Some("NewBrand"));
    assert_eq!(updated.data.wine_type, Some(WineType::Red));
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    let missing = pool.update_product(Uuid::new_v4(), ProductPatch::default()).await.unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn ingredient_allergens_round_trip(pool: PgPool) {
    let created = pool.create_ingredient(ingredient("Sulphur dioxide")).await.unwrap();
    let patch = IngredientPatch {
        category: Some(IngredientCategory::Antioxidant),
        allergens: Some(vec!["sulphites".into(), "sulfites".into()]),
        ..IngredientPatch::default()
    };
    let updated = pool.update_ingredient(created.id, patch).await.unwrap().unwrap();
    assert_eq!(updated.data.category, IngredientCategory::Antioxidant);
    assert_eq!(updated.data.allergens, ["sulphites", "sulfites"]);
    assert_eq!(updated.data.e_number.as_deref(), Some("E220"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn attach_rejects_unknown_and_duplicate(pool: PgPool) {
    let p = pool.create_product(product("X")).await.unwrap();
    let i = pool.create_ingredient(ingredient("E220")).await.unwrap();

    let unknown = Uuid::new_v4();
    let err = pool.attach(p.id, unknown, None, None).await.unwrap_err();
    assert!(matches!(err, StoreError::MissingReference { kind: EntityKind::Ingredient, id } if id == unknown));
    let err = pool.attach(unknown, i.id, None, None).await.unwrap_err();
    assert!(matches!(err, StoreError::MissingReference { kind: EntityKind::Product, .. }));

    let link = pool.attach(p.id, i.id, Some("30".into()), Some("mg/l".into())).await.unwrap();
    assert_eq!(link.quantity.as_deref(), Some("30"));
    let err = pool.attach(p.id, i.id, None, None).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateAssociation { .. }));

    assert_eq!(pool.detach(p.id, i.id).await.unwrap(), 1);
    assert_eq!(pool.detach(p.id, i.id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn deletes_cascade_to_links(pool: PgPool) {
    let a = pool.create_product(product("A")).await.unwrap();
    let b = pool.create_product(product("B")).await.unwrap();
    let i = pool.create_ingredient(ingredient("E220")).await.unwrap();
    pool.attach(a.id, i.id, None, None).await.unwrap();
    pool.attach(b.id, i.id, None, None).await.unwrap();

    assert!(pool.delete_ingredient(i.id).await.unwrap());
    assert!(pool.list_associations(a.id).await.unwrap().is_empty());
    assert!(pool.list_associations(b.id).await.unwrap().is_empty());

    let j = pool.create_ingredient(ingredient("E224")).await.unwrap();
    pool.attach(a.id, j.id, None, None).await.unwrap();
    assert!(pool.delete_product(a.id).await.unwrap());
    assert!(pool.list_associations(a.id).await.unwrap().is_empty());
    assert!(pool.find_ingredient(j.id).await.unwrap().is_some());

    assert!(!pool.delete_product(a.id).await.unwrap());
}
