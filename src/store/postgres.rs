// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! PostgreSQL gateway.
//!
//! Repositories are implemented directly on [`sqlx::PgPool`]. Rows are read
//! into `*Row` structs and converted into records, rejecting enum labels the
//! schema does not know.
//!
//! Updates are read-modify-write under `SELECT ... FOR UPDATE` so
//! concurrent patches to the same row serialize; the last writer wins.

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use elabel_core::EntityKind;
use sqlx::{PgPool, Postgres, postgres::PgArguments, query::QueryAs};
use uuid::Uuid;

use super::{AssociationRepository, IngredientRepository, ProductRepository, StoreError};
use crate::schema::{
    self, Ingredient, IngredientCategory, IngredientData, IngredientPatch, Product, ProductData,
    ProductIngredient, ProductPatch, SugarContent, UnknownLabel, WineType
};

/// Product data columns, in binding order starting at `$2`.
const PRODUCT_DATA_COLUMNS: [&str; 30] = [
    "name",
    "brand",
    "net_volume",
    "vintage",
    "wine_type",
    "sugar_content",
    "appellation",
    "alcohol_content",
    "ingredients_text",
    "packaging_gases",
    "portion_size",
    "unit",
    "kcal",
    "kj",
    "fat",
    "carbohydrates",
    "organic",
    "vegetarian",
    "vegan",
    "operator_type",
    "operator_name",
    "operator_address",
    "additional_info",
    "country_of_origin",
    "sku",
    "ean",
    "barcode_link",
    "external_link",
    "redirect_link",
    "image"
];

/// Ingredient data columns, in binding order starting at `$2`.
const INGREDIENT_DATA_COLUMNS: [&str; 5] = ["name", "category", "e_number", "other_ingredient_detail", "allergens"];

const ASSOCIATION_COLUMNS: &str = "id, product_id, ingredient_id, quantity, unit, created_at";

/// Prebuilt statements for one table.
struct Statements {
    select:     String,
    for_update: String,
    insert:     String,
    update:     String
}

impl Statements {
    fn new(table: &str, data_columns: &[&str]) -> Self {
        let columns = format!("id, {}, created_at, updated_at", data_columns.join(", "));
        let n = data_columns.len();
        let placeholders: Vec<String> = (1..=n + 3).map(|i| format!("${i}")).collect();
        let assignments: Vec<String> = data_columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c} = ${}", i + 2))
            .collect();

        Self {
            select:     format!("SELECT {columns} FROM {table}"),
            for_update: format!("SELECT {columns} FROM {table} WHERE id = $1 FOR UPDATE"),
            insert:     format!(
                "INSERT INTO {table} ({columns}) VALUES ({}) RETURNING {columns}",
                placeholders.join(", ")
            ),
            update:     format!(
                "UPDATE {table} SET {}, updated_at = ${} WHERE id = $1 RETURNING {columns}",
                assignments.join(", "),
                n + 2
            )
        }
    }
}

static PRODUCTS: LazyLock<Statements> =
    LazyLock::new(|| Statements::new(EntityKind::Product.table(), &PRODUCT_DATA_COLUMNS));

static INGREDIENTS: LazyLock<Statements> =
    LazyLock::new(|| Statements::new(EntityKind::Ingredient.table(), &INGREDIENT_DATA_COLUMNS));

type RowQuery<'q, R> = QueryAs<'q, Postgres, R, PgArguments>;

fn corrupt(kind: EntityKind) -> impl Fn(UnknownLabel) -> StoreError {
    move |e| StoreError::Corrupt {
        kind,
        reason: e.to_string()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id:                Uuid,
    name:              String,
    brand:             Option<String>,
    net_volume:        Option<String>,
    vintage:           Option<String>,
    wine_type:         Option<String>,
    sugar_content:     Option<String>,
    appellation:       Option<String>,
    alcohol_content:   Option<String>,
    ingredients_text:  Option<String>,
    packaging_gases:   Option<String>,
    portion_size:      Option<String>,
    unit:              Option<String>,
    kcal:              Option<String>,
    kj:                Option<String>,
    fat:               Option<String>,
    carbohydrates:     Option<String>,
    organic:           bool,
    vegetarian:        bool,
    vegan:             bool,
    operator_type:     Option<String>,
    operator_name:     Option<String>,
    operator_address:  Option<String>,
    additional_info:   Option<String>,
    country_of_origin: Option<String>,
    sku:               Option<String>,
    ean:               Option<String>,
    barcode_link:      Option<String>,
    external_link:     Option<String>,
    redirect_link:     Option<String>,
    image:             Option<String>,
    created_at:        DateTime<Utc>,
    updated_at:        DateTime<Utc>
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let invalid = corrupt(EntityKind::Product);
        Ok(Self {
            id:         row.id,
            data:       ProductData {
                name:              row.name,
                brand:             row.brand,
                net_volume:        row.net_volume,
                vintage:           row.vintage,
                wine_type:         row.wine_type.map(|s| s.parse::<WineType>()).transpose().map_err(&invalid)?,
                sugar_content:     row.sugar_content.map(|s| s.parse::<SugarContent>()).transpose().map_err(&invalid)?,
                appellation:       row.appellation,
                alcohol_content:   row.alcohol_content,
                ingredients_text:  row.ingredients_text,
                packaging_gases:   row.packaging_gases,
                portion_size:      row.portion_size,
                unit:              row.unit,
                kcal:              row.kcal,
                kj:                row.kj,
                fat:               row.fat,
                carbohydrates:     row.carbohydrates,
                organic:           row.organic,
                vegetarian:        row.vegetarian,
                vegan:             row.vegan,
                operator_type:     row.operator_type,
                operator_name:     row.operator_name,
                operator_address:  row.operator_address,
                additional_info:   row.additional_info,
                country_of_origin: row.country_of_origin,
                sku:               row.sku,
                ean:               row.ean,
                barcode_link:      row.barcode_link,
                external_link:     row.external_link,
                redirect_link:     row.redirect_link,
                image:             row.image
            },
            created_at: row.created_at,
            updated_at: row.updated_at
        })
    }
}

/// Bind product data as `$2..=$31`.
fn bind_product(query: RowQuery<'_, ProductRow>, data: ProductData) -> RowQuery<'_, ProductRow> {
    query
        .bind(data.name)
        .bind(data.brand)
        .bind(data.net_volume)
        .bind(data.vintage)
        .bind(data.wine_type.map(|v| v.as_str()))
        .bind(data.sugar_content.map(|v| v.as_str()))
        .bind(data.appellation)
        .bind(data.alcohol_content)
        .bind(data.ingredients_text)
        .bind(data.packaging_gases)
        .bind(data.portion_size)
        .bind(data.unit)
        .bind(data.kcal)
        .bind(data.kj)
        .bind(data.fat)
        .bind(data.carbohydrates)
        .bind(data.organic)
        .bind(data.vegetarian)
        .bind(data.vegan)
        .bind(data.operator_type)
        .bind(data.operator_name)
        .bind(data.operator_address)
        .bind(data.additional_info)
        .bind(data.country_of_origin)
        .bind(data.sku)
        .bind(data.ean)
        .bind(data.barcode_link)
        .bind(data.external_link)
        .bind(data.redirect_link)
        .bind(data.image)
}

#[derive(Debug, sqlx::FromRow)]
struct IngredientRow {
    id:                      Uuid,
    name:                    String,
    category:                String,
    e_number:                Option<String>,
    other_ingredient_detail: Option<String>,
    allergens:               Vec<String>,
    created_at:              DateTime<Utc>,
    updated_at:              DateTime<Utc>
}

impl TryFrom<IngredientRow> for Ingredient {
    type Error = StoreError;

    fn try_from(row: IngredientRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id:         row.id,
            data:       IngredientData {
                name:                    row.name,
                category:                row.category.parse::<IngredientCategory>().map_err(corrupt(EntityKind::Ingredient))?,
                e_number:                row.e_number,
                other_ingredient_detail: row.other_ingredient_detail,
                allergens:               row.allergens
            },
            created_at: row.created_at,
            updated_at: row.updated_at
        })
    }
}

/// Bind ingredient data as `$2..=$6`.
fn bind_ingredient(query: RowQuery<'_, IngredientRow>, data: IngredientData) -> RowQuery<'_, IngredientRow> {
    query
        .bind(data.name)
        .bind(data.category.as_str())
        .bind(data.e_number)
        .bind(data.other_ingredient_detail)
        .bind(data.allergens)
}

#[derive(Debug, sqlx::FromRow)]
struct AssociationRow {
    id:            Uuid,
    product_id:    Uuid,
    ingredient_id: Uuid,
    quantity:      Option<String>,
    unit:          Option<String>,
    created_at:    DateTime<Utc>
}

impl From<AssociationRow> for ProductIngredient {
    fn from(row: AssociationRow) -> Self {
        Self {
            id:            row.id,
            product_id:    row.product_id,
            ingredient_id: row.ingredient_id,
            quantity:      row.quantity,
            unit:          row.unit,
            created_at:    row.created_at
        }
    }
}

#[async_trait]
impl ProductRepository for PgPool {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let sql = format!("{} ORDER BY created_at, id", PRODUCTS.select);
        let rows: Vec<ProductRow> = sqlx::query_as(&sql).fetch_all(self).await?;
        rows.into_iter().map(Product::try_from).collect()
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let sql = format!("{} WHERE id = $1", PRODUCTS.select);
        let row: Option<ProductRow> = sqlx::query_as(&sql).bind(id).fetch_optional(self).await?;
        row.map(Product::try_from).transpose()
    }

    async fn create_product(&self, data: ProductData) -> Result<Product, StoreError> {
        let now = schema::now();
        let row: ProductRow = bind_product(sqlx::query_as(&PRODUCTS.insert).bind(Uuid::new_v4()), data)
            .bind(now)
            .bind(now)
            .fetch_one(self)
            .await?;
        Product::try_from(row)
    }

    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, StoreError> {
        let mut tx = self.begin().await?;
        let row: Option<ProductRow> = sqlx::query_as(&PRODUCTS.for_update)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut product = Product::try_from(row)?;
        patch.apply(&mut product.data);
        let updated_at = schema::touched_after(product.updated_at);

        let row: ProductRow = bind_product(sqlx::query_as(&PRODUCTS.update).bind(id), product.data)
            .bind(updated_at)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Product::try_from(row).map(Some)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tx = self.begin().await?;
        sqlx::query("DELETE FROM product_ingredients WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl IngredientRepository for PgPool {
    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, StoreError> {
        let sql = format!("{} ORDER BY created_at, id", INGREDIENTS.select);
        let rows: Vec<IngredientRow> = sqlx::query_as(&sql).fetch_all(self).await?;
        rows.into_iter().map(Ingredient::try_from).collect()
    }

    async fn find_ingredient(&self, id: Uuid) -> Result<Option<Ingredient>, StoreError> {
        let sql = format!("{} WHERE id = $1", INGREDIENTS.select);
        let row: Option<IngredientRow> = sqlx::query_as(&sql).bind(id).fetch_optional(self).await?;
        row.map(Ingredient::try_from).transpose()
    }

    async fn create_ingredient(&self, data: IngredientData) -> Result<Ingredient, StoreError> {
        let now = schema::now();
        let row: IngredientRow = bind_ingredient(sqlx::query_as(&INGREDIENTS.insert).bind(Uuid::new_v4()), data)
            .bind(now)
            .bind(now)
            .fetch_one(self)
            .await?;
        Ingredient::try_from(row)
    }

    async fn update_ingredient(&self, id: Uuid, patch: IngredientPatch) -> Result<Option<Ingredient>, StoreError> {
        let mut tx = self.begin().await?;
        let row: Option<IngredientRow> = sqlx::query_as(&INGREDIENTS.for_update)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut ingredient = Ingredient::try_from(row)?;
        patch.apply(&mut ingredient.data);
        let updated_at = schema::touched_after(ingredient.updated_at);

        let row: IngredientRow = bind_ingredient(sqlx::query_as(&INGREDIENTS.update).bind(id), ingredient.data)
            .bind(updated_at)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ingredient::try_from(row).map(Some)
    }

    async fn delete_ingredient(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tx = self.begin().await?;
        sqlx::query("DELETE FROM product_ingredients WHERE ingredient_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AssociationRepository for PgPool {
    async fn list_associations(&self, product_id: Uuid) -> Result<Vec<ProductIngredient>, StoreError> {
        let sql = format!(
            "SELECT {ASSOCIATION_COLUMNS} FROM product_ingredients WHERE product_id = $1 ORDER BY created_at, id"
        );
        let rows: Vec<AssociationRow> = sqlx::query_as(&sql).bind(product_id).fetch_all(self).await?;
        Ok(rows.into_iter().map(ProductIngredient::from).collect())
    }

    async fn attach(
        &self,
        product_id: Uuid,
        ingredient_id: Uuid,
        quantity: Option<String>,
        unit: Option<String>
    ) -> Result<ProductIngredient, StoreError> {
        let sql = format!(
            "INSERT INTO product_ingredients ({ASSOCIATION_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {ASSOCIATION_COLUMNS}"
        );
        let result = sqlx::query_as::<_, AssociationRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(product_id)
            .bind(ingredient_id)
            .bind(quantity)
            .bind(unit)
            .bind(schema::now())
            .fetch_one(self)
            .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(StoreError::DuplicateAssociation {
                product_id,
                ingredient_id
            }),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                let missing_product = db.constraint() == Some("product_ingredients_product_fk");
                Err(if missing_product {
                    StoreError::MissingReference {
                        kind: EntityKind::Product,
                        id:   product_id
                    }
                } else {
                    StoreError::MissingReference {
                        kind: EntityKind::Ingredient,
                        id:   ingredient_id
                    }
                })
            }
            Err(e) => Err(e.into())
        }
    }

    async fn detach(&self, product_id: Uuid, ingredient_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM product_ingredients WHERE product_id = $1 AND ingredient_id = $2")
            .bind(product_id)
            .bind(ingredient_id)
            .execute(self)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_number_placeholders_consistently() {
        let s = Statements::new("ingredients", &INGREDIENT_DATA_COLUMNS);
        assert_eq!(
            s.insert,
            "INSERT INTO ingredients (id, name, category, e_number, other_ingredient_detail, allergens, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id, name, category, \
             e_number, other_ingredient_detail, allergens, created_at, updated_at"
        );
        assert!(s.update.starts_with(
            "UPDATE ingredients SET name = $2, category = $3, e_number = $4, other_ingredient_detail = $5, \
             allergens = $6, updated_at = $7 WHERE id = $1"
        ));
        assert!(s.for_update.ends_with("WHERE id = $1 FOR UPDATE"));
    }

    #[test]
    fn product_statements_cover_every_column() {
        assert!(PRODUCTS.insert.contains("$33)"));
        assert!(PRODUCTS.update.contains("image = $31, updated_at = $32"));
    }

    #[test]
    fn unknown_label_in_row_is_corrupt() {
        let now = Utc::now();
        let row = IngredientRow {
            id:                      Uuid::nil(),
            name:                    "X".into(),
            category:                "Mystery".into(),
            e_number:                None,
            other_ingredient_detail: None,
            allergens:               vec![],
            created_at:              now,
            updated_at:              now
        };
        assert!(matches!(
            Ingredient::try_from(row),
            Err(StoreError::Corrupt {
                kind: EntityKind::Ingredient,
                ..
            })
        ));
    }
}
