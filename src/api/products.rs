// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Product CRUD handlers and public links.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use elabel_core::EntityKind;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{AppState, Body, PathParams};
use crate::{
    config::Settings,
    error::{ApiError, ApiResult, ErrorBody},
    schema::{CreateProductRequest, Product, UpdateProductRequest},
    store::Store
};

/// Product routes, relative to `/api`.
pub fn routes<R: Store>() -> Router<AppState<R>> {
    Router::new()
        .route("/products", get(list_products::<R>).post(create_product::<R>))
        .route(
            "/products/{id}",
            get(get_product::<R>)
                .put(update_product::<R>)
                .patch(update_product::<R>)
                .delete(delete_product::<R>)
        )
        .route("/products/{id}/links", get(product_links::<R>))
}

/// List all products, oldest first.
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses(
        (status = 200, description = "All products", body = [Product]),
        (status = 401, description = "Authentication required", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_products<R: Store>(State(state): State<AppState<R>>) -> ApiResult<Json<Vec<Product>>> {
    let products = state
        .store
        .list_products()
        .await
        .map_err(ApiError::store("Failed to fetch products"))?;
    Ok(Json(products))
}

/// Get a product by id.
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_product<R: Store>(
    State(state): State<AppState<R>>,
    PathParams(id): PathParams<Uuid>
) -> ApiResult<Json<Product>> {
    let product = state
        .store
        .find_product(id)
        .await
        .map_err(ApiError::store("Failed to fetch product"))?
        .ok_or(ApiError::NotFound(EntityKind::Product))?;
    Ok(Json(product))
}

/// Create a product.
///
/// Returns the stored record so clients can append it to a cached list.
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body(content = CreateProductRequest, description = "Product fields; `name` is required"),
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid request data", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_product<R: Store>(
    State(state): State<AppState<R>>,
    Body(request): Body<CreateProductRequest>
) -> ApiResult<(StatusCode, Json<Product>)> {
    let data = request.into_data()?;
    let product = state
        .store
        .create_product(data)
        .await
        .map_err(ApiError::store("Failed to create product"))?;
    tracing::info!(id = %product.id, name = %product.data.name, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product. `PUT` and `PATCH` behave the same: only supplied
/// fields change.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body(content = UpdateProductRequest, description = "Fields to change"),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Invalid request data", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_product<R: Store>(
    State(state): State<AppState<R>>,
    PathParams(id): PathParams<Uuid>,
    Body(request): Body<UpdateProductRequest>
) -> ApiResult<Json<Product>> {
    let patch = request.into_patch()?;
    let product = state
        .store
        .update_product(id, patch)
        .await
        .map_err(ApiError::store("Failed to update product"))?
        .ok_or(ApiError::NotFound(EntityKind::Product))?;
    tracing::info!(%id, "product updated");
    Ok(Json(product))
}

/// Delete a product and its ingredient links. Deleting an unknown id
/// succeeds.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_product<R: Store>(
    State(state): State<AppState<R>>,
    PathParams(id): PathParams<Uuid>
) -> ApiResult<StatusCode> {
    let existed = state
        .store
        .delete_product(id)
        .await
        .map_err(ApiError::store("Failed to delete product"))?;
    if existed {
        tracing::info!(%id, "product deleted");
    } else {
        tracing::debug!(%id, "delete of unknown product");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Links printed on or behind a product's label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductLinks {
    /// Public e-label page.
    pub label_public_link:   String,
    /// Image URL of a QR code for the barcode link, or for the label page.
    pub qr_code_url:         String,
    pub external_short_link: String,
    pub redirect_link:       String
}

impl ProductLinks {
    /// Derive links from stored fields and server settings.
    pub fn build(product: &Product, settings: &Settings) -> Self {
        let label = format!(
            "{}/products/details/{}",
            settings.public_base_url.as_str().trim_end_matches('/'),
            product.id
        );
        let data = &product.data;
        let qr_target = data.barcode_link.as_deref().unwrap_or(&label);

        let mut qr = settings.qr_service_url.clone();
        qr.query_pairs_mut()
            .append_pair("size", "200x200")
            .append_pair("data", qr_target);

        Self {
            external_short_link: data
                .external_link
                .clone()
                .or_else(|| data.barcode_link.clone())
                .unwrap_or_else(|| label.clone()),
            redirect_link:       data
                .redirect_link
                .clone()
                .or_else(|| data.barcode_link.clone())
                .unwrap_or_else(|| label.clone()),
            qr_code_url:         qr.into(),
            label_public_link:   label
        }
    }
}

/// Public label link, QR image URL and short links for a product.
#[utoipa::path(
    get,
    path = "/api/products/{id}/links",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Links for the product", body = ProductLinks),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn product_links<R: Store>(
    State(state): State<AppState<R>>,
    PathParams(id): PathParams<Uuid>
) -> ApiResult<Json<ProductLinks>> {
    let product = state
        .store
        .find_product(id)
        .await
        .map_err(ApiError::store("Failed to fetch product"))?
        .ok_or(ApiError::NotFound(EntityKind::Product))?;
    Ok(Json(ProductLinks::build(&product, &state.settings)))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::schema::ProductData;

    fn product(barcode: Option<&str>) -> Product {
        Product {
            id:         Uuid::nil(),
            data:       ProductData {
                name: "X".into(),
                barcode_link: barcode.map(str::to_owned),
                ..ProductData::default()
            },
            created_at: Utc::now(),
            updated_at: Utc::now()
        }
    }

    fn settings() -> Settings {
        Settings::from_args(["elabel", "--public-base-url", "https://labels.example.com/"]).unwrap()
    }

    #[test]
    fn label_link_uses_public_origin() {
        let links = ProductLinks::build(&product(None), &settings());
        assert_eq!(
            links.label_public_link,
            "https://labels.example.com/products/details/00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(links.redirect_link, links.label_public_link);
        assert_eq!(links.external_short_link, links.label_public_link);
    }

    #[test]
    fn qr_encodes_barcode_link_when_present() {
        let links = ProductLinks::build(&product(Some("https://go.example/abc?x=1")), &settings());
        assert!(links.qr_code_url.starts_with("https://api.qrserver.com/v1/create-qr-code/?size=200x200&data="));
        assert!(links.qr_code_url.ends_with("https%3A%2F%2Fgo.example%2Fabc%3Fx%3D1"));
        assert_eq!(links.redirect_link, "https://go.example/abc?x=1");
    }

    #[test]
    fn qr_falls_back_to_label_link() {
        let links = ProductLinks::build(&product(None), &settings());
        assert!(links.qr_code_url.contains("labels.example.com%2Fproducts%2Fdetails"));
    }
}
