// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Attaching ingredients to products.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post}
};
use uuid::Uuid;

use super::{AppState, PathParams};
use crate::{
    error::{ApiError, ApiResult, ErrorBody},
    schema::{AttachIngredientRequest, ProductIngredient},
    store::Store
};

/// Association routes, relative to `/api`.
pub fn routes<R: Store>() -> Router<AppState<R>> {
    Router::new()
        .route("/products/{id}/ingredients", get(list_product_ingredients::<R>))
        .route(
            "/products/{id}/ingredients/{ingredient_id}",
            post(attach_ingredient::<R>).delete(detach_ingredient::<R>)
        )
}

/// Association rows of a product, oldest first. An unknown product has
/// none.
#[utoipa::path(
    get,
    path = "/api/products/{id}/ingredients",
    tag = "Product ingredients",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Association rows", body = [ProductIngredient]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_product_ingredients<R: Store>(
    State(state): State<AppState<R>>,
    PathParams(id): PathParams<Uuid>
) -> ApiResult<Json<Vec<ProductIngredient>>> {
    let links = state
        .store
        .list_associations(id)
        .await
        .map_err(ApiError::store("Failed to fetch product ingredients"))?;
    Ok(Json(links))
}

/// Attach an ingredient. The JSON body with `quantity` and `unit` is
/// optional.
#[utoipa::path(
    post,
    path = "/api/products/{id}/ingredients/{ingredient_id}",
    tag = "Product ingredients",
    params(
        ("id" = Uuid, Path, description = "Product id"),
        ("ingredient_id" = Uuid, Path, description = "Ingredient id")
    ),
    request_body(content = AttachIngredientRequest, description = "Optional quantity and unit; the body may be empty"),
    responses(
        (status = 201, description = "Ingredient attached", body = ProductIngredient),
        (status = 400, description = "Unknown product or ingredient", body = ErrorBody),
        (status = 409, description = "Already attached", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn attach_ingredient<R: Store>(
    State(state): State<AppState<R>>,
    PathParams((id, ingredient_id)): PathParams<(Uuid, Uuid)>,
    body: Bytes
) -> ApiResult<(StatusCode, Json<ProductIngredient>)> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        AttachIngredientRequest::default()
    } else {
        serde_json::from_slice::<AttachIngredientRequest>(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?
    };
    let (quantity, unit) = request.into_parts();
    let link = state
        .store
        .attach(id, ingredient_id, quantity, unit)
        .await
        .map_err(ApiError::store("Failed to attach ingredient"))?;
    tracing::info!(product = %id, ingredient = %ingredient_id, "ingredient attached");
    Ok((StatusCode::CREATED, Json(link)))
}

/// Detach an ingredient. Detaching a missing link succeeds.
#[utoipa::path(
    delete,
    path = "/api/products/{id}/ingredients/{ingredient_id}",
    tag = "Product ingredients",
    params(
        ("id" = Uuid, Path, description = "Product id"),
        ("ingredient_id" = Uuid, Path, description = "Ingredient id")
    ),
    responses(
        (status = 204, description = "Ingredient detached"),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn detach_ingredient<R: Store>(
    State(state): State<AppState<R>>,
    PathParams((id, ingredient_id)): PathParams<(Uuid, Uuid)>
) -> ApiResult<StatusCode> {
    let removed = state
        .store
        .detach(id, ingredient_id)
        .await
        .map_err(ApiError::store("Failed to detach ingredient"))?;
    tracing::info!(product = %id, ingredient = %ingredient_id, removed, "ingredient detached");
    Ok(StatusCode::NO_CONTENT)
}
