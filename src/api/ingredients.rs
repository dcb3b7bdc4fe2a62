// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Ingredient CRUD handlers.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use elabel_core::EntityKind;
use uuid::Uuid;

use super::{AppState, Body, PathParams};
use crate::{
    error::{ApiError, ApiResult, ErrorBody},
    schema::{CreateIngredientRequest, Ingredient, UpdateIngredientRequest},
    store::Store
};

/// Ingredient routes, relative to `/api`.
pub fn routes<R: Store>() -> Router<AppState<R>> {
    Router::new()
        .route("/ingredients", get(list_ingredients::<R>).post(create_ingredient::<R>))
        .route(
            "/ingredients/{id}",
            get(get_ingredient::<R>)
                .put(update_ingredient::<R>)
                .patch(update_ingredient::<R>)
                .delete(delete_ingredient::<R>)
        )
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "Ingredients",
    responses(
        (status = 200, description = "All ingredients", body = [Ingredient]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_ingredients<R: Store>(State(state): State<AppState<R>>) -> ApiResult<Json<Vec<Ingredient>>> {
    let ingredients = state
        .store
        .list_ingredients()
        .await
        .map_err(ApiError::store("Failed to fetch ingredients"))?;
    Ok(Json(ingredients))
}

#[utoipa::path(
    get,
    path = "/api/ingredients/{id}",
    tag = "Ingredients",
    params(("id" = Uuid, Path, description = "Ingredient id")),
    responses(
        (status = 200, description = "Ingredient found", body = Ingredient),
        (status = 404, description = "Ingredient not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_ingredient<R: Store>(
    State(state): State<AppState<R>>,
    PathParams(id): PathParams<Uuid>
) -> ApiResult<Json<Ingredient>> {
    let ingredient = state
        .store
        .find_ingredient(id)
        .await
        .map_err(ApiError::store("Failed to fetch ingredient"))?
        .ok_or(ApiError::NotFound(EntityKind::Ingredient))?;
    Ok(Json(ingredient))
}

#[utoipa::path(
    post,
    path = "/api/ingredients",
    tag = "Ingredients",
    request_body(content = CreateIngredientRequest, description = "Ingredient fields; `name` and `category` are required"),
    responses(
        (status = 201, description = "Ingredient created", body = Ingredient),
        (status = 400, description = "Invalid request data", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_ingredient<R: Store>(
    State(state): State<AppState<R>>,
    Body(request): Body<CreateIngredientRequest>
) -> ApiResult<(StatusCode, Json<Ingredient>)> {
    let data = request.into_data()?;
    let ingredient = state
        .store
        .create_ingredient(data)
        .await
        .map_err(ApiError::store("Failed to create ingredient"))?;
    tracing::info!(id = %ingredient.id, name = %ingredient.data.name, "ingredient created");
    Ok((StatusCode::CREATED, Json(ingredient)))
}

#[utoipa::path(
    put,
    path = "/api/ingredients/{id}",
    tag = "Ingredients",
    params(("id" = Uuid, Path, description = "Ingredient id")),
    request_body(content = UpdateIngredientRequest, description = "Fields to change"),
    responses(
        (status = 200, description = "Ingredient updated", body = Ingredient),
        (status = 400, description = "Invalid request data", body = ErrorBody),
        (status = 404, description = "Ingredient not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_ingredient<R: Store>(
    State(state): State<AppState<R>>,
    PathParams(id): PathParams<Uuid>,
    Body(request): Body<UpdateIngredientRequest>
) -> ApiResult<Json<Ingredient>> {
    let patch = request.into_patch()?;
    let ingredient = state
        .store
        .update_ingredient(id, patch)
        .await
        .map_err(ApiError::store("Failed to update ingredient"))?
        .ok_or(ApiError::NotFound(EntityKind::Ingredient))?;
    tracing::info!(%id, "ingredient updated");
    Ok(Json(ingredient))
}

/// Delete an ingredient, detaching it from every product.
#[utoipa::path(
    delete,
    path = "/api/ingredients/{id}",
    tag = "Ingredients",
    params(("id" = Uuid, Path, description = "Ingredient id")),
    responses(
        (status = 204, description = "Ingredient deleted"),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_ingredient<R: Store>(
    State(state): State<AppState<R>>,
    PathParams(id): PathParams<Uuid>
) -> ApiResult<StatusCode> {
    let existed = state
        .store
        .delete_ingredient(id)
        .await
        .map_err(ApiError::store("Failed to delete ingredient"))?;
    if existed {
        tracing::info!(%id, "ingredient deleted");
    }
    Ok(StatusCode::NO_CONTENT)
}
