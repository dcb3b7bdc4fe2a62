// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Bulk import and export handlers.
//!
//! Imports take the raw workbook as the request body (any content type)
//! and answer `200` with an [`ImportReport`] even when rows fail; only an
//! unreadable workbook is a `400`.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post}
};

use super::AppState;
use crate::{
    error::{ApiError, ApiResult, ErrorBody},
    store::Store,
    transfer::{self, ImportReport}
};

/// Media type of `.xlsx` files.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Spreadsheet routes, relative to `/api`.
pub fn routes<R: Store>() -> Router<AppState<R>> {
    Router::new()
        .route("/products/import", post(import_products::<R>))
        .route("/products/export", get(export_products::<R>))
        .route("/ingredients/import", post(import_ingredients::<R>))
        .route("/ingredients/export", get(export_ingredients::<R>))
}

fn attachment(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (CONTENT_TYPE, XLSX_MIME.to_owned()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\""))
        ],
        bytes
    )
        .into_response()
}

fn require_upload(body: &Bytes) -> ApiResult<()> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("Empty upload; send the workbook as the request body".into()));
    }
    Ok(())
}

/// Create products from the first sheet of a workbook.
#[utoipa::path(
    post,
    path = "/api/products/import",
    tag = "Spreadsheets",
    request_body(content = Vec<u8>, content_type = "application/octet-stream", description = "`.xlsx`, `.xls` or `.ods` workbook"),
    responses(
        (status = 200, description = "Rows processed", body = ImportReport),
        (status = 400, description = "Unreadable workbook", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn import_products<R: Store>(State(state): State<AppState<R>>, body: Bytes) -> ApiResult<Json<ImportReport>> {
    require_upload(&body)?;
    let report = transfer::import_products(state.store.as_ref(), &body)
        .await
        .map_err(ApiError::transfer("Failed to import products"))?;
    Ok(Json(report))
}

/// Download every product as `products.xlsx`.
#[utoipa::path(
    get,
    path = "/api/products/export",
    tag = "Spreadsheets",
    responses(
        (status = 200, description = "Workbook", body = Vec<u8>, content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn export_products<R: Store>(State(state): State<AppState<R>>) -> ApiResult<Response> {
    let products = state
        .store
        .list_products()
        .await
        .map_err(ApiError::store("Failed to fetch products"))?;
    let bytes = transfer::export_products(&products).map_err(ApiError::transfer("Failed to export products"))?;
    Ok(attachment("products.xlsx", bytes))
}

/// Create ingredients from the first sheet of a workbook.
#[utoipa::path(
    post,
    path = "/api/ingredients/import",
    tag = "Spreadsheets",
    request_body(content = Vec<u8>, content_type = "application/octet-stream", description = "`.xlsx`, `.xls` or `.ods` workbook"),
    responses(
        (status = 200, description = "Rows processed", body = ImportReport),
        (status = 400, description = "Unreadable workbook", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn import_ingredients<R: Store>(
    State(state): State<AppState<R>>,
    body: Bytes
) -> ApiResult<Json<ImportReport>> {
    require_upload(&body)?;
    let report = transfer::import_ingredients(state.store.as_ref(), &body)
        .await
        .map_err(ApiError::transfer("Failed to import ingredients"))?;
    Ok(Json(report))
}

/// Download every ingredient as `ingredients.xlsx`.
#[utoipa::path(
    get,
    path = "/api/ingredients/export",
    tag = "Spreadsheets",
    responses(
        (status = 200, description = "Workbook", body = Vec<u8>, content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn export_ingredients<R: Store>(State(state): State<AppState<R>>) -> ApiResult<Response> {
    let ingredients = state
        .store
        .list_ingredients()
        .await
        .map_err(ApiError::store("Failed to fetch ingredients"))?;
    let bytes =
        transfer::export_ingredients(&ingredients).map_err(ApiError::transfer("Failed to export ingredients"))?;
    Ok(attachment("ingredients.xlsx", bytes))
}
