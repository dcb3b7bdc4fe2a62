// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! HTTP surface.
//!
//! Routers are generic over the backing [`Store`] the same way for every
//! resource, so the server runs on `PgPool` and tests on
//! [`MemoryStore`](crate::store::MemoryStore) with identical handlers.
//!
//! | Route | Module |
//! |-------|--------|
//! | `/api/products`, `/api/products/{id}`, `/api/products/{id}/links` | [`products`] |
//! | `/api/ingredients`, `/api/ingredients/{id}` | [`ingredients`] |
//! | `/api/products/{id}/ingredients[/{ingredient_id}]` | [`associations`] |
//! | `/api/{products,ingredients}/{import,export}` | [`spreadsheets`] |
//! | `/health` | here, unauthenticated |
//! | `/swagger-ui`, `/api-docs/openapi.json` | here |

pub mod associations;
pub mod ingredients;
pub mod products;
pub mod spreadsheets;

use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRequest, FromRequestParts, Request, State},
    http::header::AUTHORIZATION,
    middleware::{self, Next},
    response::Response,
    routing::get
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme}
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Settings,
    error::{ApiError, ErrorBody},
    schema::{
        AttachIngredientRequest, CreateIngredientRequest, CreateProductRequest, FieldViolation, Ingredient,
        IngredientCategory, IngredientData, Product, ProductData, ProductIngredient, SugarContent,
        UpdateIngredientRequest, UpdateProductRequest, WineType
    },
    store::Store,
    transfer::{ImportFailure, ImportReport}
};

/// Largest accepted request body; spreadsheets and inline images are big.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Shared handler state.
pub struct AppState<R> {
    pub store:    Arc<R>,
    pub settings: Arc<Settings>
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            store:    Arc::clone(&self.store),
            settings: Arc::clone(&self.settings)
        }
    }
}

impl<R> AppState<R> {
    pub fn new(store: R, settings: Settings) -> Self {
        Self {
            store:    Arc::new(store),
            settings: Arc::new(settings)
        }
    }
}

/// JSON body whose rejections use the uniform error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Body<T>(pub T);

/// Path parameters whose rejections use the uniform error body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParams<T>(pub T);

/// OpenAPI document for every route.
#[derive(OpenApi)]
#[openapi(
    info(title = "elabel", description = "Wine e-label administration API"),
    paths(
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::product_links,
        ingredients::list_ingredients,
        ingredients::get_ingredient,
        ingredients::create_ingredient,
        ingredients::update_ingredient,
        ingredients::delete_ingredient,
        associations::list_product_ingredients,
        associations::attach_ingredient,
        associations::detach_ingredient,
        spreadsheets::import_products,
        spreadsheets::export_products,
        spreadsheets::import_ingredients,
        spreadsheets::export_ingredients
    ),
    components(schemas(
        Product,
        ProductData,
        CreateProductRequest,
        UpdateProductRequest,
        Ingredient,
        IngredientData,
        CreateIngredientRequest,
        UpdateIngredientRequest,
        ProductIngredient,
        AttachIngredientRequest,
        WineType,
        SugarContent,
        IngredientCategory,
        ErrorBody,
        FieldViolation,
        ImportReport,
        ImportFailure,
        products::ProductLinks
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Products", description = "Wine products"),
        (name = "Ingredients", description = "Ingredient catalogue"),
        (name = "Product ingredients", description = "Links between products and ingredients"),
        (name = "Spreadsheets", description = "Bulk import and export")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("Admin token, required when the server is configured with one"))
                        .build()
                )
            );
        }
    }
}

/// Reject `/api` requests lacking the configured admin token.
async fn require_admin<R: Store>(
    State(state): State<AppState<R>>,
    request: Request,
    next: Next
) -> Result<Response, ApiError> {
    if let Some(expected) = state.settings.admin_token.as_deref() {
        let presented = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);
        if presented != Some(expected) {
            tracing::debug!(path = %request.uri().path(), "rejected request without admin token");
            return Err(ApiError::Unauthorized);
        }
    }
    Ok(next.run(request).await)
}

async fn health() -> &'static str {
    "ok"
}

/// Complete application router.
///
/// # Usage
///
/// ```rust,ignore
/// let state = AppState::new(pool, settings);
/// axum::serve(listener, elabel::api::router(state)).await?;
/// ```
pub fn router<R: Store>(state: AppState<R>) -> Router {
    let api = Router::new()
        .merge(products::routes::<R>())
        .merge(ingredients::routes::<R>())
        .merge(associations::routes::<R>())
        .merge(spreadsheets::routes::<R>())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin::<R>))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
