// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! HTTP error mapping.
//!
//! | Variant | Status |
//! |---------|--------|
//! | [`ApiError::Validation`], [`ApiError::BadRequest`], [`ApiError::Reference`] | 400 |
//! | [`ApiError::Unauthorized`] | 401 |
//! | [`ApiError::NotFound`] | 404 |
//! | [`ApiError::Conflict`] | 409 |
//! | [`ApiError::Internal`] | 500 |
//!
//! Every error renders as `{"error": "<message>"}`; validation failures
//! add a `fields` list. Internal failures are logged with their cause and
//! reported with a generic message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response}
};
use elabel_core::EntityKind;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    schema::{FieldViolation, ValidationError},
    store::StoreError,
    transfer::TransferError
};

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error:  String,
    /// Rejected fields, present on validation failures only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldViolation>
}

/// Error returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Reference(String),

    #[error("Missing or invalid admin token")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(EntityKind),

    #[error("{0}")]
    Conflict(String),

    /// `context` is the public message, e.g. `Failed to fetch products`.
    #[error("{context}")]
    Internal {
        context: String,
        #[source]
        source:  Box<dyn std::error::Error + Send + Sync>
    }
}

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Wrap a store failure, keeping referential and uniqueness errors
    /// distinguishable from outages.
    pub fn store(context: impl Into<String>) -> impl FnOnce(StoreError) -> Self {
        let context = context.into();
        move |err| match err {
            StoreError::MissingReference { .. } => Self::Reference(err.to_string()),
            StoreError::DuplicateAssociation { .. } => Self::Conflict(err.to_string()),
            other => Self::Internal {
                context,
                source: Box::new(other)
            }
        }
    }

    /// Wrap a spreadsheet failure.
    pub fn transfer(context: impl Into<String>) -> impl FnOnce(TransferError) -> Self {
        let context = context.into();
        move |err| match err {
            TransferError::Read(_) => Self::BadRequest(err.to_string()),
            other => Self::Internal {
                context,
                source: Box::new(other)
            }
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) | Self::Reference(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Internal { context, source } = &self {
            tracing::error!(error = %source, "{context}");
        }
        let fields = match &self {
            Self::Validation(err) => err.violations().to_vec(),
            _ => Vec::new()
        };
        let body = ErrorBody {
            error: self.to_string(),
            fields
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(ApiError::NotFound(EntityKind::Product).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_names_entity() {
        assert_eq!(ApiError::NotFound(EntityKind::Ingredient).to_string(), "Ingredient not found");
    }

    #[test]
    fn store_errors_keep_their_class() {
        let missing = StoreError::MissingReference {
            kind: EntityKind::Product,
            id:   Uuid::nil()
        };
        assert_eq!(ApiError::store("Failed to attach ingredient")(missing).status(), StatusCode::BAD_REQUEST);

        let duplicate = StoreError::DuplicateAssociation {
            product_id:    Uuid::nil(),
            ingredient_id: Uuid::nil()
        };
        assert_eq!(ApiError::store("Failed to attach ingredient")(duplicate).status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_hides_cause() {
        let err = ApiError::store("Failed to fetch products")(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to fetch products");
    }
}
