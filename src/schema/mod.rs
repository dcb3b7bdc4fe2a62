// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Records, request DTOs and the rules that turn one into the other.
//!
//! Every write path (JSON body or spreadsheet row) deserializes into the
//! same `Create*Request`/`Update*Request` types and goes through the same
//! `into_data`/`into_patch` validation, so import and API accept exactly
//! the same records.

mod association;
pub mod enums;
mod ingredient;
pub mod lenient;
mod product;
pub mod validation;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};

pub use association::{AttachIngredientRequest, ProductIngredient};
pub use enums::{IngredientCategory, SugarContent, UnknownLabel, WineType};
pub use ingredient::{CreateIngredientRequest, Ingredient, IngredientData, IngredientPatch, UpdateIngredientRequest};
pub use product::{CreateProductRequest, Product, ProductData, ProductPatch, UpdateProductRequest};
pub use validation::{FieldViolation, ValidationError};

/// Current time at the precision the database keeps (microseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Timestamp for a modification strictly later than `previous`.
pub fn touched_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::microseconds(1)
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}
