// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Product ↔ ingredient link.

use chrono::{DateTime, Utc};
use elabel_core::Identified;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{lenient, validation::clean};

/// An ingredient attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductIngredient {
    /// Identifier of the link itself.
    pub id: Uuid,

    /// Linked product.
    pub product_id: Uuid,

    /// Linked ingredient.
    pub ingredient_id: Uuid,

    /// Amount as entered, e.g. `30`.
    pub quantity: Option<String>,

    /// Unit of `quantity`, e.g. `mg/l`.
    pub unit: Option<String>,

    /// When the ingredient was attached.
    pub created_at: DateTime<Utc>
}

impl Identified for ProductIngredient {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Optional body for attaching an ingredient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachIngredientRequest {
    /// Amount; numbers are accepted and kept as text.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub quantity: Option<String>,

    /// Unit of `quantity`.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub unit: Option<String>
}

impl AttachIngredientRequest {
    /// Trimmed `(quantity, unit)`.
    pub fn into_parts(self) -> (Option<String>, Option<String>) {
        (clean(self.quantity), clean(self.unit))
    }
}
