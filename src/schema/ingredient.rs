// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Ingredient entity and its request DTOs.

use chrono::{DateTime, Utc};
use elabel_core::Identified;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{
    IngredientCategory, lenient,
    validation::{ValidationError, Violations, check_tags, clean, clean_patch, dedup_tags}
};

/// Fields of an ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientData {
    /// Display name; never empty.
    pub name: String,

    /// Functional class.
    pub category: IngredientCategory,

    /// E-number code such as `E220`.
    pub e_number: Option<String>,

    /// Free-form detail for ingredients outside the fixed classes.
    pub other_ingredient_detail: Option<String>,

    /// Allergen tags, duplicate-free, in insertion order.
    pub allergens: Vec<String>
}

/// A stored ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    /// Random identifier assigned on create.
    pub id: Uuid,

    /// Catalogue fields, flattened into the JSON object.
    #[serde(flatten)]
    pub data: IngredientData,

    /// Set once on create.
    pub created_at: DateTime<Utc>,

    /// Moves forward on every update.
    pub updated_at: DateTime<Utc>
}

impl Identified for Ingredient {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Request body for creating an ingredient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngredientRequest {
    #[serde(default, deserialize_with = "lenient::text")]
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub name:                    String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    #[schema(value_type = Option<IngredientCategory>)]
    pub category:                Option<String>,
    #[serde(default, alias = "e_number", deserialize_with = "lenient::opt_text")]
    pub e_number:                Option<String>,
    #[serde(
        default,
        alias = "otherIngredient",
        alias = "other_ingredient",
        deserialize_with = "lenient::opt_text"
    )]
    pub other_ingredient_detail: Option<String>,
    #[serde(default)]
    pub allergens:               Option<Vec<String>>
}

impl CreateIngredientRequest {
    /// Normalize and validate into storable fields.
    pub fn into_data(mut self) -> Result<IngredientData, ValidationError> {
        self.name = self.name.trim().to_owned();
        let mut violations = Violations::from_validator(self.validate());

        let category = match clean(self.category) {
            Some(raw) => violations.label("category", Some(&raw)),
            None => {
                violations.push("category", "is required");
                None
            }
        };

        let allergens = dedup_tags(self.allergens.unwrap_or_default());
        check_tags(&mut violations, "allergens", &allergens);

        violations.finish(|| IngredientData {
            name: self.name,
            category: category.unwrap_or_default(),
            e_number: clean(self.e_number),
            other_ingredient_detail: clean(self.other_ingredient_detail),
            allergens
        })
    }
}

/// Request body for a partial ingredient update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIngredientRequest {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub name:                    Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    #[schema(value_type = Option<IngredientCategory>)]
    pub category:                Option<String>,
    #[serde(default, alias = "e_number", deserialize_with = "lenient::opt_text")]
    pub e_number:                Option<String>,
    #[serde(
        default,
        alias = "otherIngredient",
        alias = "other_ingredient",
        deserialize_with = "lenient::opt_text"
    )]
    pub other_ingredient_detail: Option<String>,
    #[serde(default)]
    pub allergens:               Option<Vec<String>>
}

impl UpdateIngredientRequest {
    /// Validate only the supplied fields.
    ///
    /// Category is mandatory, so a blank category is rejected rather than
    /// cleared.
    pub fn into_patch(mut self) -> Result<IngredientPatch, ValidationError> {
        self.name = self.name.map(|n| n.trim().to_owned());
        let mut violations = Violations::from_validator(self.validate());

        let category = match clean_patch(self.category) {
            None => None,
            Some(None) => {
                violations.push("category", "must not be empty");
                None
            }
            Some(Some(raw)) => violations.label("category", Some(&raw))
        };

        let allergens = self.allergens.map(dedup_tags);
        if let Some(tags) = &allergens {
            check_tags(&mut violations, "allergens", tags);
        }

        violations.finish(|| IngredientPatch {
            name: self.name,
            category,
            e_number: clean_patch(self.e_number),
            other_ingredient_detail: clean_patch(self.other_ingredient_detail),
            allergens
        })
    }
}

/// Validated partial change to an ingredient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientPatch {
    pub name:                    Option<String>,
    pub category:                Option<IngredientCategory>,
    pub e_number:                Option<Option<String>>,
    pub other_ingredient_detail: Option<Option<String>>,
    pub allergens:               Option<Vec<String>>
}

impl IngredientPatch {
    /// Merge into stored fields.
    pub fn apply(self, data: &mut IngredientData) {
        super::set(&mut data.name, self.name);
        super::set(&mut data.category, self.category);
        super::set(&mut data.e_number, self.e_number);
        super::set(&mut data.other_ingredient_detail, self.other_ingredient_detail);
        super::set(&mut data.allergens, self.allergens);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(json: serde_json::Value) -> Result<IngredientData, ValidationError> {
        serde_json::from_value::<CreateIngredientRequest>(json)
            .unwrap()
            .into_data()
    }

    #[test]
    fn create_normalizes_allergens() {
        let data = create(serde_json::json!({
            "name": "Sulphur dioxide",
            "category": "Preservative",
            "eNumber": "E220",
            "allergens": ["sulfites", "sulfites", " "]
        }))
        .unwrap();
        assert_eq!(data.category, IngredientCategory::Preservative);
        assert_eq!(data.e_number.as_deref(), Some("E220"));
        assert_eq!(data.allergens, ["sulfites"]);
    }

    #[test]
    fn create_requires_name_and_category() {
        let err = create(serde_json::json!({})).unwrap_err();
        assert!(err.names("name"));
        assert!(err.names("category"));
    }

    #[test]
    fn create_rejects_unknown_category() {
        let err = create(serde_json::json!({ "name": "Egg white", "category": "Protein" })).unwrap_err();
        assert!(err.names("category"));
        assert!(!err.names("name"));
    }

    #[test]
    fn create_accepts_legacy_keys() {
        let data = create(serde_json::json!({
            "name": "Tartaric acid",
            "category": "acidifier",
            "e_number": "E334",
            "otherIngredient": "from grapes"
        }))
        .unwrap();
        assert_eq!(data.category, IngredientCategory::Acidifier);
        assert_eq!(data.e_number.as_deref(), Some("E334"));
        assert_eq!(data.other_ingredient_detail.as_deref(), Some("from grapes"));
        assert!(data.allergens.is_empty());
    }

    #[test]
    fn patch_replaces_allergens_and_keeps_the_rest() {
        let mut data = create(serde_json::json!({
            "name": "Casein",
            "category": "Fining Agent",
            "allergens": ["milk"]
        }))
        .unwrap();
        let patch: UpdateIngredientRequest =
            serde_json::from_value(serde_json::json!({ "allergens": ["milk", "lactose", "milk"] })).unwrap();
        patch.into_patch().unwrap().apply(&mut data);
        assert_eq!(data.allergens, ["milk", "lactose"]);
        assert_eq!(data.category, IngredientCategory::FiningAgent);
        assert_eq!(data.name, "Casein");
    }

    #[test]
    fn patch_rejects_blank_category() {
        let patch: UpdateIngredientRequest = serde_json::from_value(serde_json::json!({ "category": "" })).unwrap();
        assert!(patch.into_patch().unwrap_err().names("category"));
    }

    #[test]
    fn allergens_must_not_contain_commas() {
        let err = create(serde_json::json!({
            "name": "Mixed nuts",
            "category": "Other",
            "allergens": ["nuts, tree"]
        }))
        .unwrap_err();
        assert!(err.names("allergens"));

        let patch: UpdateIngredientRequest =
            serde_json::from_value(serde_json::json!({ "allergens": ["milk", "egg,soy"] })).unwrap();
        assert!(patch.into_patch().unwrap_err().names("allergens"));
    }

    #[test]
    fn numeric_name_is_text() {
        let data = create(serde_json::json!({ "name": 330, "category": "Other" })).unwrap();
        assert_eq!(data.name, "330");
    }
}
