// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Product entity and its request DTOs.
//!
//! | Type | Purpose | Direction |
//! |------|---------|-----------|
//! | [`CreateProductRequest`] | Full record from a client or a spreadsheet row | Request body |
//! | [`UpdateProductRequest`] | Any subset of fields | Request body |
//! | [`ProductData`] | Validated, normalized fields | Into the store |
//! | [`ProductPatch`] | Validated partial change | Into the store |
//! | [`Product`] | Stored record with id and timestamps | Response body |

use chrono::{DateTime, Utc};
use elabel_core::Identified;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{
    SugarContent, WineType, lenient,
    validation::{ValidationError, Violations, check_image, clean, clean_patch}
};

/// Label-relevant fields of a product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductData {
    /// Commercial name; never empty.
    pub name: String,

    /// Brand or producer name.
    pub brand: Option<String>,

    /// Free-form volume such as `750ml`.
    pub net_volume: Option<String>,

    /// Harvest year, kept as text (`2019`, `NV`).
    pub vintage: Option<String>,

    /// Style of wine.
    pub wine_type: Option<WineType>,

    /// Residual sugar classification.
    pub sugar_content: Option<SugarContent>,

    /// Protected designation or geographical indication.
    pub appellation: Option<String>,

    /// Alcohol by volume as printed, e.g. `13.5% vol`.
    pub alcohol_content: Option<String>,

    /// Ingredient statement as printed, independent of linked ingredients.
    pub ingredients_text: Option<String>,

    /// Protective gases used in packaging.
    pub packaging_gases: Option<String>,

    /// Reference portion for the nutrition values.
    pub portion_size: Option<String>,

    /// Unit of the reference portion.
    pub unit: Option<String>,

    /// Energy in kilocalories per portion.
    pub kcal: Option<String>,

    /// Energy in kilojoules per portion.
    pub kj: Option<String>,

    /// Fat per portion.
    pub fat: Option<String>,

    /// Carbohydrates per portion.
    pub carbohydrates: Option<String>,

    /// Certified organic.
    pub organic: bool,

    /// Suitable for vegetarians.
    pub vegetarian: bool,

    /// Suitable for vegans.
    pub vegan: bool,

    /// Role of the food business operator (bottler, importer, ...).
    pub operator_type: Option<String>,

    /// Name of the food business operator.
    pub operator_name: Option<String>,

    /// Postal address of the food business operator.
    pub operator_address: Option<String>,

    /// Extra label text.
    pub additional_info: Option<String>,

    /// Country where the wine was produced.
    pub country_of_origin: Option<String>,

    /// Internal stock keeping unit.
    pub sku: Option<String>,

    /// EAN/GTIN barcode number.
    pub ean: Option<String>,

    /// Link encoded in the label QR code.
    pub barcode_link: Option<String>,

    /// Public product page outside this service.
    pub external_link: Option<String>,

    /// Short link that redirects to the label page.
    pub redirect_link: Option<String>,

    /// Image URL or inline `data:image/...` URI.
    pub image: Option<String>
}

/// A stored product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Random identifier assigned on create.
    pub id: Uuid,

    /// Label fields, flattened into the JSON object.
    #[serde(flatten)]
    pub data: ProductData,

    /// Set once on create.
    pub created_at: DateTime<Utc>,

    /// Moves forward on every update.
    pub updated_at: DateTime<Utc>
}

impl Identified for Product {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Request body for creating a product.
///
/// Unknown keys, including `id`, `createdAt` and `updatedAt`, are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default, deserialize_with = "lenient::text")]
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub name:              String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub brand:             Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub net_volume:        Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub vintage:           Option<String>,
    #[serde(default, alias = "type", deserialize_with = "lenient::opt_text")]
    #[schema(value_type = Option<WineType>)]
    pub wine_type:         Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    #[schema(value_type = Option<SugarContent>)]
    pub sugar_content:     Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub appellation:       Option<String>,
    #[serde(default, alias = "alcohol", deserialize_with = "lenient::opt_text")]
    pub alcohol_content:   Option<String>,
    #[serde(default, alias = "ingredients", deserialize_with = "lenient::opt_text")]
    pub ingredients_text:  Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub packaging_gases:   Option<String>,
    #[serde(default, alias = "portion", deserialize_with = "lenient::opt_text")]
    pub portion_size:      Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub unit:              Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub kcal:              Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub kj:                Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub fat:               Option<String>,
    #[serde(default, alias = "carbs", deserialize_with = "lenient::opt_text")]
    pub carbohydrates:     Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub organic:           bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub vegetarian:        bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub vegan:             bool,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub operator_type:     Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub operator_name:     Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub operator_address:  Option<String>,
    #[serde(default, alias = "operatorAdditionalInfo", deserialize_with = "lenient::opt_text")]
    pub additional_info:   Option<String>,
    #[serde(default, alias = "country", deserialize_with = "lenient::opt_text")]
    pub country_of_origin: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub sku:               Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub ean:               Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub barcode_link:      Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub external_link:     Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub redirect_link:     Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub image:             Option<String>
}

impl CreateProductRequest {
    /// Normalize and validate into storable fields.
    ///
    /// Text is trimmed, blank optional text becomes `None`, flags default
    /// to `false`. Every rejected field is reported.
    pub fn into_data(mut self) -> Result<ProductData, ValidationError> {
        self.name = self.name.trim().to_owned();
        let mut violations = Violations::from_validator(self.validate());

        let wine_type = violations.label("wineType", clean(self.wine_type).as_deref());
        let sugar_content = violations.label("sugarContent", clean(self.sugar_content).as_deref());
        let image = clean(self.image);
        check_image(&mut violations, "image", image.as_deref());

        violations.finish(|| ProductData {
            name: self.name,
            brand: clean(self.brand),
            net_volume: clean(self.net_volume),
            vintage: clean(self.vintage),
            wine_type,
            sugar_content,
            appellation: clean(self.appellation),
            alcohol_content: clean(self.alcohol_content),
            ingredients_text: clean(self.ingredients_text),
            packaging_gases: clean(self.packaging_gases),
            portion_size: clean(self.portion_size),
            unit: clean(self.unit),
            kcal: clean(self.kcal),
            kj: clean(self.kj),
            fat: clean(self.fat),
            carbohydrates: clean(self.carbohydrates),
            organic: self.organic,
            vegetarian: self.vegetarian,
            vegan: self.vegan,
            operator_type: clean(self.operator_type),
            operator_name: clean(self.operator_name),
            operator_address: clean(self.operator_address),
            additional_info: clean(self.additional_info),
            country_of_origin: clean(self.country_of_origin),
            sku: clean(self.sku),
            ean: clean(self.ean),
            barcode_link: clean(self.barcode_link),
            external_link: clean(self.external_link),
            redirect_link: clean(self.redirect_link),
            image
        })
    }
}

/// Request body for a partial product update.
///
/// Absent and `null` fields are left untouched; an empty string clears an
/// optional field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub name:              Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub brand:             Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub net_volume:        Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub vintage:           Option<String>,
    #[serde(default, alias = "type", deserialize_with = "lenient::opt_text")]
    #[schema(value_type = Option<WineType>)]
    pub wine_type:         Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    #[schema(value_type = Option<SugarContent>)]
    pub sugar_content:     Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub appellation:       Option<String>,
    #[serde(default, alias = "alcohol", deserialize_with = "lenient::opt_text")]
    pub alcohol_content:   Option<String>,
    #[serde(default, alias = "ingredients", deserialize_with = "lenient::opt_text")]
    pub ingredients_text:  Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub packaging_gases:   Option<String>,
    #[serde(default, alias = "portion", deserialize_with = "lenient::opt_text")]
    pub portion_size:      Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub unit:              Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub kcal:              Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub kj:                Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub fat:               Option<String>,
    #[serde(default, alias = "carbs", deserialize_with = "lenient::opt_text")]
    pub carbohydrates:     Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub organic:           Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub vegetarian:        Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub vegan:             Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub operator_type:     Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub operator_name:     Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub operator_address:  Option<String>,
    #[serde(default, alias = "operatorAdditionalInfo", deserialize_with = "lenient::opt_text")]
    pub additional_info:   Option<String>,
    #[serde(default, alias = "country", deserialize_with = "lenient::opt_text")]
    pub country_of_origin: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub sku:               Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub ean:               Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub barcode_link:      Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub external_link:     Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub redirect_link:     Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub image:             Option<String>
}

impl UpdateProductRequest {
    /// Validate only the supplied fields.
    pub fn into_patch(mut self) -> Result<ProductPatch, ValidationError> {
        self.name = self.name.map(|n| n.trim().to_owned());
        let mut violations = Violations::from_validator(self.validate());

        let wine_type = violations.label_patch("wineType", clean_patch(self.wine_type));
        let sugar_content = violations.label_patch("sugarContent", clean_patch(self.sugar_content));
        let image = clean_patch(self.image);
        check_image(&mut violations, "image", image.as_ref().and_then(|i| i.as_deref()));

        violations.finish(|| ProductPatch {
            name: self.name,
            brand: clean_patch(self.brand),
            net_volume: clean_patch(self.net_volume),
            vintage: clean_patch(self.vintage),
            wine_type,
            sugar_content,
            appellation: clean_patch(self.appellation),
            alcohol_content: clean_patch(self.alcohol_content),
            ingredients_text: clean_patch(self.ingredients_text),
            packaging_gases: clean_patch(self.packaging_gases),
            portion_size: clean_patch(self.portion_size),
            unit: clean_patch(self.unit),
            kcal: clean_patch(self.kcal),
            kj: clean_patch(self.kj),
            fat: clean_patch(self.fat),
            carbohydrates: clean_patch(self.carbohydrates),
            organic: self.organic,
            vegetarian: self.vegetarian,
            vegan: self.vegan,
            operator_type: clean_patch(self.operator_type),
            operator_name: clean_patch(self.operator_name),
            operator_address: clean_patch(self.operator_address),
            additional_info: clean_patch(self.additional_info),
            country_of_origin: clean_patch(self.country_of_origin),
            sku: clean_patch(self.sku),
            ean: clean_patch(self.ean),
            barcode_link: clean_patch(self.barcode_link),
            external_link: clean_patch(self.external_link),
            redirect_link: clean_patch(self.redirect_link),
            image
        })
    }
}

/// Validated partial change to a product.
///
/// `None` leaves a field alone; `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name:              Option<String>,
    pub brand:             Option<Option<String>>,
    pub net_volume:        Option<Option<String>>,
    pub vintage:           Option<Option<String>>,
    pub wine_type:         Option<Option<WineType>>,
    pub sugar_content:     Option<Option<SugarContent>>,
    pub appellation:       Option<Option<String>>,
    pub alcohol_content:   Option<Option<String>>,
    pub ingredients_text:  Option<Option<String>>,
    pub packaging_gases:   Option<Option<String>>,
    pub portion_size:      Option<Option<String>>,
    pub unit:              Option<Option<String>>,
    pub kcal:              Option<Option<String>>,
    pub kj:                Option<Option<String>>,
    pub fat:               Option<Option<String>>,
    pub carbohydrates:     Option<Option<String>>,
    pub organic:           Option<bool>,
    pub vegetarian:        Option<bool>,
    pub vegan:             Option<bool>,
    pub operator_type:     Option<Option<String>>,
    pub operator_name:     Option<Option<String>>,
    pub operator_address:  Option<Option<String>>,
    pub additional_info:   Option<Option<String>>,
    pub country_of_origin: Option<Option<String>>,
    pub sku:               Option<Option<String>>,
    pub ean:               Option<Option<String>>,
    pub barcode_link:      Option<Option<String>>,
    pub external_link:     Option<Option<String>>,
    pub redirect_link:     Option<Option<String>>,
    pub image:             Option<Option<String>>
}

impl ProductPatch {
    /// Merge into stored fields.
    pub fn apply(self, data: &mut ProductData) {
        super::set(&mut data.name, self.name);
        super::set(&mut data.brand, self.brand);
        super::set(&mut data.net_volume, self.net_volume);
        super::set(&mut data.vintage, self.vintage);
        super::set(&mut data.wine_type, self.wine_type);
        super::set(&mut data.sugar_content, self.sugar_content);
        super::set(&mut data.appellation, self.appellation);
        super::set(&mut data.alcohol_content, self.alcohol_content);
        super::set(&mut data.ingredients_text, self.ingredients_text);
        super::set(&mut data.packaging_gases, self.packaging_gases);
        super::set(&mut data.portion_size, self.portion_size);
        super::set(&mut data.unit, self.unit);
        super::set(&mut data.kcal, self.kcal);
        super::set(&mut data.kj, self.kj);
        super::set(&mut data.fat, self.fat);
        super::set(&mut data.carbohydrates, self.carbohydrates);
        super::set(&mut data.organic, self.organic);
        super::set(&mut data.vegetarian, self.vegetarian);
        super::set(&mut data.vegan, self.vegan);
        super::set(&mut data.operator_type, self.operator_type);
        super::set(&mut data.operator_name, self.operator_name);
        super::set(&mut data.operator_address, self.operator_address);
        super::set(&mut data.additional_info, self.additional_info);
        super::set(&mut data.country_of_origin, self.country_of_origin);
        super::set(&mut data.sku, self.sku);
        super::set(&mut data.ean, self.ean);
        super::set(&mut data.barcode_link, self.barcode_link);
        super::set(&mut data.external_link, self.external_link);
        super::set(&mut data.redirect_link, self.redirect_link);
        super::set(&mut data.image, self.image);
    }
}
