// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Column tables.
//!
//! Order here is the export order. On import a header matches a column by
//! its display header, its JSON key or an alias, compared after dropping
//! case, spaces and punctuation, so `E Number`, `e_number` and `eNumber`
//! are the same column.
//!
//! Text longer than one cell holds spills into continuation columns named
//! `<header> (2)`, `<header> (3)` and so on, appended after the table.

use crate::schema::{Ingredient, Product};

/// How a column's cells are read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Text,
    Flag,
    /// Comma-separated list.
    Tags
}

/// Exported cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(Option<String>),
    Flag(bool)
}

/// One spreadsheet column.
pub struct Column<T> {
    pub header:  &'static str,
    /// JSON key fed to the request DTO; `None` for export-only columns.
    pub key:     Option<&'static str>,
    pub kind:    Kind,
    pub aliases: &'static [&'static str],
    pub value:   fn(&T) -> Cell
}

impl<T> Column<T> {
    const fn new(header: &'static str, key: &'static str, kind: Kind, value: fn(&T) -> Cell) -> Self {
        Self {
            header,
            key: Some(key),
            kind,
            aliases: &[],
            value
        }
    }

    const fn text(header: &'static str, key: &'static str, value: fn(&T) -> Cell) -> Self {
        Self::new(header, key, Kind::Text, value)
    }

    const fn flag(header: &'static str, key: &'static str, value: fn(&T) -> Cell) -> Self {
        Self::new(header, key, Kind::Flag, value)
    }

    const fn export_only(header: &'static str, value: fn(&T) -> Cell) -> Self {
        Self {
            header,
            key: None,
            kind: Kind::Text,
            aliases: &[],
            value
        }
    }

    const fn or(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    fn matches(&self, normalized: &str) -> bool {
        normalize(self.header) == normalized
            || self.key.is_some_and(|k| normalize(k) == normalized)
            || self.aliases.iter().any(|a| normalize(a) == normalized)
    }
}

/// Lowercase alphanumerics only.
pub fn normalize(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Importable column for a header cell.
pub fn resolve<'c, T>(columns: &'c [Column<T>], header: &str) -> Option<&'c Column<T>> {
    let normalized = normalize(header);
    if normalized.is_empty() {
        return None;
    }
    columns
        .iter()
        .filter(|c| c.key.is_some())
        .find(|c| c.matches(&normalized))
}

/// Header of the `part`-th continuation column (`part` starts at 2).
pub fn continuation_header(header: &str, part: usize) -> String {
    format!("{header} ({part})")
}

/// Split `Image (3)` into `("Image", 3)`. Parts below 2 are not
/// continuations.
pub fn parse_continuation(header: &str) -> Option<(&str, usize)> {
    let rest = header.trim().strip_suffix(')')?;
    let (base, part) = rest.rsplit_once(" (")?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let part: usize = part.parse().ok()?;
    (part >= 2).then_some((base.trim_end(), part))
}

fn text(value: &Option<String>) -> Cell {
    Cell::Text(value.clone())
}

fn label(value: Option<&'static str>) -> Cell {
    Cell::Text(value.map(str::to_owned))
}

fn stamp(value: &chrono::DateTime<chrono::Utc>) -> Cell {
    Cell::Text(Some(value.to_rfc3339()))
}

/// Product columns.
pub static PRODUCT_COLUMNS: &[Column<Product>] = &[
    Column::text("Name", "name", |p: &Product| Cell::Text(Some(p.data.name.clone()))),
    Column::text("Brand", "brand", |p: &Product| text(&p.data.brand)),
    Column::text("Net Volume", "netVolume", |p: &Product| text(&p.data.net_volume)),
    Column::text("Vintage", "vintage", |p: &Product| text(&p.data.vintage)),
    Column::text("Wine Type", "wineType", |p: &Product| label(p.data.wine_type.map(|v| v.as_str()))).or(&["Type"]),
    Column::text("Sugar Content", "sugarContent", |p: &Product| label(p.data.sugar_content.map(|v| v.as_str()))),
    Column::text("Appellation", "appellation", |p: &Product| text(&p.data.appellation)),
    Column::text("Alcohol Content", "alcoholContent", |p: &Product| text(&p.data.alcohol_content)).or(&["Alcohol", "ABV"]),
    Column::text("Ingredients", "ingredientsText", |p: &Product| text(&p.data.ingredients_text)),
    Column::text("Packaging Gases", "packagingGases", |p: &Product| text(&p.data.packaging_gases)),
    Column::text("Portion Size", "portionSize", |p: &Product| text(&p.data.portion_size)).or(&["Portion"]),
    Column::text("Unit", "unit", |p: &Product| text(&p.data.unit)),
    Column::text("Kcal", "kcal", |p: &Product| text(&p.data.kcal)),
    Column::text("kJ", "kj", |p: &Product| text(&p.data.kj)),
    Column::text("Fat", "fat", |p: &Product| text(&p.data.fat)),
    Column::text("Carbohydrates", "carbohydrates", |p: &Product| text(&p.data.carbohydrates)).or(&["Carbs"]),
    Column::flag("Organic", "organic", |p: &Product| Cell::Flag(p.data.organic)),
    Column::flag("Vegetarian", "vegetarian", |p: &Product| Cell::Flag(p.data.vegetarian)),
    Column::flag("Vegan", "vegan", |p: &Product| Cell::Flag(p.data.vegan)),
    Column::text("Operator Type", "operatorType", |p: &Product| text(&p.data.operator_type)),
    Column::text("Operator Name", "operatorName", |p: &Product| text(&p.data.operator_name)),
    Column::text("Operator Address", "operatorAddress", |p: &Product| text(&p.data.operator_address)),
    Column::text("Additional Info", "additionalInfo", |p: &Product| text(&p.data.additional_info))
        .or(&["Operator Additional Info"]),
    Column::text("Country of Origin", "countryOfOrigin", |p: &Product| text(&p.data.country_of_origin)).or(&["Country"]),
    Column::text("SKU", "sku", |p: &Product| text(&p.data.sku)),
    Column::text("EAN", "ean", |p: &Product| text(&p.data.ean)).or(&["Barcode"]),
    Column::text("Barcode Link", "barcodeLink", |p: &Product| text(&p.data.barcode_link)),
    Column::text("External Link", "externalLink", |p: &Product| text(&p.data.external_link)),
    Column::text("Redirect Link", "redirectLink", |p: &Product| text(&p.data.redirect_link)),
    Column::text("Image", "image", |p: &Product| text(&p.data.image)),
    Column::export_only("ID", |p: &Product| Cell::Text(Some(p.id.to_string()))),
    Column::export_only("Created At", |p: &Product| stamp(&p.created_at)),
    Column::export_only("Updated At", |p: &Product| stamp(&p.updated_at))
];

/// Ingredient columns.
pub static INGREDIENT_COLUMNS: &[Column<Ingredient>] = &[
    Column::text("Name", "name", |i: &Ingredient| Cell::Text(Some(i.data.name.clone()))),
    Column::text("Category", "category", |i: &Ingredient| label(Some(i.data.category.as_str()))),
    Column::text("E Number", "eNumber", |i: &Ingredient| text(&i.data.e_number)),
    Column::text("Other Ingredient", "otherIngredientDetail", |i: &Ingredient| text(&i.data.other_ingredient_detail)),
    Column::new("Allergens", "allergens", Kind::Tags, |i: &Ingredient| {
        Cell::Text((!i.data.allergens.is_empty()).then(|| i.data.allergens.join(", ")))
    }),
    Column::export_only("ID", |i: &Ingredient| Cell::Text(Some(i.id.to_string()))),
    Column::export_only("Created At", |i: &Ingredient| stamp(&i.created_at)),
    Column::export_only("Updated At", |i: &Ingredient| stamp(&i.updated_at))
];
