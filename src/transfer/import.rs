// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use serde_json::{Map, Value};

use super::{
    ImportReport, TransferError,
    columns::{Column, INGREDIENT_COLUMNS, Kind, PRODUCT_COLUMNS, parse_continuation, resolve}
};
use crate::{
    schema::{CreateIngredientRequest, CreateProductRequest, IngredientCategory},
    store::{IngredientRepository, ProductRepository}
};

/// A data row keyed by JSON field name.
struct SheetRow {
    /// 1-based sheet row.
    number: usize,
    fields: Map<String, Value>
}

/// What a header cell maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Field(&'static str, Kind),
    /// `part`-th piece of a text field too long for one cell.
    Spill(&'static str, usize)
}

fn slot<T>(columns: &[Column<T>], title: &str) -> Option<Slot> {
    if let Some(column) = resolve(columns, title) {
        return column.key.map(|key| Slot::Field(key, column.kind));
    }
    let (base, part) = parse_continuation(title)?;
    let column = resolve(columns, base).filter(|c| c.kind == Kind::Text)?;
    column.key.map(|key| Slot::Spill(key, part))
}

/// Read the first sheet into keyed rows, skipping blank ones.
fn read_rows<T>(bytes: &[u8], columns: &[Column<T>]) -> Result<Vec<SheetRow>, TransferError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|e| TransferError::Read(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TransferError::Read("workbook has no sheets".into()))?
        .map_err(|e| TransferError::Read(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let layout: Vec<Option<Slot>> = header
        .iter()
        .map(|cell| cell_text(cell).and_then(|title| slot(columns, &title)))
        .collect();

    // calamine trims leading empty rows and columns; offset keeps numbers
    // aligned with what a user sees in a spreadsheet program.
    let first_row = range.start().map_or(0, |(row, _)| row as usize);

    let mut out = Vec::new();
    for (index, cells) in rows.enumerate() {
        let mut fields = Map::new();
        let mut heads: Vec<(&'static str, &str)> = Vec::new();
        let mut spills: Vec<(&'static str, usize, &str)> = Vec::new();
        for (cell, slot) in cells.iter().zip(&layout) {
            match (slot, cell) {
                (Some(Slot::Field(key, kind)), _) => {
                    if let Some(value) = cell_value(cell, *kind) {
                        fields.insert((*key).to_owned(), value);
                    }
                    if let Data::String(raw) = cell {
                        heads.push((*key, raw.as_str()));
                    }
                }
                (Some(Slot::Spill(key, part)), Data::String(raw)) if !raw.is_empty() => {
                    spills.push((*key, *part, raw.as_str()));
                }
                _ => {}
            }
        }
        join_spills(&mut fields, &heads, spills);
        if !fields.is_empty() {
            out.push(SheetRow {
                number: first_row + index + 2,
                fields
            });
        }
    }
    Ok(out)
}

/// Rebuild long text from its head cell and continuation cells, untrimmed
/// so that pieces split on whitespace join back exactly.
fn join_spills(
    fields: &mut Map<String, Value>,
    heads: &[(&'static str, &str)],
    mut spills: Vec<(&'static str, usize, &str)>
) {
    spills.sort_by_key(|&(key, part, _)| (key, part));
    let mut current = None;
    for (key, _, piece) in spills {
        if current != Some(key) {
            current = Some(key);
            let head = heads.iter().find(|(k, _)| *k == key).map_or("", |&(_, raw)| raw);
            fields.insert(key.to_owned(), Value::String(head.to_owned()));
        }
        if let Some(Value::String(text)) = fields.get_mut(key) {
            text.push_str(piece);
        }
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_owned())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(dt.as_f64().to_string()),
        Data::Error(_) | Data::Empty => None
    }
}

/// Convert a cell to the JSON the request DTO expects. Blank cells are
/// absent rather than empty strings.
fn cell_value(cell: &Data, kind: Kind) -> Option<Value> {
    match (cell, kind) {
        (Data::Empty | Data::Error(_), _) => None,
        (Data::Bool(b), _) => Some(Value::Bool(*b)),
        (Data::Int(i), Kind::Text | Kind::Flag) => Some(Value::from(*i)),
        // Whole numbers come back from Excel as floats; keep `2019` from
        // turning into `2019.0` and `1` readable as a flag.
        (Data::Float(f), Kind::Text | Kind::Flag) if f.fract() == 0.0 && f.abs() < 1e15 => {
            Some(Value::from(*f as i64))
        }
        (Data::Float(f), Kind::Text | Kind::Flag) => Some(Value::from(*f)),
        (_, Kind::Tags) => {
            let tags: Vec<Value> = cell_text(cell)?
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| Value::String(t.to_owned()))
                .collect();
            Some(Value::Array(tags))
        }
        (_, Kind::Text | Kind::Flag) => cell_text(cell).map(Value::String)
    }
}

/// Import products from an `.xlsx`, `.xls` or `.ods` workbook.
pub async fn import_products<R>(store: &R, bytes: &[u8]) -> Result<ImportReport, TransferError>
where
    R: ProductRepository + ?Sized
{
    let rows = read_rows(bytes, PRODUCT_COLUMNS)?;
    let mut report = ImportReport::default();

    for row in rows {
        let data = match serde_json::from_value::<CreateProductRequest>(Value::Object(row.fields)) {
            Ok(request) => request.into_data(),
            Err(e) => {
                report.failure(row.number, e);
                continue;
            }
        };
        match data {
            Ok(data) => match store.create_product(data).await {
                Ok(_) => report.success(),
                Err(e) => report.failure(row.number, e)
            },
            Err(e) => report.failure(row.number, e)
        }
    }

    tracing::info!(imported = report.imported, failed = report.failed, "product import finished");
    Ok(report)
}

/// Import ingredients. Missing or unrecognised categories become `Other`.
pub async fn import_ingredients<R>(store: &R, bytes: &[u8]) -> Result<ImportReport, TransferError>
where
    R: IngredientRepository + ?Sized
{
    let rows = read_rows(bytes, INGREDIENT_COLUMNS)?;
    let mut report = ImportReport::default();

    for mut row in rows {
        default_category(row.number, &mut row.fields);
        let data = match serde_json::from_value::<CreateIngredientRequest>(Value::Object(row.fields)) {
            Ok(request) => request.into_data(),
            Err(e) => {
                report.failure(row.number, e);
                continue;
            }
        };
        match data {
            Ok(data) => match store.create_ingredient(data).await {
                Ok(_) => report.success(),
                Err(e) => report.failure(row.number, e)
            },
            Err(e) => report.failure(row.number, e)
        }
    }

    tracing::info!(imported = report.imported, failed = report.failed, "ingredient import finished");
    Ok(report)
}

fn default_category(row: usize, fields: &mut Map<String, Value>) {
    let known = match fields.get("category") {
        Some(Value::String(s)) => s.parse::<IngredientCategory>().is_ok(),
        _ => false
    };
    if !known {
        if let Some(original) = fields.get("category") {
            tracing::warn!(row, category = %original, "unknown ingredient category, using Other");
        }
        fields.insert(
            "category".to_owned(),
            Value::String(IngredientCategory::Other.as_str().to_owned())
        );
    }
}
