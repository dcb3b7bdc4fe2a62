// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use super::{
    TransferError,
    columns::{Cell, Column, INGREDIENT_COLUMNS, PRODUCT_COLUMNS, continuation_header}
};
use crate::schema::{Ingredient, Product};

/// Longest text Excel accepts in one cell.
const MAX_CELL_CHARS: usize = 32_767;

/// Cut `text` into cell-sized pieces on char boundaries. Never empty.
fn split_cell(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some((at, _)) = rest.char_indices().nth(MAX_CELL_CHARS) {
        let (head, tail) = rest.split_at(at);
        parts.push(head);
        rest = tail;
    }
    parts.push(rest);
    parts
}

fn write_sheet<T>(name: &str, columns: &[Column<T>], records: &[T]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(name)?;

    let values: Vec<Vec<Cell>> = records
        .iter()
        .map(|record| columns.iter().map(|column| (column.value)(record)).collect())
        .collect();
    let parts: Vec<usize> = (0..columns.len())
        .map(|i| {
            values
                .iter()
                .map(|row| match &row[i] {
                    Cell::Text(Some(text)) => split_cell(text).len(),
                    _ => 1
                })
                .max()
                .unwrap_or(1)
        })
        .collect();

    let bold = Format::new().set_bold();
    for (col, column) in (0u16..).zip(columns) {
        sheet.write_string_with_format(0, col, column.header, &bold)?;
    }
    // Sheet column holding part 2 of each column.
    let mut spill = Vec::with_capacity(columns.len());
    let mut next = columns.len();
    for (column, &count) in columns.iter().zip(&parts) {
        spill.push(next);
        for part in 2..=count {
            sheet.write_string_with_format(0, sheet_col(next)?, continuation_header(column.header, part), &bold)?;
            next += 1;
        }
        if count > 1 {
            tracing::debug!(column = column.header, parts = count, "long text split across columns");
        }
    }
    sheet.set_freeze_panes(1, 0)?;

    for (row, cells) in (1u32..).zip(&values) {
        for (i, cell) in cells.iter().enumerate() {
            match cell {
                Cell::Flag(flag) => {
                    sheet.write_boolean(row, sheet_col(i)?, *flag)?;
                }
                Cell::Text(Some(text)) => {
                    for (part, piece) in split_cell(text).into_iter().enumerate() {
                        let col = if part == 0 { i } else { spill[i] + part - 1 };
                        sheet.write_string(row, sheet_col(col)?, piece)?;
                    }
                }
                Cell::Text(None) => {}
            }
        }
    }

    sheet.autofit();
    workbook.save_to_buffer()
}

fn sheet_col(index: usize) -> Result<u16, XlsxError> {
    u16::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

/// Products as an `.xlsx` workbook, one row per record in the given order.
pub fn export_products(products: &[Product]) -> Result<Vec<u8>, TransferError> {
    write_sheet("Products", PRODUCT_COLUMNS, products).map_err(|e| TransferError::Write(e.to_string()))
}

/// Ingredients as an `.xlsx` workbook.
pub fn export_ingredients(ingredients: &[Ingredient]) -> Result<Vec<u8>, TransferError> {
    write_sheet("Ingredients", INGREDIENT_COLUMNS, ingredients).map_err(|e| TransferError::Write(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_export_is_a_zip_container() {
        let bytes = export_products(&[]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn long_text_splits_on_char_boundaries() {
        assert_eq!(split_cell(""), [""]);
        assert_eq!(split_cell("short"), ["short"]);

        let text = "é".repeat(MAX_CELL_CHARS * 2 + 5);
        let parts = split_cell(&text);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].chars().count(), MAX_CELL_CHARS);
        assert_eq!(parts[1].chars().count(), MAX_CELL_CHARS);
        assert_eq!(parts[2].chars().count(), 5);
        assert_eq!(parts.concat(), text);

        assert_eq!(split_cell(&"a".repeat(MAX_CELL_CHARS)).len(), 1);
    }
}
