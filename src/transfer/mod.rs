// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Spreadsheet import and export.
//!
//! Both directions share one column table per entity (see [`columns`]), so
//! an exported workbook imports back into field-equal records.
//!
//! # Import
//!
//! ```text
//! workbook bytes ─► first sheet ─► header row ─► column keys
//!                                     │
//!           each data row ─► JSON object ─► Create*Request ─► into_data ─► store
//! ```
//!
//! Rows run sequentially in file order. A failing row is recorded in the
//! [`ImportReport`] and the next row is processed; fully blank rows are
//! skipped.

pub mod columns;
mod export;
mod import;

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub use export::{export_ingredients, export_products};
pub use import::{import_ingredients, import_products};

/// Workbook-level failure.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The upload is not a readable spreadsheet.
    #[error("Unreadable spreadsheet: {0}")]
    Read(String),

    /// The workbook could not be produced.
    #[error("Failed to write spreadsheet: {0}")]
    Write(String)
}

/// One rejected row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImportFailure {
    /// 1-based sheet row, the header being row 1.
    pub row:   usize,
    pub error: String
}

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImportReport {
    pub imported: usize,
    pub failed:   usize,
    pub failures: Vec<ImportFailure>
}

impl ImportReport {
    fn success(&mut self) {
        self.imported += 1;
    }

    fn failure(&mut self, row: usize, error: impl ToString) {
        let error = error.to_string();
        tracing::warn!(row, %error, "import row rejected");
        self.failed += 1;
        self.failures.push(ImportFailure {
            row,
            error
        });
    }
}
