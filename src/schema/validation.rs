// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field-level validation failures.
//!
//! Request DTOs derive [`validator::Validate`] for structural rules and add
//! enum membership checks on top. Both feed one [`Violations`] collector so
//! a rejected record reports every offending field at once, named the way
//! clients see it (camelCase).

use std::{fmt, str::FromStr};

use convert_case::{Case, Casing};
use serde::Serialize;
use utoipa::ToSchema;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldViolation {
    /// Field name as it appears in JSON.
    pub field:  String,
    /// Why the value was rejected.
    pub reason: String
}

/// A record failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<FieldViolation>
}

impl ValidationError {
    /// Rejected fields, sorted by field name.
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Check whether `field` is among the rejected fields.
    pub fn names(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.reason))
            .collect();
        write!(f, "invalid input: {}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Collects violations while a record is being checked.
#[derive(Debug, Default)]
pub struct Violations {
    items: Vec<FieldViolation>
}

impl Violations {
    /// Start from the outcome of a `validator` pass.
    pub fn from_validator(result: Result<(), validator::ValidationErrors>) -> Self {
        let mut out = Self::default();
        if let Err(errors) = result {
            for (field, errs) in errors.field_errors() {
                let field = field.to_string().to_case(Case::Camel);
                for err in errs.iter() {
                    let reason = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    out.push(&field, reason);
                }
            }
        }
        out
    }

    /// Record a violation.
    pub fn push(&mut self, field: &str, reason: impl Into<String>) {
        self.items.push(FieldViolation {
            field:  field.to_owned(),
            reason: reason.into()
        });
    }

    /// Parse an optional label, recording a violation if it is unknown.
    pub fn label<T>(&mut self, field: &str, value: Option<&str>) -> Option<T>
    where
        T: FromStr,
        T::Err: fmt::Display
    {
        let value = value?;
        match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.push(field, format!("must be one of the allowed values ({e})"));
                None
            }
        }
    }

    /// Parse a label inside a patch field, keeping the clear/absent distinction.
    pub fn label_patch<T>(&mut self, field: &str, value: Option<Option<String>>) -> Option<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display
    {
        match value {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) => self.label(field, Some(&raw)).map(Some)
        }
    }

    /// Finish, yielding `value` only if nothing was rejected.
    pub fn finish<T>(mut self, value: impl FnOnce() -> T) -> Result<T, ValidationError> {
        if self.items.is_empty() {
            return Ok(value());
        }
        self.items.sort_by(|a, b| a.field.cmp(&b.field));
        Err(ValidationError {
            violations: self.items
        })
    }
}

/// Trim text, mapping blank input to `None`.
pub fn clean(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    })
}

/// Trim text inside a patch field.
///
/// Absent stays absent (`None`); blank input becomes `Some(None)`, which
/// clears the stored value.
pub fn clean_patch(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| clean(Some(v)))
}

/// Trim, drop blanks and remove duplicate tags, keeping first occurrences.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_owned());
        }
    }
    out
}

/// Check that no tag contains the spreadsheet list separator.
pub fn check_tags(violations: &mut Violations, field: &str, tags: &[String]) {
    if tags.iter().any(|t| t.contains(',')) {
        violations.push(field, "tags must not contain commas");
    }
}

/// Check that an image reference is a URL or an inline data URI.
pub fn check_image(violations: &mut Violations, field: &str, value: Option<&str>) {
    if let Some(v) = value {
        let ok = v.starts_with("http://") || v.starts_with("https://") || v.starts_with("data:image/");
        if !ok {
            violations.push(field, "must be an http(s) URL or a data:image/ URI");
        }
    }
}
