// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Core vocabulary for the wine e-label service.
//!
//! This crate holds the store-independent pieces shared by the server and
//! by any client that talks to it:
//!
//! - [`EntityKind`]: the three record kinds and their table names
//! - [`Identified`]: records addressable by an opaque UUID
//! - [`MutationKind`]: categories of mutating operations
//! - [`sync`]: how a client reconciles a local list after a mutation
//!
//! # Usage
//!
//! ```rust
//! use elabel_core::prelude::*;
//!
//! assert_eq!(EntityKind::Product.table(), "products");
//! assert!(MutationKind::Deleted.is_delete());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod prelude;
pub mod sync;

use std::fmt;

pub use uuid::Uuid;

/// Kind of persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A wine product carrying label disclosures.
    Product,

    /// A reusable ingredient catalog entry.
    Ingredient,

    /// Join record linking a product to an ingredient.
    ProductIngredient
}

impl EntityKind {
    /// Relational table backing this kind.
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Product => "products",
            Self::Ingredient => "ingredients",
            Self::ProductIngredient => "product_ingredients"
        }
    }

    /// Human-readable singular label used in messages.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::Ingredient => "Ingredient",
            Self::ProductIngredient => "Product ingredient"
        }
    }

    /// Whether deleting a record of this kind cascades to association rows.
    pub const fn cascades_to_associations(&self) -> bool {
        matches!(self, Self::Product | Self::Ingredient)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A record addressable by an opaque, immutable identifier.
///
/// # Example
///
/// ```rust
/// use elabel_core::{Identified, Uuid};
///
/// struct Row {
///     id: Uuid
/// }
///
/// impl Identified for Row {
///     fn id(&self) -> Uuid {
///         self.id
///     }
/// }
/// ```
pub trait Identified {
    /// The record's identifier.
    fn id(&self) -> Uuid;
}

/// Kind of mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// Record was created.
    Created,

    /// Record was partially updated.
    Updated,

    /// Record was removed.
    Deleted
}

impl MutationKind {
    /// Check if this is a delete.
    pub const fn is_delete(&self) -> bool {
        matches!(self, Self::Deleted)
    }
}
