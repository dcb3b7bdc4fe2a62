// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Convenient re-exports for common usage.
//!
//! # Usage
//!
//! ```rust,ignore
//! use elabel_core::prelude::*;
//! ```

pub use crate::{
    EntityKind, Identified, MutationKind, Uuid,
    sync::{Mutation, QueryKey, reconcile}
};
