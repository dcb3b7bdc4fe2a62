// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Client cache reconciliation.
//!
//! A client keeps lists and single records keyed by [`QueryKey`]. After a
//! mutation succeeds it must bring its local state in line with the server
//! without a refetch:
//!
//! | Mutation | List view | Item view |
//! |----------|-----------|-----------|
//! | `Created(record)` | append | store |
//! | `Updated(record)` | replace by id (append if missing) | store |
//! | `Deleted(id)` | remove by id | drop |
//!
//! Every create and update response carries the complete record, which is
//! what makes this possible. [`Mutation::invalidates`] lists the keys a
//! client should additionally mark stale.
//!
//! # Example
//!
//! ```rust
//! use elabel_core::{EntityKind, Identified, Uuid, sync::{Mutation, reconcile}};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Row {
//!     id:   Uuid,
//!     name: &'static str
//! }
//!
//! impl Identified for Row {
//!     fn id(&self) -> Uuid {
//!         self.id
//!     }
//! }
//!
//! let row = Row { id: Uuid::new_v4(), name: "Merlot" };
//! let mut list = Vec::new();
//! reconcile(&mut list, Mutation::Created(row.clone()));
//! assert_eq!(list, vec![row.clone()]);
//!
//! reconcile(&mut list, Mutation::<Row>::Deleted(row.id));
//! assert!(list.is_empty());
//! ```

use uuid::Uuid;

use crate::{EntityKind, Identified, MutationKind};

/// Cache key under which a client stores server state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Full list of one entity kind.
    List(EntityKind),

    /// A single record.
    Item(EntityKind, Uuid),

    /// Association rows of one product.
    Associations(Uuid),

    /// Association rows of every product.
    AllAssociations
}

impl QueryKey {
    /// Check whether invalidating `self` makes `cached` stale.
    ///
    /// Keys match exactly, except that [`QueryKey::AllAssociations`] covers
    /// every [`QueryKey::Associations`] key.
    pub fn covers(&self, cached: &QueryKey) -> bool {
        match (self, cached) {
            (Self::AllAssociations, Self::Associations(_)) => true,
            _ => self == cached
        }
    }
}

/// A successful mutation as observed from its response.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<T> {
    /// Record returned by a create call.
    Created(T),

    /// Record returned by an update call.
    Updated(T),

    /// Identifier passed to a delete call.
    Deleted(Uuid)
}

impl<T: Identified> Mutation<T> {
    /// Get the kind of mutation.
    pub const fn kind(&self) -> MutationKind {
        match self {
            Self::Created(_) => MutationKind::Created,
            Self::Updated(_) => MutationKind::Updated,
            Self::Deleted(_) => MutationKind::Deleted
        }
    }

    /// Identifier of the affected record.
    pub fn entity_id(&self) -> Uuid {
        match self {
            Self::Created(record) | Self::Updated(record) => record.id(),
            Self::Deleted(id) => *id
        }
    }

    /// Keys that become stale after this mutation on `kind`.
    ///
    /// Deleting a product or ingredient also drops association rows, so
    /// association lists are invalidated: the product's own list for a
    /// product delete, [`QueryKey::AllAssociations`] for an ingredient
    /// delete. Match cached keys with [`QueryKey::covers`].
    pub fn invalidates(&self, kind: EntityKind) -> Vec<QueryKey> {
        let id = self.entity_id();
        let mut keys = vec![QueryKey::List(kind), QueryKey::Item(kind, id)];
        if self.kind().is_delete() && kind.cascades_to_associations() {
            keys.push(match kind {
                EntityKind::Product => QueryKey::Associations(id),
                _ => QueryKey::AllAssociations
            });
        }
        keys
    }
}

/// Apply a mutation to a locally cached list.
///
/// Order of the remaining records is preserved; created records go to the
/// end, matching the server's creation-time ordering.
pub fn reconcile<T: Identified>(list: &mut Vec<T>, mutation: Mutation<T>) {
    match mutation {
        Mutation::Created(record) => {
            let id = record.id();
            match list.iter().position(|r| r.id() == id) {
                Some(index) => list[index] = record,
                None => list.push(record)
            }
        }
        Mutation::Updated(record) => {
            let id = record.id();
            match list.iter_mut().find(|r| r.id() == id) {
                Some(slot) => *slot = record,
                None => list.push(record)
            }
        }
        Mutation::Deleted(id) => list.retain(|r| r.id() != id)
    }
}
