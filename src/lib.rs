// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! # elabel
//!
//! Administration API for wine e-label records: products with their label
//! disclosures, a reusable ingredient catalogue, the links between the two,
//! spreadsheet import/export and public label/QR links.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use elabel::{api::{self, AppState}, config::Settings, store::MemoryStore};
//!
//! let state = AppState::new(MemoryStore::new(), Settings::local()?);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, api::router(state)).await?;
//! ```
//!
//! ## Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`schema`] | Records, request DTOs, validation |
//! | [`store`] | Persistence gateway (`PgPool`, [`store::MemoryStore`]) |
//! | [`api`] | axum routers, OpenAPI document |
//! | [`transfer`] | Spreadsheet import/export |
//! | [`config`] | Command line and environment settings |
//! | [`error`] | HTTP error mapping |
//!
//! Client-side cache reconciliation lives in [`elabel_core::sync`].

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod error;
pub mod schema;
pub mod store;
pub mod transfer;

pub use elabel_core;
