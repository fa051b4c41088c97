//! Catalog domain model.
//!
//! # Responsibility
//! - Define the canonical article record shared by store, filter and export.
//! - Keep the scalar-or-list field shape in one place.
//!
//! # Invariants
//! - Every record is identified by its `(title, year)` pair, never by a
//!   generated id.
//! - `title`, `year`, `volume` and `issue` are always present.

pub mod article;
pub mod field;
