//! Filter/search engine over the in-memory working set.
//!
//! # Responsibility
//! - Compose decade/year, process, author and free-text filters.
//! - Derive filter options (facets) from the working set.
//!
//! # Invariants
//! - Filtering is a pure, order-preserving linear scan.

pub mod facets;
pub mod filter;
