//! # pantry-core
//!
//! Core types, traits, and pure logic for pantry's item categorization.
//!
//! This crate provides the data model (categories, cache entries,
//! classification requests and results, shopping-list resources), the store
//! and classifier traits the categorizer consumes, text normalization, and
//! the deterministic keyword matcher. It performs no I/O.

pub mod catalog;
pub mod defaults;
pub mod error;
pub mod keywords;
pub mod logging;
pub mod models;
pub mod text;
pub mod traits;

// Re-export commonly used types at crate root
pub use catalog::{default_catalog, find_by_name, find_fallback};
pub use error::{Error, Result};
pub use keywords::match_keywords;
pub use models::*;
pub use text::normalize_item_text;
pub use traits::*;
