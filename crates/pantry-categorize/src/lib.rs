//! # pantry-categorize
//!
//! Assigns free-text shopping items to categories from an evolving catalog.
//!
//! [`Categorizer`] applies the resolution tiers (cache, keyword, external
//! classifier, fallback) and writes confident results back to the cache.
//! [`ItemService`] is the item-creation and item-correction flow built on it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pantry_categorize::Categorizer;
//! use pantry_db::MemoryStore;
//! use pantry_inference::DisabledClassifier;
//!
//! let store = MemoryStore::with_categories(pantry_core::default_catalog())?;
//! let categorizer = Categorizer::new(
//!     Arc::new(store.clone()),
//!     Arc::new(store),
//!     Arc::new(DisabledClassifier),
//! );
//! let id = categorizer.resolve_category_id("Frische Milch").await;
//! ```

pub mod categorizer;
pub mod cli;
pub mod config;
pub mod events;
pub mod items;

pub use categorizer::Categorizer;
pub use config::CategorizerConfig;
pub use events::{
    CategorizationEvent, CategorizationObserver, NoopObserver, Tier, TracingObserver,
};
pub use items::{ItemService, UpdateOutcome};
