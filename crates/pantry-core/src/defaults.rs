//! Centralized default constants for pantry.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// CATEGORIZATION
// =============================================================================

/// Names of the catch-all category, checked in order (case-insensitive).
pub const FALLBACK_CATEGORY_NAMES: &[&str] = &["Other", "Sonstiges"];

/// Name of the catch-all category in the bootstrap catalog.
pub const BOOTSTRAP_FALLBACK_CATEGORY: &str = "Sonstiges";

/// Timeout for a single cache or catalog round trip, in milliseconds.
pub const STORE_TIMEOUT_MS: u64 = 3_000;

// =============================================================================
// CONFIDENCE THRESHOLDS
// =============================================================================

/// Minimum confidence for a generative (prompted) answer.
///
/// Generative answers only carry the coarse scores assigned during
/// validation (1.0 exact, 0.6 contained), so any validated answer passes.
pub const GENERATIVE_CONFIDENCE_THRESHOLD: f32 = 0.2;

/// Minimum top score for a zero-shot classification answer.
pub const ZERO_SHOT_CONFIDENCE_THRESHOLD: f32 = 0.4;

/// Minimum cosine similarity for an embedding-similarity answer.
pub const EMBEDDING_CONFIDENCE_THRESHOLD: f32 = 0.35;

/// Threshold used when a classifier does not declare its own.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = ZERO_SHOT_CONFIDENCE_THRESHOLD;

// =============================================================================
// CLASSIFIER TRANSPORT
// =============================================================================

/// Per-request timeout for classifier HTTP calls, in seconds.
pub const CLASSIFIER_TIMEOUT_SECS: u64 = 8;

/// Retries after a "model is warming up" answer.
pub const CLASSIFIER_WARMUP_RETRIES: u32 = 2;

/// Upper bound on warm-up retries regardless of configuration.
pub const CLASSIFIER_WARMUP_RETRIES_MAX: u32 = 5;

/// Delay between warm-up retries, in milliseconds.
pub const CLASSIFIER_WARMUP_BACKOFF_MS: u64 = 1_000;

/// Upper bound on a whole classifier tier, warm-up retries included, in seconds.
pub const CLASSIFIER_BUDGET_SECS: u64 = 20;

/// Default OpenAI-compatible endpoint for generative and embedding classifiers.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default chat model for the generative classifier.
pub const GENERATIVE_MODEL: &str = "gpt-4o-mini";

/// Default embedding model for the embedding classifier.
pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default Hugging Face style inference endpoint.
pub const ZERO_SHOT_URL: &str = "https://api-inference.huggingface.co";

/// Default zero-shot classification model.
pub const ZERO_SHOT_MODEL: &str = "facebook/bart-large-mnli";

// =============================================================================
// DATABASE
// =============================================================================

/// Default maximum number of connections in the pool.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Default connection acquire timeout in seconds.
pub const DB_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default idle timeout in seconds.
pub const DB_IDLE_TIMEOUT_SECS: u64 = 600;

// =============================================================================
// ITEMS
// =============================================================================

/// Quantity assigned to a resource when none (or less than one) is given.
pub const RESOURCE_MIN_QUANTITY: i32 = 1;

/// Maximum length of a category name.
pub const CATEGORY_NAME_MAX_LEN: usize = 100;
