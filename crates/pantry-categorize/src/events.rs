//! Tier-outcome events emitted by the categorizer.
//!
//! Resolution never depends on observers; they exist for diagnostics.
//! [`TracingObserver`] is the default and follows the log-level contract in
//! [`pantry_core::logging`].

use std::fmt;

use tracing::{debug, info, warn};

use pantry_core::CategoryId;

/// A resolution tier, or the catalog read that precedes the keyword tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Cache,
    Catalog,
    Keyword,
    Classifier,
    Fallback,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Catalog => "catalog",
            Self::Keyword => "keyword",
            Self::Classifier => "classifier",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened while resolving or correcting one item.
///
/// `key` is always the normalized item text.
#[derive(Debug, Clone, PartialEq)]
pub enum CategorizationEvent {
    CacheHit {
        key: String,
        category_id: CategoryId,
    },
    CacheMiss {
        key: String,
    },
    /// Cached category no longer exists; treated as a miss.
    CacheStale {
        key: String,
        category_id: CategoryId,
    },
    KeywordMatched {
        key: String,
        category_id: CategoryId,
    },
    ClassifierAnswered {
        key: String,
        classifier: String,
        category_id: CategoryId,
        confidence: f32,
    },
    /// The classifier answered but the answer was unknown or not confident enough.
    ClassifierRejected {
        key: String,
        classifier: String,
        category: Option<String>,
        confidence: f32,
        threshold: f32,
    },
    ClassifierUnavailable {
        key: String,
        classifier: String,
    },
    Fallback {
        key: String,
        category_id: CategoryId,
    },
    Unresolved {
        key: String,
    },
    /// An external call failed or timed out; resolution continued without it.
    TierFailed {
        key: String,
        tier: Tier,
        error: String,
    },
    CorrectionRecorded {
        key: String,
        category_id: CategoryId,
    },
}

impl CategorizationEvent {
    /// Normalized item text the event refers to.
    pub fn key(&self) -> &str {
        match self {
            Self::CacheHit { key, .. }
            | Self::CacheMiss { key }
            | Self::CacheStale { key, .. }
            | Self::KeywordMatched { key, .. }
            | Self::ClassifierAnswered { key, .. }
            | Self::ClassifierRejected { key, .. }
            | Self::ClassifierUnavailable { key, .. }
            | Self::Fallback { key, .. }
            | Self::Unresolved { key }
            | Self::TierFailed { key, .. }
            | Self::CorrectionRecorded { key, .. } => key,
        }
    }
}

/// Receives categorization events.
pub trait CategorizationObserver: Send + Sync {
    fn on_event(&self, event: &CategorizationEvent);
}

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CategorizationObserver for TracingObserver {
    fn on_event(&self, event: &CategorizationEvent) {
        match event {
            CategorizationEvent::CacheHit { key, category_id } => {
                debug!(subsystem = "categorize", tier = "cache", item = %key, category_id = %category_id, "Cache hit");
            }
            CategorizationEvent::CacheMiss { key } => {
                debug!(subsystem = "categorize", tier = "cache", item = %key, "Cache miss");
            }
            CategorizationEvent::CacheStale { key, category_id } => {
                debug!(
                    subsystem = "categorize",
                    tier = "cache",
                    item = %key,
                    category_id = %category_id,
                    "Cached category no longer exists, treating as miss"
                );
            }
            CategorizationEvent::KeywordMatched { key, category_id } => {
                debug!(subsystem = "categorize", tier = "keyword", item = %key, category_id = %category_id, "Keyword match");
            }
            CategorizationEvent::ClassifierAnswered {
                key,
                classifier,
                category_id,
                confidence,
            } => {
                debug!(
                    subsystem = "categorize",
                    tier = "classifier",
                    item = %key,
                    classifier = %classifier,
                    category_id = %category_id,
                    confidence,
                    "Classifier answer accepted"
                );
            }
            CategorizationEvent::ClassifierRejected {
                key,
                classifier,
                category,
                confidence,
                threshold,
            } => {
                debug!(
                    subsystem = "categorize",
                    tier = "classifier",
                    item = %key,
                    classifier = %classifier,
                    category = ?category,
                    confidence,
                    threshold,
                    "Classifier answer rejected"
                );
            }
            CategorizationEvent::ClassifierUnavailable { key, classifier } => {
                debug!(
                    subsystem = "categorize",
                    tier = "classifier",
                    item = %key,
                    classifier = %classifier,
                    "Classifier unavailable, skipping tier"
                );
            }
            CategorizationEvent::Fallback { key, category_id } => {
                debug!(subsystem = "categorize", tier = "fallback", item = %key, category_id = %category_id, "Using fallback category");
            }
            CategorizationEvent::Unresolved { key } => {
                debug!(subsystem = "categorize", item = %key, "No category resolved");
            }
            CategorizationEvent::TierFailed { key, tier, error } => {
                warn!(
                    subsystem = "categorize",
                    tier = %tier,
                    item = %key,
                    error = %error,
                    "Categorization tier failed, continuing"
                );
            }
            CategorizationEvent::CorrectionRecorded { key, category_id } => {
                info!(subsystem = "categorize", item = %key, category_id = %category_id, "Correction recorded");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CategorizationObserver for NoopObserver {
    fn on_event(&self, _event: &CategorizationEvent) {}
}
