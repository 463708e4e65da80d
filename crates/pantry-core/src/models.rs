//! Core data models for pantry.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::normalize_item_text;

// =============================================================================
// CATEGORIES
// =============================================================================

/// Opaque, stable identifier of a category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct CategoryId(pub i64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CategoryId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A named bucket items can be classified into, with optional keyword hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Display name, unique within the catalog (compared case-insensitively).
    pub name: String,
    /// Normalized keyword hints, in catalog order.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Category {
    /// Case-insensitive name comparison used throughout the catalog.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

/// Request for creating a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl NewCategory {
    /// Build a category request, normalizing keywords and dropping empty ones.
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into().trim().to_string(),
            keywords: normalize_keywords(keywords),
        }
    }

    /// Trimmed name and normalized keywords, whatever way the request was built.
    pub fn normalized(&self) -> Self {
        Self::new(self.name.as_str(), &self.keywords)
    }
}

/// Normalize keyword hints, dropping empties and duplicates while keeping order.
pub fn normalize_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for kw in keywords {
        let kw = normalize_item_text(kw.as_ref());
        if !kw.is_empty() && !out.contains(&kw) {
            out.push(kw);
        }
    }
    out
}

// =============================================================================
// RESOLUTION CACHE
// =============================================================================

/// A memoized classification outcome keyed by normalized item text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Normalized item text, unique.
    pub keyword: String,
    /// Authoritative category reference. Null only for legacy rows.
    pub category_id: Option<CategoryId>,
    /// Category name at write time, informational only.
    pub category_name: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Entry pointing at `category`, keyed by an already normalized key.
    pub fn for_category(keyword: impl Into<String>, category: &Category) -> Self {
        Self {
            keyword: keyword.into(),
            category_id: Some(category.id),
            category_name: Some(category.name.clone()),
            updated_at: None,
        }
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Ephemeral request handed to an external classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRequest {
    /// Item text as entered by the user.
    pub item: String,
    /// Valid category names, in catalog order.
    pub candidates: Vec<String>,
}

impl ClassificationRequest {
    /// Build a request from a catalog snapshot.
    pub fn from_catalog(item: impl Into<String>, catalog: &[Category]) -> Self {
        Self {
            item: item.into(),
            candidates: catalog.iter().map(|c| c.name.clone()).collect(),
        }
    }

    /// Return the candidate matching `name` verbatim, or case-insensitively.
    pub fn candidate(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.candidates
            .iter()
            .find(|c| c.as_str() == name)
            .or_else(|| {
                let lower = name.to_lowercase();
                self.candidates.iter().find(|c| c.to_lowercase() == lower)
            })
            .map(String::as_str)
    }
}

/// Best guess of an external classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Chosen candidate name, `None` when the classifier has no answer.
    pub category: Option<String>,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
}

impl ClassificationResult {
    /// The "no answer" result.
    pub fn none() -> Self {
        Self {
            category: None,
            confidence: 0.0,
        }
    }

    /// An answer with its confidence clamped into `[0, 1]`.
    pub fn answer(category: impl Into<String>, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            category: Some(category.into()),
            confidence,
        }
    }

    /// Whether this result carries a category name.
    pub fn is_answer(&self) -> bool {
        self.category.is_some()
    }

    /// Restrict the answer to the request's candidates.
    ///
    /// Names outside the candidate list become "no answer"; accepted names
    /// are replaced by the candidate's verbatim spelling.
    pub fn validated(self, request: &ClassificationRequest) -> Self {
        match self.category.as_deref().and_then(|n| request.candidate(n)) {
            Some(candidate) => Self {
                category: Some(candidate.to_string()),
                confidence: self.confidence,
            },
            None => Self::none(),
        }
    }
}

// =============================================================================
// RESOURCES (shopping-list items)
// =============================================================================

/// A shopping-list item belonging to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub quantity: i32,
    pub purchased: bool,
    pub category_id: Option<CategoryId>,
}

/// A resource with its category name attached for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceView {
    #[serde(flatten)]
    pub resource: Resource,
    /// `None` when uncategorized or when the reference is dangling.
    pub category: Option<String>,
}

/// Request for inserting a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResource {
    pub project_id: i64,
    pub name: String,
    pub quantity: i32,
    pub category_id: Option<CategoryId>,
}

/// Partial update of a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcePatch {
    pub purchased: Option<bool>,
    pub quantity: Option<i32>,
    pub category_id: Option<CategoryId>,
}

impl ResourcePatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.purchased.is_none() && self.quantity.is_none() && self.category_id.is_none()
    }
}

/// Clamp a requested quantity to the allowed minimum.
pub fn clamp_quantity(quantity: i32) -> i32 {
    quantity.max(crate::defaults::RESOURCE_MIN_QUANTITY)
}
