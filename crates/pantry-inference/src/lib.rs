//! # pantry-inference
//!
//! External classifiers for pantry's classifier tier.
//!
//! Every implementation satisfies [`ItemClassifier`]: it answers with at
//! most one name taken from the request's candidates, reports a confidence
//! in `[0, 1]`, and turns every failure (network, timeout, warm-up that
//! outlasts its retries, unexpected payload) into "no answer".
//!
//! ## Classifiers
//!
//! - [`GenerativeClassifier`] – chat completion with answer validation
//! - [`ZeroShotClassifier`] – ranked zero-shot labels
//! - [`EmbeddingClassifier`] – cosine similarity of embeddings
//! - [`DisabledClassifier`] – the tier is switched off
//!
//! ## Example
//!
//! ```rust,ignore
//! use pantry_inference::{create_classifier, ClassifierConfig};
//!
//! let classifier = create_classifier(&ClassifierConfig::from_env()?)?;
//! if classifier.is_available() {
//!     let answer = classifier.classify(&request).await;
//! }
//! ```

use std::sync::Arc;

use tracing::info;

pub use pantry_core::{ClassificationRequest, ClassificationResult, ItemClassifier, Result};

pub mod config;
pub mod disabled;
pub mod embedding;
pub mod generative;
pub mod http;
pub mod zero_shot;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{ClassifierConfig, ClassifierKind};
pub use disabled::DisabledClassifier;
pub use embedding::{cosine_similarity, EmbeddingClassifier};
pub use generative::GenerativeClassifier;
pub use http::is_warming_up;
pub use zero_shot::ZeroShotClassifier;

/// Build the classifier selected by `config.kind`.
pub fn create_classifier(config: &ClassifierConfig) -> Result<Arc<dyn ItemClassifier>> {
    let classifier: Arc<dyn ItemClassifier> = match config.kind {
        ClassifierKind::Disabled => Arc::new(DisabledClassifier),
        ClassifierKind::Generative => Arc::new(GenerativeClassifier::new(config)?),
        ClassifierKind::ZeroShot => Arc::new(ZeroShotClassifier::new(config)?),
        ClassifierKind::Embedding => Arc::new(EmbeddingClassifier::new(config)?),
    };

    info!(
        subsystem = "inference",
        classifier = classifier.name(),
        available = classifier.is_available(),
        threshold = classifier.confidence_threshold(),
        "Classifier tier configured"
    );
    Ok(classifier)
}
