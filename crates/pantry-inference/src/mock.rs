//! Stub classifier for deterministic testing.
//!
//! Records every request it receives so tests can assert whether (and how
//! often) the classifier tier ran.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pantry_inference::mock::StubClassifier;
//!
//! let stub = StubClassifier::answering("Produce", 0.9);
//! // hand `Arc::new(stub.clone())` to the categorizer ...
//! assert_eq!(stub.call_count(), 1);
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use pantry_core::defaults::DEFAULT_CONFIDENCE_THRESHOLD;
use pantry_core::{ClassificationRequest, ClassificationResult, ItemClassifier};

#[derive(Debug, Clone)]
enum Behavior {
    Answer(ClassificationResult),
    Panic,
}

/// Configurable stub classifier; clones share the call log.
#[derive(Debug, Clone)]
pub struct StubClassifier {
    behavior: Behavior,
    available: bool,
    threshold: f32,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<ClassificationRequest>>>,
}

impl StubClassifier {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            available: true,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answers `category` with `confidence`, verbatim.
    ///
    /// The answer is not validated against the candidates, so tests can
    /// exercise the caller's own validation.
    pub fn answering(category: impl Into<String>, confidence: f32) -> Self {
        Self::with_behavior(Behavior::Answer(ClassificationResult::answer(
            category, confidence,
        )))
    }

    /// Always returns "no answer".
    pub fn silent() -> Self {
        Self::with_behavior(Behavior::Answer(ClassificationResult::none()))
    }

    /// Panics when called.
    pub fn panicking() -> Self {
        Self::with_behavior(Behavior::Panic)
    }

    /// Report the classifier as unconfigured.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Use a different acceptance threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `classify` calls so far.
    pub fn call_count(&self) -> usize {
        self.requests().len()
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ClassificationRequest> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl ItemClassifier for StubClassifier {
    fn name(&self) -> &str {
        "stub"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn confidence_threshold(&self) -> f32 {
        self.threshold
    }

    async fn classify(&self, request: &ClassificationRequest) -> ClassificationResult {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            Behavior::Answer(result) => result.clone(),
            Behavior::Panic => panic!(
                "StubClassifier::panicking was called for '{}'",
                request.item
            ),
        }
    }
}
