//! Classifier used when no external classifier is configured.

use async_trait::async_trait;

use pantry_core::{ClassificationRequest, ClassificationResult, ItemClassifier};

/// Never available, never answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledClassifier;

#[async_trait]
impl ItemClassifier for DisabledClassifier {
    fn name(&self) -> &str {
        "disabled"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn classify(&self, _request: &ClassificationRequest) -> ClassificationResult {
        ClassificationResult::none()
    }
}
