//! Zero-shot classification over a hosted inference endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use pantry_core::{ClassificationRequest, ClassificationResult, Error, ItemClassifier, Result};

use crate::config::ClassifierConfig;
use crate::http::ClassifierHttp;

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [String],
    multi_label: bool,
}

/// Ranked labels, in either of the shapes endpoints return.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ZeroShotResponse {
    /// `{"sequence": ..., "labels": [...], "scores": [...]}`
    Ranked { labels: Vec<String>, scores: Vec<f32> },
    /// `[{"label": ..., "score": ...}, ...]`
    Pairs(Vec<LabelScore>),
}

#[derive(Debug, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

impl ZeroShotResponse {
    /// Highest-scoring label.
    pub fn best(&self) -> Result<(&str, f32)> {
        let pairs: Vec<(&str, f32)> = match self {
            Self::Ranked { labels, scores } => {
                if labels.len() != scores.len() {
                    return Err(Error::Classifier(format!(
                        "{} labels but {} scores",
                        labels.len(),
                        scores.len()
                    )));
                }
                labels.iter().map(String::as_str).zip(scores.iter().copied()).collect()
            }
            Self::Pairs(pairs) => pairs.iter().map(|p| (p.label.as_str(), p.score)).collect(),
        };

        pairs
            .into_iter()
            .filter(|(_, score)| !score.is_nan())
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| Error::Classifier("Empty label ranking".to_string()))
    }
}

/// Zero-shot classifier (`POST {base}/models/{model}`).
pub struct ZeroShotClassifier {
    http: ClassifierHttp,
    endpoint: String,
    threshold: f32,
}

impl ZeroShotClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            http: ClassifierHttp::new(config)?,
            endpoint: format!("/models/{}", config.model.trim_matches('/')),
            threshold: config.threshold(),
        })
    }

    async fn rank(&self, request: &ClassificationRequest) -> Result<ClassificationResult> {
        let body = ZeroShotRequest {
            inputs: request.item.trim(),
            parameters: ZeroShotParameters {
                candidate_labels: &request.candidates,
                multi_label: false,
            },
        };
        let response: ZeroShotResponse = self.http.post_json(&self.endpoint, &body).await?;
        let (label, score) = response.best()?;
        trace!(label, score, "Zero-shot top label");
        Ok(ClassificationResult::answer(label, score).validated(request))
    }
}

#[async_trait]
impl ItemClassifier for ZeroShotClassifier {
    fn name(&self) -> &str {
        "zero_shot"
    }

    fn is_available(&self) -> bool {
        self.http.has_token()
    }

    fn confidence_threshold(&self) -> f32 {
        self.threshold
    }

    async fn classify(&self, request: &ClassificationRequest) -> ClassificationResult {
        if !self.is_available() || request.candidates.is_empty() {
            return ClassificationResult::none();
        }

        self.rank(request).await.unwrap_or_else(|e| {
            warn!(
                subsystem = "inference",
                component = "zero_shot",
                op = "classify",
                error = %e,
                "Zero-shot classifier failed, no answer"
            );
            ClassificationResult::none()
        })
    }
}
