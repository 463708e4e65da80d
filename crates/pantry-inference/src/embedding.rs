//! Embedding-similarity classifier over an OpenAI-compatible endpoint.
//!
//! The item and every candidate name are embedded in one batch; the
//! candidate closest to the item by cosine similarity wins.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use pantry_core::{ClassificationRequest, ClassificationResult, Error, ItemClassifier, Result};

use crate::config::ClassifierConfig;
use crate::http::ClassifierHttp;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    encoding_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// Cosine similarity of two vectors.
///
/// Returns 0.0 for vectors of different length or with zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Pick the candidate whose vector is most similar to the item's.
///
/// `vectors[0]` is the item, `vectors[1..]` the candidates in request order.
fn best_candidate(request: &ClassificationRequest, vectors: &[Vec<f32>]) -> ClassificationResult {
    let Some((item, candidates)) = vectors.split_first() else {
        return ClassificationResult::none();
    };

    request
        .candidates
        .iter()
        .zip(candidates)
        .map(|(name, vector)| {
            let similarity = cosine_similarity(item, vector);
            trace!(candidate = %name, similarity, "Embedding similarity");
            (name, similarity)
        })
        .filter(|(_, similarity)| !similarity.is_nan())
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(name, similarity)| ClassificationResult::answer(name, similarity.max(0.0)))
        .unwrap_or_else(ClassificationResult::none)
}

/// Embedding classifier (`POST {base}/embeddings`).
pub struct EmbeddingClassifier {
    http: ClassifierHttp,
    model: String,
    threshold: f32,
}

impl EmbeddingClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            http: ClassifierHttp::new(config)?,
            model: config.model.clone(),
            threshold: config.threshold(),
        })
    }

    async fn embed(&self, request: &ClassificationRequest) -> Result<Vec<Vec<f32>>> {
        let mut input = Vec::with_capacity(request.candidates.len() + 1);
        input.push(request.item.trim());
        input.extend(request.candidates.iter().map(String::as_str));
        let expected = input.len();

        let body = EmbeddingRequest {
            model: &self.model,
            input,
            encoding_format: "float",
        };
        let response: EmbeddingResponse = self.http.post_json("/embeddings", &body).await?;

        let mut data = response.data;
        if data.len() != expected {
            return Err(Error::Classifier(format!(
                "Expected {} embeddings, got {}",
                expected,
                data.len()
            )));
        }
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl ItemClassifier for EmbeddingClassifier {
    fn name(&self) -> &str {
        "embedding"
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

        match self.embed(request).await {
            Ok(vectors) => best_candidate(request, &vectors),
            Err(e) => {
                warn!(
                    subsystem = "inference",
                    component = "embedding",
                    op = "classify",
                    error = %e,
                    "Embedding classifier failed, no answer"
                );
                ClassificationResult::none()
            }
        }
    }
}
